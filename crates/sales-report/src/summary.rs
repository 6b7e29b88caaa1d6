//! Plain-text run summary printed after export.
//!
//! Column widths are measured in terminal cells, so the CJK site labels
//! (two cells per character) still line up.

use std::fmt::Write as _;
use std::path::Path;

use chrono::DateTime;
use sales_core::formatting::{format_elapsed, format_number, format_optional};
use sales_core::models::ConsolidatedRow;
use sales_runtime::pipeline::PipelineResult;
use unicode_width::UnicodeWidthStr;

const COLUMNS: [&str; 6] = ["Site", "Gross", "Fulfillment", "Net", "Net USD", "Net RMB"];
const GAP: &str = "  ";

/// Render the consolidated table, totals, output path and diagnostics.
pub fn render_summary(result: &PipelineResult, output: Option<&Path>) -> String {
    let mut out = String::new();

    let period = result.period.as_deref().unwrap_or("unknown");
    let _ = writeln!(out, "Sales summary for period {}", period);
    let _ = writeln!(
        out,
        "Generated {} | {} located, {} extracted | locate {}, extract {}",
        display_timestamp(&result.metadata.generated_at),
        result.metadata.files_located,
        result.metadata.files_extracted,
        format_elapsed(result.metadata.locate_time_seconds),
        format_elapsed(result.metadata.extract_time_seconds),
    );
    out.push('\n');

    if result.rows.is_empty() {
        out.push_str("No reports were consolidated.\n");
    } else {
        let mut table: Vec<[String; 6]> = result.rows.iter().map(row_cells).collect();
        table.push([
            "TOTAL".to_string(),
            String::new(),
            String::new(),
            String::new(),
            format_number(result.totals.net_sales_usd, 2),
            format_number(result.totals.net_sales_rmb, 2),
        ]);
        out.push_str(&render_table(&table));

        if result.totals.missing_conversions > 0 {
            let _ = writeln!(
                out,
                "{} row(s) have no currency conversion and are left out of the totals.",
                result.totals.missing_conversions
            );
        }
    }

    if let Some(path) = output {
        let _ = writeln!(out, "\nOutput: {}", path.display());
    }

    if !result.diagnostics.is_empty() {
        let _ = writeln!(out, "\nWarnings ({}):", result.diagnostics.len());
        for d in &result.diagnostics {
            let _ = writeln!(out, "  {}", d);
        }
    }

    out
}

fn row_cells(row: &ConsolidatedRow) -> [String; 6] {
    [
        row.label.clone(),
        format_number(row.gross_sales, 2),
        format_number(row.fulfillment_cost, 2),
        format_number(row.net_sales_origin, 2),
        format_optional(row.net_sales_usd, 2),
        format_optional(row.net_sales_rmb, 2),
    ]
}

/// Lay out `rows` under [`COLUMNS`]. The first column is left-aligned, the
/// amounts right-aligned; the last row is set off by a rule.
fn render_table(rows: &[[String; 6]]) -> String {
    let mut widths: [usize; 6] = COLUMNS.map(UnicodeWidthStr::width);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let rule: String = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(GAP);

    let mut out = String::new();
    push_line(&mut out, &COLUMNS.map(str::to_string), &widths);
    let _ = writeln!(out, "{}", rule);
    for (i, row) in rows.iter().enumerate() {
        if i + 1 == rows.len() {
            let _ = writeln!(out, "{}", rule);
        }
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(GAP);
        }
        let pad = " ".repeat(width.saturating_sub(cell.width()));
        if i == 0 {
            line.push_str(cell);
            line.push_str(&pad);
        } else {
            line.push_str(&pad);
            line.push_str(cell);
        }
    }
    let _ = writeln!(out, "{}", line.trim_end());
}

fn display_timestamp(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::models::{Diagnostic, Stage};
    use sales_runtime::data::aggregator::SalesAggregator;
    use sales_runtime::pipeline::RunMetadata;
    use std::path::PathBuf;

    fn row(label: &str, net: f64, usd: Option<f64>) -> ConsolidatedRow {
        ConsolidatedRow {
            label: label.to_string(),
            site_name: "美国".to_string(),
            currency: Some("USD".to_string()),
            gross_sales: net + 10.0,
            fulfillment_cost: 10.0,
            net_sales_origin: net,
            net_sales_usd: usd,
            net_sales_rmb: usd.map(|v| v * 6.8747),
        }
    }

    fn result(rows: Vec<ConsolidatedRow>, diagnostics: Vec<Diagnostic>) -> PipelineResult {
        let totals = SalesAggregator::calculate_totals(&rows);
        PipelineResult {
            metadata: RunMetadata {
                generated_at: "2024-02-01T08:30:00+00:00".to_string(),
                input_dir: PathBuf::from("/in"),
                files_located: rows.len(),
                files_extracted: rows.len(),
                locate_time_seconds: 0.012,
                extract_time_seconds: 1.5,
            },
            rows,
            totals,
            period: Some("202401".to_string()),
            diagnostics,
        }
    }

    #[test]
    fn test_summary_lists_rows_and_totals() {
        let r = result(
            vec![row("SellerA美国", 1000.0, Some(1000.0)), row("B日本", 50.0, None)],
            vec![],
        );
        let text = render_summary(&r, Some(Path::new("/out/202401月业绩计算表格.csv")));

        assert!(text.contains("period 202401"));
        assert!(text.contains("2024-02-01 08:30:00 UTC"));
        assert!(text.contains("locate 12ms, extract 1.5s"));
        assert!(text.contains("SellerA美国"));
        assert!(text.contains("1,000.00"));
        assert!(text.contains("6,874.70"));
        assert!(text.contains("1 row(s) have no currency conversion"));
        assert!(text.contains("Output: /out/202401月业绩计算表格.csv"));
        assert!(!text.contains("Warnings"));
    }

    #[test]
    fn test_summary_columns_align_with_cjk_labels() {
        let r = result(
            vec![row("SellerA美国", 1.0, Some(1.0)), row("店铺加拿大", 2.0, Some(2.0))],
            vec![],
        );
        let text = render_summary(&r, None);
        let table: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("SellerA") || l.starts_with("店铺") || l.starts_with("TOTAL"))
            .collect();
        assert_eq!(table.len(), 3);
        let widths: Vec<usize> = table.iter().map(|l| l.width()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}", table);
    }

    #[test]
    fn test_summary_lists_diagnostics() {
        let r = result(
            vec![],
            vec![Diagnostic::new(Stage::Classify, "notes.txt", "no numeric period")],
        );
        let text = render_summary(&r, None);
        assert!(text.contains("No reports were consolidated."));
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("[classify] notes.txt: no numeric period"));
    }

    #[test]
    fn test_display_timestamp_falls_back_to_raw() {
        assert_eq!(display_timestamp("not a date"), "not a date");
    }
}
