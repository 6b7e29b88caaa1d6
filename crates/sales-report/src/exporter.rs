//! Export of the consolidated table, as an xlsx workbook or a CSV file.
//!
//! The CSV variant starts with a UTF-8 byte-order mark so spreadsheet
//! applications pick the right encoding for the CJK labels.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, XlsxError};
use sales_core::error::{Result, SalesError};
use sales_core::models::ConsolidatedRow;
use sales_core::settings::OutputFormat;
use tracing::info;

/// Byte-order mark written before the CSV header row.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Period label used when no file name carried a period.
pub const UNKNOWN_PERIOD: &str = "unknown";

/// Output column headers, in order.
pub const HEADERS: [&str; 6] = [
    "站点",
    "销售额原币",
    "FBA配送费",
    "实际销售额原币",
    "实际销售额USD",
    "实际销售额RMB",
];

/// File name of the report for `period`.
pub fn output_file_name(period: Option<&str>, format: OutputFormat) -> String {
    format!(
        "{}月业绩计算表格.{}",
        period.unwrap_or(UNKNOWN_PERIOD),
        format.extension()
    )
}

/// Write `rows` as CSV (with BOM) to `out`.
///
/// Absent USD/RMB values become empty cells.
pub fn write_table<W: Write>(out: W, rows: &[ConsolidatedRow]) -> Result<()> {
    let mut out = out;
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record([
            row.label.clone(),
            amount(row.gross_sales),
            amount(row.fulfillment_cost),
            amount(row.net_sales_origin),
            row.net_sales_usd.map(amount).unwrap_or_default(),
            row.net_sales_rmb.map(amount).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Build a one-sheet workbook holding `rows` under [`HEADERS`].
///
/// Amounts are numeric cells; absent USD/RMB values are left blank.
pub fn build_workbook(rows: &[ConsolidatedRow]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string(0, col, header)?;
    }
    for (r, row) in (1u32..).zip(rows) {
        sheet.write_string(r, 0, row.label.as_str())?;
        let amounts = [
            Some(row.gross_sales),
            Some(row.fulfillment_cost),
            Some(row.net_sales_origin),
            row.net_sales_usd,
            row.net_sales_rmb,
        ];
        for (col, value) in (1u16..).zip(amounts) {
            if let Some(v) = value {
                sheet.write_number(r, col, round_noise(v))?;
            }
        }
    }
    Ok(workbook)
}

/// Write the report into `output_dir` and return its path.
///
/// # Errors
/// [`SalesError::OutputWrite`] when the file cannot be created or written.
pub fn export(
    output_dir: &Path,
    period: Option<&str>,
    rows: &[ConsolidatedRow],
    format: OutputFormat,
) -> Result<PathBuf> {
    let path = output_dir.join(output_file_name(period, format));

    match format {
        OutputFormat::Xlsx => export_xlsx(&path, rows)?,
        OutputFormat::Csv => export_csv(&path, rows)?,
    }

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn export_xlsx(path: &Path, rows: &[ConsolidatedRow]) -> Result<()> {
    build_workbook(rows)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| SalesError::OutputWrite {
            path: path.to_path_buf(),
            source: match e {
                XlsxError::IoError(source) => source,
                other => std::io::Error::other(other.to_string()),
            },
        })
}

fn export_csv(path: &Path, rows: &[ConsolidatedRow]) -> Result<()> {
    let file = File::create(path).map_err(|source| SalesError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;

    write_table(BufWriter::new(file), rows).map_err(|e| match e {
        SalesError::Io(source) => SalesError::OutputWrite {
            path: path.to_path_buf(),
            source,
        },
        SalesError::Csv(err) if err.is_io_error() => SalesError::OutputWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(err.to_string()),
        },
        other => other,
    })
}

/// Float noise beyond 1e-9 is rounded away so sums like 0.1 + 0.2 store
/// as 0.3.
fn round_noise(value: f64) -> f64 {
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Shortest decimal form of an amount, after [`round_noise`].
fn amount(value: f64) -> String {
    round_noise(value).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
