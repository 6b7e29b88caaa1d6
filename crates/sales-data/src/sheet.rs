//! Spreadsheet loading.
//!
//! Reports arrive as Excel workbooks or CSV exports. Both are loaded into a
//! plain grid of [`Cell`]s whose row and column indices match the positions in
//! the source sheet, so callers can address columns by fixed position.

use std::borrow::Cow;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use sales_core::error::{Result, SalesError};
use tracing::debug;

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text content of the cell; numbers are rendered with `Display`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Rows of a sheet, indexed from the top-left corner of the sheet.
pub type Grid = Vec<Vec<Cell>>;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` has an extension [`load_grid`] can read.
pub fn is_supported(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| ext == "csv" || EXCEL_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Load the first worksheet of a workbook, or the whole of a CSV file.
///
/// # Errors
/// [`SalesError::UnsupportedFormat`] for unknown extensions and
/// [`SalesError::SpreadsheetRead`] when the file cannot be decoded.
pub fn load_grid(path: &Path) -> Result<Grid> {
    let ext = extension_of(path).unwrap_or_default();
    let grid = if ext == "csv" {
        load_csv(path)?
    } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        load_workbook(path)?
    } else {
        return Err(SalesError::UnsupportedFormat(if ext.is_empty() {
            path.display().to_string()
        } else {
            ext
        }));
    };

    debug!("Loaded {} rows from {}", grid.len(), path.display());
    Ok(grid)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn read_error(path: &Path, message: impl ToString) -> SalesError {
    SalesError::SpreadsheetRead {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn load_workbook(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(path, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| read_error(path, "workbook has no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_error(path, e))?;

    // `Range` starts at the first used cell; pad back to sheet coordinates.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(Cell::from));
        grid.push(cells);
    }
    Ok(grid)
}

fn load_csv(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let mut grid = Grid::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| read_error(path, e))?;
        let cells = record
            .iter()
            .enumerate()
            .map(|(col, value)| {
                // Excel writes a BOM in front of the first field of UTF-8 CSVs.
                let value = if idx == 0 && col == 0 {
                    value.trim_start_matches('\u{feff}')
                } else {
                    value
                };
                if value.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        grid.push(cells);
    }
    Ok(grid)
}

/// Write a one-sheet workbook holding `cells` at (row, column).
#[cfg(test)]
pub(crate) fn write_test_workbook(path: &Path, cells: &[(u32, u16, Cell)]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (row, col, cell) in cells {
        match cell {
            Cell::Number(n) => {
                sheet.write_number(*row, *col, *n).unwrap();
            }
            Cell::Text(text) => {
                sheet.write_string(*row, *col, text.as_str()).unwrap();
            }
            Cell::Empty => {}
        }
    }
    workbook.save(path).unwrap();
}

/// A US-layout report whose first used cell is B3: seven banner rows, the
/// header on row 8 spanning columns B..N, then three data rows.
#[cfg(test)]
pub(crate) fn offset_report_cells() -> Vec<(u32, u16, Cell)> {
    let text = |s: &str| Cell::Text(s.to_string());
    let mut cells = vec![(2, 1, text("Seller report"))];
    cells.extend((1..=13).map(|col| (7, col, Cell::Text(format!("h{}", col)))));
    for (row, kind, channel, sales, credit) in [
        (8, "Order", "Amazon", Cell::Number(100.0), Cell::Number(5.0)),
        (9, "Order", "Merchant", text("1,234.50"), Cell::Number(0.0)),
        (10, "Refund", "Amazon", Cell::Number(-50.0), Cell::Number(-5.0)),
    ] {
        cells.push((row, 2, text(kind)));
        cells.push((row, 8, text(channel)));
        cells.push((row, 12, sales));
        cells.push((row, 13, credit));
    }
    cells
}

// ── Tests ─────────────────────────────────────────────────────────────────────
