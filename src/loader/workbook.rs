//! Spreadsheet reading.
//!
//! Opens a workbook with calamine (format auto-detected from the file
//! extension) and turns one worksheet into a [`Table`]. The first row is
//! the header.

use super::{Cell, LoadError, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

/// Read a named worksheet into a [`Table`].
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Table, LoadError> {
    info!("Reading sheet '{}' from {}", sheet, path.display());

    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
        path: path.display().to_string(),
        source,
    })?;

    ensure_sheet(workbook.sheet_names(), sheet)?;

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| LoadError::Workbook {
            path: path.display().to_string(),
            source,
        })?;

    debug!("Sheet '{}' spans {:?}", sheet, range.get_size());

    table_from_rows(sheet, range.rows())
}

/// Check that `sheet` is one of the workbook's sheets.
fn ensure_sheet(available: Vec<String>, sheet: &str) -> Result<(), LoadError> {
    if available.iter().any(|name| name == sheet) {
        Ok(())
    } else {
        Err(LoadError::MissingSheet {
            sheet: sheet.to_string(),
            available,
        })
    }
}

/// Build a table from raw sheet rows, the first row being the header.
pub fn table_from_rows<'a, I>(sheet: &str, mut rows: I) -> Result<Table, LoadError>
where
    I: Iterator<Item = &'a [Data]>,
{
    let header_row = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(sheet.to_string()))?;

    let header = header_row
        .iter()
        .map(|d| to_cell(d).as_label().unwrap_or_default())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    Ok(Table { header, rows })
}

/// Map a calamine value onto the loader's cell model.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates keep their serial number
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}
