//! Survey table loading and cleaning.
//!
//! A sheet is first read into a plain [`Table`] of [`Cell`] values, then
//! [`clean`] selects the configured columns and drops every row that is
//! missing the education category or any subject score.

pub mod workbook;

use crate::config::ColumnConfig;
use crate::models::{Dataset, Record};
use thiserror::Error;
use tracing::{debug, info};

pub use workbook::read_sheet;

/// Errors raised while loading or cleaning the survey table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open workbook {path}: {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("sheet '{0}' is empty")]
    EmptySheet(String),

    #[error("column '{0}' not found in header row")]
    MissingColumn(String),

    #[error("non-numeric value {value:?} in column '{column}' at data row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("no rows left after dropping rows with missing values")]
    NoRows,
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Spreadsheet error value such as `#N/A`.
    Error(String),
}

impl Cell {
    /// True for cells the analysis treats as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as a label, or `None` when missing.
    pub fn as_label(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Text(s) => Some(s.clone()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Empty | Cell::Error(_) => None,
        }
    }

    /// Numeric value of the cell, parsing text when needed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
            _ => None,
        }
    }

    /// Raw text of the cell, for diagnostics.
    fn raw(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) | Cell::Error(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// Integral numbers print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Index of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Result<usize, LoadError> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }

    /// Cell at (row, col); short rows read as empty.
    fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows[row].get(col).unwrap_or(&EMPTY)
    }
}

/// Resolved column positions.
struct ColumnIndices {
    login: usize,
    sex: usize,
    age: usize,
    grade: usize,
    parent_education: usize,
    subjects: Vec<usize>,
}

impl ColumnIndices {
    fn resolve(table: &Table, columns: &ColumnConfig) -> Result<Self, LoadError> {
        let indices = Self {
            login: table.column_index(&columns.login)?,
            sex: table.column_index(&columns.sex)?,
            age: table.column_index(&columns.age)?,
            grade: table.column_index(&columns.grade)?,
            parent_education: table.column_index(&columns.parent_education)?,
            subjects: columns
                .subjects
                .iter()
                .map(|s| table.column_index(s))
                .collect::<Result<_, _>>()?,
        };

        debug!(
            "Resolved columns: login={} sex={} age={} grade={} parent_education={} subjects={:?}",
            indices.login,
            indices.sex,
            indices.age,
            indices.grade,
            indices.parent_education,
            indices.subjects
        );

        Ok(indices)
    }
}

/// Select the configured columns and drop incomplete rows.
///
/// Fails on a missing column, on a present but non-numeric score, or when
/// nothing survives cleaning.
pub fn clean(table: &Table, columns: &ColumnConfig) -> Result<Dataset, LoadError> {
    let idx = ColumnIndices::resolve(table, columns)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for row in 0..table.rows.len() {
        let Some(parent_education) = table.cell(row, idx.parent_education).as_label() else {
            continue;
        };

        if idx
            .subjects
            .iter()
            .any(|&col| table.cell(row, col).is_missing())
        {
            continue;
        }

        let mut scores = Vec::with_capacity(idx.subjects.len());
        for (&col, name) in idx.subjects.iter().zip(&columns.subjects) {
            let cell = table.cell(row, col);
            let value = cell.as_number().ok_or_else(|| LoadError::NonNumeric {
                column: name.clone(),
                row: row + 1,
                value: cell.raw(),
            })?;
            scores.push(value);
        }

        records.push(Record {
            login: table.cell(row, idx.login).as_label(),
            sex: table.cell(row, idx.sex).as_label(),
            age: table.cell(row, idx.age).as_number(),
            grade: table.cell(row, idx.grade).as_label(),
            parent_education,
            scores,
        });
    }

    let dataset = Dataset {
        subjects: columns.subjects.clone(),
        records,
        rows_read: table.rows.len(),
    };

    info!(
        "Rows read: {}, kept: {}, dropped: {}",
        dataset.rows_read,
        dataset.len(),
        dataset.rows_dropped()
    );

    if dataset.is_empty() {
        return Err(LoadError::NoRows);
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnConfig {
        ColumnConfig {
            login: "Login".to_string(),
            sex: "sex".to_string(),
            age: "age".to_string(),
            grade: "grade".to_string(),
            parent_education: "edu".to_string(),
            subjects: vec!["math".to_string(), "russian".to_string()],
        }
    }

    fn header() -> Vec<String> {
        ["Login", "sex", "age", "grade", "edu", "math", "russian", "extra"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn row(login: &str, edu: Cell, math: Cell, russian: Cell) -> Vec<Cell> {
        vec![
            Cell::Text(login.to_string()),
            Cell::Text("F".to_string()),
            Cell::Number(12.0),
            Cell::Number(6.0),
            edu,
            math,
            russian,
            Cell::Text("ignored".to_string()),
        ]
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_clean_drops_rows_with_missing_cells() {
        let table = Table {
            header: header(),
            rows: vec![
                row("s1", text("Higher"), Cell::Number(5.0), Cell::Number(4.0)),
                row("s2", Cell::Empty, Cell::Number(5.0), Cell::Number(4.0)),
                row("s3", text("Higher"), Cell::Empty, Cell::Number(4.0)),
                row("s4", text("School"), Cell::Number(3.0), Cell::Error("#N/A".into())),
                row("s5", text("  "), Cell::Number(3.0), Cell::Number(3.0)),
                row("s6", text("School"), Cell::Number(3.0), Cell::Number(4.0)),
            ],
        };

        let dataset = clean(&table, &columns()).unwrap();

        assert_eq!(dataset.rows_read, 6);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows_dropped(), 4);
        let logins: Vec<_> = dataset
            .records
            .iter()
            .map(|r| r.login.as_deref().unwrap())
            .collect();
        assert_eq!(logins, vec!["s1", "s6"]);
        assert_eq!(dataset.records[0].scores, vec![5.0, 4.0]);
        assert_eq!(dataset.records[0].grade.as_deref(), Some("6"));
        assert_eq!(dataset.records[0].age, Some(12.0));
    }

    #[test]
    fn test_clean_keeps_rows_missing_only_descriptive_columns() {
        let mut r = row("s1", text("Higher"), Cell::Number(5.0), Cell::Number(4.0));
        r[1] = Cell::Empty;
        r[2] = text("twelve");
        let table = Table {
            header: header(),
            rows: vec![r],
        };

        let dataset = clean(&table, &columns()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].sex, None);
        assert_eq!(dataset.records[0].age, None);
    }

    #[test]
    fn test_clean_parses_numeric_text_and_numeric_categories() {
        let table = Table {
            header: header(),
            rows: vec![row("s1", Cell::Number(3.0), text(" 4.5 "), Cell::Number(4.0))],
        };

        let dataset = clean(&table, &columns()).unwrap();
        assert_eq!(dataset.records[0].parent_education, "3");
        assert_eq!(dataset.records[0].scores, vec![4.5, 4.0]);
    }

    #[test]
    fn test_clean_rejects_non_numeric_score() {
        let table = Table {
            header: header(),
            rows: vec![
                row("s1", text("Higher"), Cell::Number(5.0), Cell::Number(4.0)),
                row("s2", text("Higher"), text("abc"), Cell::Number(4.0)),
            ],
        };

        match clean(&table, &columns()) {
            Err(LoadError::NonNumeric { column, row, value }) => {
                assert_eq!(column, "math");
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("expected NonNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_missing_column() {
        let table = Table {
            header: header(),
            rows: Vec::new(),
        };
        let mut cols = columns();
        cols.subjects.push("physics".to_string());

        match clean(&table, &cols) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "physics"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_all_rows_dropped() {
        let table = Table {
            header: header(),
            rows: vec![row("s1", Cell::Empty, Cell::Number(5.0), Cell::Number(4.0))],
        };
        assert!(matches!(clean(&table, &columns()), Err(LoadError::NoRows)));
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let mut r = row("s1", text("Higher"), Cell::Number(5.0), Cell::Number(4.0));
        r.truncate(6);
        let table = Table {
            header: header(),
            rows: vec![r],
        };
        assert!(matches!(clean(&table, &columns()), Err(LoadError::NoRows)));
    }

    #[test]
    fn test_cell_labels() {
        assert_eq!(Cell::Number(2.0).as_label().as_deref(), Some("2"));
        assert_eq!(Cell::Number(2.5).as_label().as_deref(), Some("2.5"));
        assert_eq!(text(" Higher ").as_label().as_deref(), Some(" Higher "));
        assert_eq!(text("   ").as_label(), None);
        assert_eq!(Cell::Empty.as_label(), None);
        assert!(Cell::Error("#DIV/0!".into()).is_missing());
    }
}
