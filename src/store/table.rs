use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const USERNAME_COLUMN: &str = "Username";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("table contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table request failed: {0}")]
    Http(String),
    #[error("table endpoint answered with status {0}")]
    Status(u16),
}

/// The shared progress table: a header row and one row per user. Cells are
/// strings or empty. Rows may be shorter than the header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Option<String>>>,
}

impl ProgressTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, appending it as an empty column if absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        self.columns.len() - 1
    }

    /// Row whose username cell equals `username` exactly.
    pub fn find_row(&self, username: &str) -> Option<usize> {
        let col = self.column_index(USERNAME_COLUMN)?;
        (0..self.rows.len()).find(|&row| self.cell(row, col) == Some(username))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Option<String>) {
        let width = self.columns.len().max(col + 1);
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() < width {
                cells.resize(width, None);
            }
            cells[col] = value;
        }
    }

    /// Append a row with every cell empty and return its index.
    pub fn append_row(&mut self) -> usize {
        self.rows.push(vec![None; self.columns.len()]);
        self.rows.len() - 1
    }
}

/// Where the shared table lives. Implementations read and write the whole
/// table; there is no versioning, so two writers racing on read-then-write
/// can lose one update.
pub trait TableBackend {
    fn read_table(&self) -> Result<ProgressTable, TableError>;
    fn write_table(&self, table: &ProgressTable) -> Result<(), TableError>;
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ProgressTable {
        ProgressTable {
            columns: vec!["Username".into(), "Fav_Law".into()],
            rows: vec![
                vec![Some("amy".into()), Some("[1]".into())],
                vec![Some("ben".into())],
            ],
        }
    }

    #[test]
    fn find_row_is_exact_match() {
        let t = table();
        assert_eq!(t.find_row("ben"), Some(1));
        assert_eq!(t.find_row("Ben"), None);
        assert_eq!(t.find_row("amy "), None);
    }

    #[test]
    fn short_rows_read_as_empty_and_pad_on_write() {
        let mut t = table();
        assert_eq!(t.cell(1, 1), None);
        let col = t.ensure_column("Mis_Law");
        assert_eq!(col, 2);
        t.set_cell(1, col, Some("[2]".into()));
        assert_eq!(t.rows[1], vec![Some("ben".into()), None, Some("[2]".into())]);
    }

    #[test]
    fn ensure_column_is_idempotent() {
        let mut t = table();
        assert_eq!(t.ensure_column("Fav_Law"), 1);
        assert_eq!(t.columns.len(), 2);
    }

    #[test]
    fn table_without_username_column_has_no_rows_for_anyone() {
        let t = ProgressTable::default();
        assert_eq!(t.find_row("amy"), None);
    }

    #[test]
    fn null_cells_deserialize() {
        let t: ProgressTable =
            serde_json::from_str(r#"{"columns": ["Username", "Fav_Law"], "rows": [["amy", null]]}"#)
                .unwrap();
        assert_eq!(t.cell(0, 1), None);
    }
}
