use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::NamedTempFile;

use crate::store::table::{ProgressTable, TableBackend, TableError};

pub const DEFAULT_TABLE_FILE: &str = "progress.json";

/// Progress table kept in a JSON file, shared by every process pointed at
/// the same path (a synced folder, a network mount).
pub struct JsonTable {
    path: PathBuf,
}

impl JsonTable {
    pub fn with_path(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableBackend for JsonTable {
    fn read_table(&self) -> Result<ProgressTable, TableError> {
        if !self.path.exists() {
            return Ok(ProgressTable::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ProgressTable::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_table(&self, table: &ProgressTable) -> Result<(), TableError> {
        let json = serde_json::to_string_pretty(table)?;

        // Each write gets its own temp file next to the table so concurrent
        // writers never share an inode; the rename publishes a whole table.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
