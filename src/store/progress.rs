use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::bank::question::QuestionId;
use crate::store::table::{ProgressTable, TableBackend, TableError, USERNAME_COLUMN};

/// Cell contents that mean "nothing stored yet", besides an absent cell.
const EMPTY_CELL_MARKERS: [&str; 4] = ["", "nan", "None", "null"];

pub fn favorites_column(prefix: &str) -> String {
    format!("Fav_{prefix}")
}

pub fn missed_column(prefix: &str) -> String {
    format!("Mis_{prefix}")
}

/// A user's favorites and missed questions for one exam prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserProgress {
    pub favorites: BTreeSet<QuestionId>,
    pub missed: BTreeSet<QuestionId>,
}

impl UserProgress {
    pub fn is_favorite(&self, id: &QuestionId) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_missed(&self, id: &QuestionId) -> bool {
        self.missed.contains(id)
    }

    /// Flip favorite membership; returns whether `id` is now a favorite.
    pub fn toggle_favorite(&mut self, id: &QuestionId) -> bool {
        if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.clone());
            true
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Load,
    Save,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Load => "load",
            StoreOp::Save => "save",
        })
    }
}

#[derive(Debug, Error)]
#[error("progress store unavailable during {op}: {source}")]
pub struct ProgressStoreUnavailable {
    pub op: StoreOp,
    pub source: TableError,
}

/// Outcome of a load. A failed read still yields (empty) progress; the
/// failure rides along as a warning for the caller to show.
#[derive(Debug)]
pub struct Loaded {
    pub progress: UserProgress,
    pub warning: Option<ProgressStoreUnavailable>,
}

/// Reads and writes per-user progress in the shared table.
///
/// Each save re-reads the whole table, patches one row and writes the whole
/// table back. Two sessions interleaving load and save can still overwrite
/// each other's update; last write wins.
pub struct ProgressStore {
    backend: Box<dyn TableBackend>,
}

impl ProgressStore {
    pub fn new(backend: Box<dyn TableBackend>) -> Self {
        Self { backend }
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    pub fn load(&self, username: &str, prefix: &str) -> Loaded {
        match self.read_progress(username, prefix) {
            Ok(progress) => Loaded {
                progress,
                warning: None,
            },
            Err(source) => {
                warn!(username, prefix, error = %source, "progress load failed, starting empty");
                Loaded {
                    progress: UserProgress::default(),
                    warning: Some(ProgressStoreUnavailable {
                        op: StoreOp::Load,
                        source,
                    }),
                }
            }
        }
    }

    pub fn save(
        &self,
        username: &str,
        prefix: &str,
        progress: &UserProgress,
    ) -> Result<(), ProgressStoreUnavailable> {
        match self.write_progress(username, prefix, progress) {
            Ok(()) => {
                info!(
                    username,
                    prefix,
                    favorites = progress.favorites.len(),
                    missed = progress.missed.len(),
                    "progress saved"
                );
                Ok(())
            }
            Err(source) => {
                warn!(username, prefix, error = %source, "progress save failed");
                Err(ProgressStoreUnavailable {
                    op: StoreOp::Save,
                    source,
                })
            }
        }
    }

    fn read_progress(&self, username: &str, prefix: &str) -> Result<UserProgress, TableError> {
        let table = self.backend.read_table()?;
        let Some(row) = table.find_row(username) else {
            return Ok(UserProgress::default());
        };
        Ok(UserProgress {
            favorites: parse_cell(&table, row, &favorites_column(prefix))?,
            missed: parse_cell(&table, row, &missed_column(prefix))?,
        })
    }

    fn write_progress(
        &self,
        username: &str,
        prefix: &str,
        progress: &UserProgress,
    ) -> Result<(), TableError> {
        let mut table = self.backend.read_table()?;
        let user_col = table.ensure_column(USERNAME_COLUMN);
        let fav_col = table.ensure_column(&favorites_column(prefix));
        let mis_col = table.ensure_column(&missed_column(prefix));

        let row = match table.find_row(username) {
            Some(row) => row,
            None => {
                let row = table.append_row();
                table.set_cell(row, user_col, Some(username.to_string()));
                row
            }
        };
        table.set_cell(row, fav_col, Some(serde_json::to_string(&progress.favorites)?));
        table.set_cell(row, mis_col, Some(serde_json::to_string(&progress.missed)?));

        self.backend.write_table(&table)
    }
}

fn parse_cell(
    table: &ProgressTable,
    row: usize,
    column: &str,
) -> Result<BTreeSet<QuestionId>, TableError> {
    let raw = table
        .column_index(column)
        .and_then(|col| table.cell(row, col))
        .map(str::trim)
        .unwrap_or("");
    if EMPTY_CELL_MARKERS.contains(&raw) {
        return Ok(BTreeSet::new());
    }
    let ids: Vec<QuestionId> = serde_json::from_str(raw)?;
    Ok(ids.into_iter().collect())
}
