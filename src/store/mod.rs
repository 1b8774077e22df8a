#[cfg(feature = "network")]
pub mod http;
pub mod json_store;
pub mod memory;
pub mod progress;
pub mod table;

pub use progress::{Loaded, ProgressStore, ProgressStoreUnavailable, UserProgress};
pub use table::{ProgressTable, TableBackend, TableError};
