use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::store::table::{ProgressTable, TableBackend, TableError};

#[derive(Default)]
struct MemoryState {
    table: ProgressTable,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-process table. Clones share the same state, so a test can keep one
/// handle for inspection after moving another into a `ProgressStore`.
#[derive(Clone, Default)]
pub struct MemoryTable {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTable {
    pub fn with_table(table: ProgressTable) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().table = table;
        backend
    }

    pub fn table(&self) -> ProgressTable {
        self.state.borrow().table.clone()
    }

    /// Number of successful whole-table writes so far.
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }
}

impl TableBackend for MemoryTable {
    fn read_table(&self) -> Result<ProgressTable, TableError> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(TableError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "memory table read disabled",
            )));
        }
        Ok(state.table.clone())
    }

    fn write_table(&self, table: &ProgressTable) -> Result<(), TableError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(TableError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "memory table write disabled",
            )));
        }
        state.table = table.clone();
        state.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory table".to_string()
    }
}
