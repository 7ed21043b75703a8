//! In-process blob store.

use super::{PersistError, PersistResult, PersistenceAdapter};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct MemoryCell {
    bytes: RefCell<Option<Vec<u8>>>,
    writes: Cell<usize>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
}

/// Blob store kept in memory.
///
/// Clones share the same cell, so a test can hand one handle to the store and
/// keep another to inspect writes or simulate a restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    cell: Rc<MemoryCell>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a previously saved blob.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::default();
        storage.cell.bytes.replace(Some(bytes.into()));
        storage
    }

    /// Number of successful `save` calls.
    pub fn write_count(&self) -> usize {
        self.cell.writes.get()
    }

    /// Currently stored blob.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.cell.bytes.borrow().clone()
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.cell.fail_loads.set(fail);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.cell.fail_saves.set(fail);
    }
}

impl PersistenceAdapter for MemoryStorage {
    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        if self.cell.fail_loads.get() {
            return Err(PersistError::Unavailable("memory load disabled".to_string()));
        }
        Ok(self.cell.bytes.borrow().clone())
    }

    fn save(&self, bytes: &[u8]) -> PersistResult<()> {
        if self.cell.fail_saves.get() {
            return Err(PersistError::Unavailable("memory save disabled".to_string()));
        }
        self.cell.bytes.replace(Some(bytes.to_vec()));
        self.cell.writes.set(self.cell.writes.get() + 1);
        Ok(())
    }
}
