//! Volatile record store with write-failure injection.

use super::{Namespace, RecordStore, StoreError, StoreResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// In-memory store; `put`/`delete` can be made to fail to simulate a full or
/// unavailable device.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RefCell<BTreeMap<(Namespace, String), String>>,
    /// Remaining writes before failures start; `None` means unlimited.
    write_budget: Cell<Option<usize>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (`true`) or succeed (`false`).
    pub fn set_fail_writes(&self, fail: bool) {
        self.write_budget.set(if fail { Some(0) } else { None });
    }

    /// Lets `count` more writes succeed, then fails the rest.
    pub fn fail_writes_after(&self, count: usize) {
        self.write_budget.set(Some(count));
    }

    /// Number of records across all namespaces.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn consume_write(&self) -> StoreResult<()> {
        match self.write_budget.get() {
            None => Ok(()),
            Some(0) => Err(StoreError::Unavailable(
                "quota exceeded for in-memory store".to_string(),
            )),
            Some(remaining) => {
                self.write_budget.set(Some(remaining - 1));
                Ok(())
            }
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StoreResult<()> {
        self.consume_write()?;
        self.records
            .borrow_mut()
            .insert((namespace, key.to_string()), value.to_string());
        Ok(())
    }

    fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .records
            .borrow()
            .get(&(namespace, key.to_string()))
            .cloned())
    }

    fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<()> {
        self.consume_write()?;
        self.records
            .borrow_mut()
            .remove(&(namespace, key.to_string()));
        Ok(())
    }

    fn list_entries(&self, namespace: Namespace) -> StoreResult<Vec<(String, String)>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|((ns, _), _)| *ns == namespace)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }
}
