use super::{KvBackend, StoreError, StoreResult};
use crate::capacity::entry_bytes;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// In-memory key-value backend.
///
/// Uses `RefCell` for interior mutability since stockroom is single-threaded.
/// Besides plain storage it can simulate the failure modes of a real store:
/// a disabled store, a capacity ceiling, and generic write errors.
#[derive(Default)]
pub struct MemBackend {
    data: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
    disabled: Cell<bool>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any write that would push accounted usage past `quota_bytes`.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    /// Make writes fail with [`StoreError::Unknown`].
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    fn check_enabled(&self) -> StoreResult<()> {
        if self.disabled.get() {
            return Err(StoreError::Unavailable("storage is disabled".to_string()));
        }
        Ok(())
    }
}

impl KvBackend for MemBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_enabled()?;
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_enabled()?;
        if self.simulate_write_error.get() {
            return Err(StoreError::Unknown("Simulated write error".to_string()));
        }

        let mut data = self.data.borrow_mut();
        if let Some(quota) = self.quota_bytes {
            let others: u64 = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_bytes(k, v))
                .sum();
            if others + entry_bytes(key, value) > quota {
                return Err(StoreError::QuotaExceeded);
            }
        }
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_enabled()?;
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        self.check_enabled()?;
        Ok(self
            .data
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
