use super::{KvBackend, StoreError, StoreResult};
use tracing::{debug, warn};

const PROBE_KEY: &str = "__storage_probe__";

/// Adapter over a [`KvBackend`] with the failure policy the rest of
/// stockroom relies on: probing never fails, loading never fails, and
/// saving returns a classified error for the caller to report.
pub struct DurableStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> DurableStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write and remove a throwaway key. `false` on any failure.
    pub fn probe_availability(&self) -> bool {
        self.probe().is_ok()
    }

    /// Like [`Self::probe_availability`], but keeps the failure class so a
    /// full store can be told apart from one that cannot be used at all.
    pub fn probe(&self) -> StoreResult<()> {
        self.backend
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|_| self.backend.remove(PROBE_KEY))
            .map_err(|e| {
                warn!(error = %e, "storage probe failed");
                e
            })
    }

    /// The raw blob under `key`. Read failures are logged and reported as absence.
    pub fn load(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to load from storage");
                None
            }
        }
    }

    pub fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.backend.set(key, value).map_err(|e| {
            warn!(key, bytes = value.len(), error = %e, "failed to save to storage");
            match e {
                StoreError::QuotaExceeded => StoreError::QuotaExceeded,
                StoreError::Unavailable(msg) | StoreError::Unknown(msg) => StoreError::Unknown(msg),
            }
        })?;
        debug!(key, bytes = value.len(), "saved to storage");
        Ok(())
    }

    /// Every persisted key and value, for capacity accounting. Empty on failure.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.backend.entries().unwrap_or_else(|e| {
            warn!(error = %e, "failed to enumerate storage");
            Vec::new()
        })
    }
}
