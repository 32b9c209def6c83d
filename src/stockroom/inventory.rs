//! # Inventory Context
//!
//! An [`Inventory`] bundles everything one named inventory needs: the in-memory
//! [`Collection`], the [`DurableStore`] it mirrors into, the storage key, and the
//! [`CapacityMonitor`] with its warning latch. It is constructed explicitly and
//! passed to every command, so tests (and multiple inventories) never share state.
//!
//! ## Lifecycle
//!
//! 1. **Open**: probe the store. If available, load the blob under the key;
//!    a missing or unreadable blob starts an empty collection. A store too full
//!    for the probe is still loaded, and the warning latch starts from the
//!    usage found on disk.
//! 2. **Mutate**: commands change the collection, then call [`Inventory::persist`].
//! 3. **Persist**: rewrite the whole blob, then re-measure capacity. A failed write
//!    is reported and the mutation stays applied in memory.
//!
//! When the store is unavailable the inventory runs memory-only and persisting
//! is a no-op.

use crate::capacity::{CapacityMonitor, CapacityUsage};
use crate::collection::Collection;
use crate::commands::{CmdMessage, CmdResult};
use crate::model::Item;
use crate::store::durable::DurableStore;
use crate::store::{KvBackend, StoreError};
use tracing::{debug, warn};

pub struct Inventory<B: KvBackend> {
    collection: Collection,
    store: DurableStore<B>,
    key: String,
    monitor: CapacityMonitor,
    storage_available: bool,
}

impl<B: KvBackend> Inventory<B> {
    pub fn open(store: DurableStore<B>, key: impl Into<String>, mut monitor: CapacityMonitor) -> Self {
        let key = key.into();
        let storage_available = match store.probe() {
            Ok(()) => true,
            // Full, not gone: existing data is still readable.
            Err(StoreError::QuotaExceeded) => true,
            Err(_) => false,
        };
        let collection = if storage_available {
            let usage = monitor.usage(&store.entries());
            monitor.observe(&usage);
            load_collection(&store, &key)
        } else {
            Collection::new()
        };
        debug!(key = %key, items = collection.len(), storage_available, "inventory opened");

        Self {
            collection,
            store,
            key,
            monitor,
            storage_available,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    pub fn store(&self) -> &DurableStore<B> {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    /// Measure the store without touching the warning latch.
    pub fn usage(&self) -> CapacityUsage {
        self.monitor.usage(&self.store.entries())
    }

    /// Write the full collection to storage and refresh capacity.
    /// Outcomes are recorded on `result`; nothing is rolled back on failure.
    pub fn persist(&mut self, result: &mut CmdResult) {
        if !self.storage_available {
            return;
        }

        let blob = match serde_json::to_string(self.collection.items()) {
            Ok(blob) => blob,
            Err(e) => {
                result.add_message(CmdMessage::error(format!(
                    "Failed to encode inventory: {}",
                    e
                )));
                return;
            }
        };

        match self.store.save(&self.key, &blob) {
            Ok(()) => self.refresh_capacity(result),
            Err(StoreError::QuotaExceeded) => {
                result.add_message(CmdMessage::error(
                    "Storage is full: the change was kept in memory but not saved. \
                     Remove items or images to free space.",
                ));
            }
            Err(e) => {
                result.add_message(CmdMessage::error(format!(
                    "Failed to save inventory: {}",
                    e
                )));
            }
        }
    }

    fn refresh_capacity(&mut self, result: &mut CmdResult) {
        let usage = self.usage();
        if self.monitor.observe(&usage) {
            warn!(percentage = usage.percentage, "storage nearly full");
            result.add_message(CmdMessage::warning(format!(
                "Storage is nearly full: {}",
                usage
            )));
        }
        result.usage = Some(usage);
    }
}

fn load_collection<B: KvBackend>(store: &DurableStore<B>, key: &str) -> Collection {
    let Some(blob) = store.load(key) else {
        return Collection::new();
    };
    match serde_json::from_str::<Vec<Item>>(&blob) {
        Ok(items) => Collection::from_items(items),
        Err(e) => {
            warn!(key, error = %e, "stored inventory is unreadable, starting empty");
            Collection::new()
        }
    }
}
