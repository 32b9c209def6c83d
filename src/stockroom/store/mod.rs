//! # Storage Layer
//!
//! Stockroom persists the whole collection as a single JSON blob under one key
//! of a key-value store. The layer is split in two:
//!
//! 1. **Backend** ([`KvBackend`]): the "how" of raw key-value I/O (filesystem or memory).
//! 2. **Adapter** ([`durable::DurableStore`]): the "what": availability probing,
//!    load-as-absence on failure, and quota-aware saves with classified errors.
//!
//! ## Philosophy
//!
//! - **Memory is Truth**: the in-memory collection is authoritative. Storage is a
//!   one-directional mirror, rewritten in full after every mutation.
//! - **Never Fatal**: a failed load is treated as an empty store, a failed save is
//!   reported to the user, and a missing store degrades the session to memory-only.
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: one file per key, atomic writes, enforced capacity ceiling.
//! - [`memory::MemBackend`]: for testing logic (and failure modes) without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <home>/
//! ├── config.json         # StockroomConfig
//! └── store/
//!     ├── inventory       # default collection blob (JSON array of items)
//!     └── <key>           # other named inventories, percent-encoded key names
//! ```

use thiserror::Error;

pub mod durable;
pub mod fs;
pub mod memory;

/// Failure classes of the persistence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage write failed: {0}")]
    Unknown(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract interface for raw key-value I/O.
///
/// All methods take `&self`; implementations handle their own interior
/// mutability since stockroom runs single-threaded.
pub trait KvBackend {
    /// Read the value stored under `key`. `Ok(None)` if the key is absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    /// MUST be atomic: a failed write leaves the previous value in place.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Every persisted key with its value, in key order.
    fn entries(&self) -> StoreResult<Vec<(String, String)>>;
}
