//! # Stockroom Architecture
//!
//! Stockroom is a **local-first inventory library**: an item collection that is
//! mirrored into a size-limited key-value store on every change, plus a
//! best-effort push of the whole collection to a remote endpoint. The terminal
//! client in `cli/` is one consumer of it, not the point of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders listings, reads confirmations  │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Resolves id prefixes, asks before destructive operations │
//! │  - Forwards every message to the StatusSink                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One operation per module, returns CmdResult              │
//! │  - Mutate the Inventory, then persist                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │  Inventory (inventory.rs)    │  Sync (sync.rs, fetch.rs)    │
//! │  - Collection (in memory)    │  - SyncCoordinator           │
//! │  - DurableStore + KvBackend  │  - RetryingFetch + backoff   │
//! │  - CapacityMonitor           │  - Transport (reqwest)       │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! ## Key Principle: Memory Is the Source of Truth
//!
//! Every mutation lands in the in-memory [`collection::Collection`] first and is
//! then written through as one JSON blob. A failed write is reported, never
//! rolled back. If the store cannot be used at all, the inventory keeps working
//! for the rest of the session without persisting.
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the
//! process. Status goes through [`feedback::StatusSink`], diagnostics through
//! `tracing`.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`) and the core modules carry most of the unit
//!    tests, against [`store::memory::MemBackend`].
//! 2. **API** (`api.rs`): dispatch, prompting and message forwarding, with the
//!    doubles from `test_utils`.
//! 3. **Integration** (`tests/`): the filesystem backend, a real HTTP round trip
//!    and the binary itself.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`inventory`]: Collection + durable store + capacity monitor, bundled
//! - [`collection`]: In-memory item list and its mutations
//! - [`store`]: Key-value backends and the durable adapter
//! - [`capacity`]: Byte accounting and the near-full warning latch
//! - [`fetch`]: Retrying HTTP requests with exponential backoff
//! - [`sync`]: One-way push of the collection
//! - [`feedback`]: Status sink and confirmation prompt traits
//! - [`model`]: `Item` and timestamp handling
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and terminal output for the binary (not part of the lib API)

pub mod api;
pub mod capacity;
pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod feedback;
pub mod fetch;
pub mod inventory;
pub mod model;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
