//! # CLI Layer
//!
//! This module is **one possible UI client** for stockroom. It is the only place
//! that parses arguments, talks to the terminal, and decides exit codes.
//!
//! ## Structure
//!
//! - `setup`: clap definitions
//! - `commands`: `run()`, context setup and one `handle_*` per command
//! - `print`: the terminal [`StatusSink`](stockroom::feedback::StatusSink),
//!   the stdin confirmation prompt, and listing output

mod commands;
mod print;
mod setup;

pub use commands::run;
