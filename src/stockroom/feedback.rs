//! # UI Collaborator Surface
//!
//! The core never prints. Whatever user interface drives it supplies two sinks:
//!
//! - [`StatusSink`]: receives every status message, with its severity.
//! - [`ConfirmPrompt`]: consulted before destructive operations (delete, clear,
//!   import). The operation runs only if it returns `true`.

use crate::commands::CmdMessage;

pub trait StatusSink {
    fn notify(&self, message: &CmdMessage);
}

pub trait ConfirmPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool;
}
