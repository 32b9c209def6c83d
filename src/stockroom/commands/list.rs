use crate::commands::CmdResult;
use crate::error::Result;
use crate::inventory::Inventory;
use crate::store::KvBackend;

/// Newest first. Items sharing a timestamp keep their insertion order.
pub fn run<B: KvBackend>(inv: &Inventory<B>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_listed_items(inv.collection().snapshot_sorted_by_creation()))
}
