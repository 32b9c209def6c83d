use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::store::KvBackend;

pub fn run<B: KvBackend>(inv: &mut Inventory<B>) -> Result<CmdResult> {
    let count = inv.collection().len();
    inv.collection_mut().replace_all(Vec::new());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Cleared {} items", count)));
    inv.persist(&mut result);
    Ok(result)
}
