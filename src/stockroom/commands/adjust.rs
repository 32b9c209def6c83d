use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::store::KvBackend;

pub fn run<B: KvBackend>(inv: &mut Inventory<B>, id: &str, delta: i64) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let Some(before) = inv.collection().get(id).map(|item| item.quantity) else {
        result.add_message(CmdMessage::warning(format!("Item not found: {}", id)));
        return Ok(result);
    };

    if let Some(after) = inv.collection_mut().adjust_quantity(id, delta) {
        if let Some(item) = inv.collection().get(id) {
            result.add_message(CmdMessage::success(format!(
                "{}: {} -> {}",
                item.name, before, after
            )));
            result.affected_items.push(item.clone());
        }
    }

    inv.persist(&mut result);
    Ok(result)
}
