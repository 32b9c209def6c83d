use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::store::KvBackend;

pub fn run<B: KvBackend>(inv: &mut Inventory<B>, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let Some(item) = inv.collection().get(id).cloned() else {
        result.add_message(CmdMessage::warning(format!("Item not found: {}", id)));
        return Ok(result);
    };

    inv.collection_mut().remove(id);
    result.add_message(CmdMessage::success(format!("Item removed: {}", item.name)));
    result.affected_items.push(item);
    inv.persist(&mut result);
    Ok(result)
}
