use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::model::Item;
use crate::store::KvBackend;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::Path;

pub fn run<B: KvBackend>(inv: &Inventory<B>, dir: &Path) -> Result<CmdResult> {
    let items = inv.collection().snapshot_sorted_by_creation();

    if items.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No items to export."));
        return Ok(res);
    }

    let path = dir.join(filename(Utc::now().date_naive()));
    fs::write(&path, render(&items)?)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} items to {}",
        items.len(),
        path.display()
    )));
    result.exported_path = Some(path);
    Ok(result)
}

/// Pretty-printed JSON array, two-space indent. Readable back by `import`.
pub fn render(items: &[Item]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

pub fn filename(date: NaiveDate) -> String {
    format!("inventory_export_{}.json", date.format("%Y-%m-%d"))
}
