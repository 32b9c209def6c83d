use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StockroomError};
use crate::inventory::Inventory;
use crate::store::KvBackend;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;

pub fn run<B: KvBackend>(
    inv: &mut Inventory<B>,
    name: String,
    quantity: u32,
    image: Option<String>,
) -> Result<CmdResult> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(StockroomError::Api("Item name cannot be empty".into()));
    }

    let item = inv.collection_mut().add(name, quantity, image);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Item added: {} (qty {})",
        item.name, item.quantity
    )));
    result.affected_items.push(item);
    inv.persist(&mut result);
    Ok(result)
}

/// Read an image file into a `data:` URL. The bytes are stored as-is.
pub fn image_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
