use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StockroomError};
use crate::inventory::Inventory;
use crate::model::{iso_millis, ImportedItem};
use crate::store::KvBackend;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Merge already-parsed items into the inventory.
pub fn run<B: KvBackend>(inv: &mut Inventory<B>, items: Vec<ImportedItem>) -> Result<CmdResult> {
    let count = inv.collection_mut().import_merge(items);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Imported {} items", count)));
    inv.persist(&mut result);
    Ok(result)
}

pub fn read_file(path: &Path) -> Result<Vec<ImportedItem>> {
    let content = fs::read_to_string(path)?;
    parse_payload(&content)
}

/// Parse an import payload.
///
/// The top level must be a JSON array of objects; anything else rejects the whole
/// payload. Inside each object, fields are read leniently: missing or malformed
/// values fall back to defaults instead of failing.
pub fn parse_payload(json: &str) -> Result<Vec<ImportedItem>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| StockroomError::Format(format!("not valid JSON: {}", e)))?;

    let Value::Array(elements) = value else {
        return Err(StockroomError::Format(
            "expected a JSON array of items".to_string(),
        ));
    };

    elements
        .iter()
        .enumerate()
        .map(|(i, element)| match element {
            Value::Object(fields) => Ok(lenient_item(fields)),
            _ => Err(StockroomError::Format(format!(
                "item {} is not an object",
                i + 1
            ))),
        })
        .collect()
}

fn lenient_item(fields: &Map<String, Value>) -> ImportedItem {
    let id = match fields.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    ImportedItem {
        id,
        name: fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        quantity: fields.get("quantity").map(lenient_quantity).unwrap_or(0),
        image: fields
            .get("image")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        created_at: fields
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(iso_millis::parse),
    }
}

fn lenient_quantity(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.floor() as i64))
        }
        _ => None,
    };
    raw.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}
