use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::store::KvBackend;

pub fn run<B: KvBackend>(inv: &Inventory<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if !inv.storage_available() {
        result.add_message(CmdMessage::warning(
            "Storage is unavailable; nothing is being saved.",
        ));
        return Ok(result);
    }

    let usage = inv.usage();
    result.add_message(CmdMessage::info(format!("Storage: {}", usage)));
    Ok(result.with_usage(usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityMonitor;
    use crate::commands::{add, MessageLevel};
    use crate::store::durable::DurableStore;
    use crate::store::memory::MemBackend;
    use crate::test_utils::mem_inventory;

    #[test]
    fn reports_bytes_used() {
        let mut inv = mem_inventory();
        add::run(&mut inv, "Glue".into(), 1, None).unwrap();

        let result = run(&inv).unwrap();
        let usage = result.usage.unwrap();
        assert!(usage.used_bytes > 0);
        assert_eq!(usage.quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn unavailable_storage_is_a_warning() {
        let backend = MemBackend::new();
        backend.set_disabled(true);
        let inv = Inventory::open(
            DurableStore::new(backend),
            "inventory",
            CapacityMonitor::default(),
        );

        let result = run(&inv).unwrap();
        assert!(result.usage.is_none());
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }
}
