use crate::model::{new_item_id, now_millis, ImportedItem, Item};
use std::collections::HashSet;

/// The in-memory list of items. Pure data: persistence is layered on top by
/// [`crate::inventory::Inventory`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn add(&mut self, name: String, quantity: u32, image: Option<String>) -> Item {
        let item = Item::new(name, quantity, image);
        self.items.push(item.clone());
        item
    }

    /// Apply `delta` to an item's quantity, saturating at zero and `u32::MAX`.
    /// `None` if no item has this id; nothing changes in that case.
    pub fn adjust_quantity(&mut self, id: &str, delta: i64) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        let next = i64::from(item.quantity)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX));
        item.quantity = next as u32;
        Some(item.quantity)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Append every incoming item, backfilling a missing id or creation time.
    ///
    /// Incoming ids are kept as-is and never checked against the existing
    /// items, so importing the same file twice yields duplicates. Backfilled
    /// ids are unique against the existing items and the rest of the batch.
    pub fn import_merge(&mut self, incoming: Vec<ImportedItem>) -> usize {
        let mut taken: HashSet<String> = self.items.iter().map(|i| i.id.clone()).collect();
        taken.extend(incoming.iter().filter_map(|i| i.id.clone()));

        let count = incoming.len();
        for imported in incoming {
            let id = match imported.id {
                Some(id) => id,
                None => fresh_id(&mut taken),
            };
            self.items.push(Item {
                id,
                name: imported.name,
                quantity: imported.quantity,
                image: imported.image,
                created_at: imported.created_at.unwrap_or_else(now_millis),
            });
        }
        count
    }

    /// All items, newest first. Ties keep insertion order.
    pub fn snapshot_sorted_by_creation(&self) -> Vec<Item> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }
}

fn fresh_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = new_item_id();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn collection_with(quantities: &[u32]) -> Collection {
        let mut collection = Collection::new();
        for (i, q) in quantities.iter().enumerate() {
            collection.add(format!("Item {}", i), *q, None);
        }
        collection
    }

    #[test]
    fn add_returns_the_stored_item() {
        let mut collection = Collection::new();
        let item = collection.add("Screws".into(), 12, Some("data:image/png;base64,AA==".into()));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(&item.id), Some(&item));
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let mut collection = collection_with(&[5]);
        let id = collection.items()[0].id.clone();
        assert_eq!(collection.adjust_quantity(&id, -999_999), Some(0));
        assert_eq!(collection.get(&id).unwrap().quantity, 0);
        assert_eq!(collection.adjust_quantity(&id, 3), Some(3));
    }

    #[test]
    fn adjust_saturates_at_max() {
        let mut collection = collection_with(&[u32::MAX - 1]);
        let id = collection.items()[0].id.clone();
        assert_eq!(collection.adjust_quantity(&id, 10), Some(u32::MAX));
    }

    #[test]
    fn adjust_by_extreme_deltas_saturates() {
        let mut collection = collection_with(&[1]);
        let id = collection.items()[0].id.clone();
        assert_eq!(collection.adjust_quantity(&id, i64::MAX), Some(u32::MAX));
        assert_eq!(collection.adjust_quantity(&id, i64::MAX), Some(u32::MAX));
        assert_eq!(collection.adjust_quantity(&id, i64::MIN), Some(0));
        assert_eq!(collection.adjust_quantity(&id, i64::MIN), Some(0));
    }

    #[test]
    fn adjust_unknown_id_is_noop() {
        let mut collection = collection_with(&[5]);
        let before = collection.clone();
        assert_eq!(collection.adjust_quantity("missing", 1), None);
        assert_eq!(collection, before);
    }

    #[test]
    fn remove_reports_whether_found() {
        let mut collection = collection_with(&[1, 2]);
        let id = collection.items()[0].id.clone();
        assert!(!collection.remove("missing"));
        assert_eq!(collection.len(), 2);
        assert!(collection.remove(&id));
        assert_eq!(collection.len(), 1);
        assert!(!collection.remove(&id));
    }

    #[test]
    fn replace_all_with_empty_clears() {
        let mut collection = collection_with(&[1, 2, 3]);
        collection.replace_all(Vec::new());
        assert!(collection.is_empty());
    }

    #[test]
    fn quantity_never_negative_over_mixed_operations() {
        let mut collection = collection_with(&[0, 3, 7]);
        let ids: Vec<String> = collection.items().iter().map(|i| i.id.clone()).collect();
        let mut expected: Vec<i64> = vec![0, 3, 7];
        let deltas = [-1, 4, -10, 2, -3, -100, 50, -49, -2, 1, -1, -1];
        for (step, delta) in deltas.iter().enumerate() {
            let slot = step % ids.len();
            let got = collection.adjust_quantity(&ids[slot], *delta);
            if expected[slot] >= 0 {
                expected[slot] = (expected[slot] + delta).max(0);
                assert_eq!(got, Some(expected[slot] as u32));
            } else {
                assert_eq!(got, None);
            }
            if step == 4 {
                collection.remove(&ids[2]);
                expected[2] = -1;
            }
        }
        collection.add("Late".into(), 0, None);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn import_merge_backfills_distinct_ids() {
        let mut collection = collection_with(&[1]);
        let existing = collection.items()[0].id.clone();
        let batch = vec![
            ImportedItem {
                name: "A".into(),
                ..Default::default()
            },
            ImportedItem {
                name: "B".into(),
                ..Default::default()
            },
            ImportedItem {
                name: "C".into(),
                ..Default::default()
            },
        ];
        assert_eq!(collection.import_merge(batch), 3);

        let ids: HashSet<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.contains(existing.as_str()));
    }

    #[test]
    fn import_merge_keeps_given_ids_and_does_not_dedupe() {
        let mut collection = collection_with(&[1]);
        let existing = collection.items()[0].clone();
        collection.import_merge(vec![ImportedItem::from(existing.clone())]);
        assert_eq!(collection.len(), 2);
        assert!(collection.items().iter().all(|i| i.id == existing.id));
    }

    #[test]
    fn import_merge_backfills_created_at() {
        let mut collection = Collection::new();
        let before = now_millis();
        collection.import_merge(vec![ImportedItem::default()]);
        assert!(collection.items()[0].created_at >= before);
    }

    #[test]
    fn snapshot_is_newest_first() {
        let mut collection = collection_with(&[1, 2, 3]);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut items = collection.items().to_vec();
        items[0].created_at = base + Duration::hours(2);
        items[1].created_at = base;
        items[2].created_at = base + Duration::hours(5);
        collection.replace_all(items);

        let names: Vec<String> = collection
            .snapshot_sorted_by_creation()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Item 2", "Item 0", "Item 1"]);
        // Pure read: storage order untouched
        assert_eq!(collection.items()[0].name, "Item 0");
    }
}
