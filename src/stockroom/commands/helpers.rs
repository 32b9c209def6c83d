use crate::collection::Collection;
use crate::error::{Result, StockroomError};
use crate::model::Item;

/// Resolve user input to an item: an exact id wins, otherwise a unique id prefix.
pub fn resolve_item<'a>(collection: &'a Collection, input: &str) -> Result<&'a Item> {
    let input = input.trim();
    if let Some(item) = collection.get(input) {
        return Ok(item);
    }
    if input.is_empty() {
        return Err(StockroomError::ItemNotFound(input.to_string()));
    }

    let mut matches = collection
        .items()
        .iter()
        .filter(|item| item.id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => Err(StockroomError::Api(format!(
            "Id prefix {} is ambiguous",
            input
        ))),
        (None, _) => Err(StockroomError::ItemNotFound(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportedItem;

    fn collection(ids: &[&str]) -> Collection {
        let mut collection = Collection::new();
        collection.import_merge(
            ids.iter()
                .map(|id| ImportedItem {
                    id: Some(id.to_string()),
                    name: format!("item {}", id),
                    ..Default::default()
                })
                .collect(),
        );
        collection
    }

    #[test]
    fn exact_id_wins_over_prefix() {
        let c = collection(&["ab", "abc"]);
        assert_eq!(resolve_item(&c, "ab").unwrap().id, "ab");
    }

    #[test]
    fn unique_prefix_resolves() {
        let c = collection(&["abc123", "def456"]);
        assert_eq!(resolve_item(&c, "de").unwrap().id, "def456");
    }

    #[test]
    fn ambiguous_prefix_errors() {
        let c = collection(&["abc123", "abd456"]);
        assert!(matches!(resolve_item(&c, "ab"), Err(StockroomError::Api(_))));
    }

    #[test]
    fn unknown_or_empty_errors() {
        let c = collection(&["abc123"]);
        assert!(matches!(
            resolve_item(&c, "zz"),
            Err(StockroomError::ItemNotFound(_))
        ));
        assert!(matches!(
            resolve_item(&c, ""),
            Err(StockroomError::ItemNotFound(_))
        ));
    }
}
