use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One inventory entry.
///
/// `id` is assigned once at creation and is the only lookup key. `created_at`
/// is fixed at creation and only drives display ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(name: String, quantity: u32, image: Option<String>) -> Self {
        Self {
            id: new_item_id(),
            name,
            quantity,
            image,
            created_at: now_millis(),
        }
    }

    /// First eight characters of the id, used in listings.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }
}

/// An item as read from an import payload: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedItem {
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Item> for ImportedItem {
    fn from(item: Item) -> Self {
        Self {
            id: Some(item.id),
            name: item.name,
            quantity: item.quantity,
            image: item.image,
            created_at: Some(item.created_at),
        }
    }
}

pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time truncated to milliseconds, so a value survives a trip
/// through its serialized form unchanged.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Serializes timestamps as `2024-05-01T12:30:00.000Z` and accepts any RFC 3339 input.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
