use serde::{Deserialize, Serialize};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Catalog card id (string, unique within the catalog).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One distributable photocard.
///
/// Immutable after catalog seeding. `group` may be empty when the card's
/// group is unknown; counters then fall under the empty-group partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rarity: Rarity,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Distributed-unit counter record.
///
/// The two schemas share one collection; the discriminant is an explicit
/// tag, not attribute-presence probing. `Legacy` predates group
/// partitioning and only exists until the reconciliation job consumes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Counter {
    Legacy {
        name: String,
        version: String,
        total: u64,
    },
    Grouped {
        name: String,
        version: String,
        group: String,
        count: u64,
    },
}

/// A legacy counter as listed by the counter store, keyed by `(name, version)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyCounter {
    pub name: String,
    pub version: String,
    pub total: u64,
}

/// A group-partitioned counter, unique on `(name, version, group)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedCounter {
    pub name: String,
    pub version: String,
    pub group: String,
    pub count: u64,
}
