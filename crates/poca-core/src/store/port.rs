use async_trait::async_trait;

use crate::{
    domain::{CardDefinition, CardId, GroupedCounter, LegacyCounter, UserId},
    Result,
};

/// The immutable set of distributable card definitions.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert `defs` only if the catalog is currently empty, so seeding is
    /// idempotent across repeated process starts. Returns the number of
    /// definitions inserted (0 on the no-op path).
    async fn seed_if_empty(&self, defs: &[CardDefinition]) -> Result<usize>;

    /// One definition chosen with uniform probability across the catalog.
    /// Fails with `Error::EmptyCatalog` when there is nothing to draw.
    async fn sample_random(&self) -> Result<CardDefinition>;

    async fn find(&self, id: &CardId) -> Result<Option<CardDefinition>>;

    async fn all(&self) -> Result<Vec<CardDefinition>>;
}

/// Per-user ordered multiset of claimed card ids.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Append one card id to the user's inventory, creating the entry if
    /// absent. Upsert-by-key and append happen as one atomic commit inside
    /// the store; callers never read-modify-write.
    async fn append_card(&self, user_id: UserId, card_id: &CardId) -> Result<()>;

    /// The user's owned card ids in claim order; empty if the user has
    /// never claimed.
    async fn owned_cards(&self, user_id: UserId) -> Result<Vec<CardId>>;

    /// Snapshot of every user's inventory, for reconciliation ground truth.
    async fn all_inventories(&self) -> Result<Vec<(UserId, Vec<CardId>)>>;
}

/// Aggregate distributed-unit counters keyed by `(name, version, group)`,
/// plus the legacy `(name, version)` records awaiting reconciliation.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment-or-create, used by live claims. Returns the new count.
    async fn bump_grouped(&self, name: &str, version: &str, group: &str) -> Result<u64>;

    /// Set-semantics upsert, used by the reconciliation job so re-runs are
    /// idempotent rather than compounding.
    async fn set_grouped(&self, name: &str, version: &str, group: &str, count: u64) -> Result<()>;

    /// Delete a legacy counter by its `(name, version)` key. Returns whether
    /// a record was deleted.
    async fn delete_legacy(&self, name: &str, version: &str) -> Result<bool>;

    async fn legacy_counters(&self) -> Result<Vec<LegacyCounter>>;

    async fn grouped_counters(&self) -> Result<Vec<GroupedCounter>>;
}
