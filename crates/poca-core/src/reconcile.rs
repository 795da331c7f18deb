//! Counter Reconciliation Job.
//!
//! Repartitions legacy `(name, version)` aggregate counters into
//! group-partitioned counters, using real inventories as ground truth.
//! Safe to re-run: replacement counters are written with set-semantics
//! before the legacy record is deleted, so an interruption between the two
//! commits only causes the record to be reprocessed to the same values.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    domain::LegacyCounter,
    store::port::{CatalogStore, CounterStore, InventoryStore},
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub migrated: usize,
    pub failed: usize,
    pub groups_written: usize,
}

pub struct CounterReconciler {
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<dyn InventoryStore>,
    counters: Arc<dyn CounterStore>,
}

impl CounterReconciler {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        inventory: Arc<dyn InventoryStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            catalog,
            inventory,
            counters,
        }
    }

    /// One pass over all remaining legacy counters. Records are processed
    /// independently: one bad record is logged and left intact for retry
    /// without halting the rest.
    pub async fn run(&self) -> Result<ReconcileReport> {
        let legacy = self.counters.legacy_counters().await?;
        let mut report = ReconcileReport::default();

        for record in legacy {
            match self.migrate_one(&record).await {
                Ok(groups) => {
                    report.migrated += 1;
                    report.groups_written += groups;
                    tracing::info!(
                        name = %record.name,
                        version = %record.version,
                        groups,
                        "legacy counter migrated"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        name = %record.name,
                        version = %record.version,
                        error = %e,
                        "legacy counter left intact for retry"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn migrate_one(&self, record: &LegacyCounter) -> Result<usize> {
        let mut split = self.split_by_group(&record.name, &record.version).await?;

        // No instance carries a resolvable group: keep the whole legacy
        // total under the empty-group partition rather than dropping units.
        if split.is_empty() {
            split.insert(String::new(), record.total);
        }

        // Set, not increment: re-running against the same inputs reproduces
        // identical values.
        for (group, count) in &split {
            self.counters
                .set_grouped(&record.name, &record.version, group, *count)
                .await?;
        }

        // Delete only after every replacement counter is durable.
        self.counters
            .delete_legacy(&record.name, &record.version)
            .await?;

        Ok(split.len())
    }

    /// Snapshot-read every inventory and bucket the instances matching
    /// `(name, version)` by the group recorded on their catalog definition.
    async fn split_by_group(&self, name: &str, version: &str) -> Result<BTreeMap<String, u64>> {
        let catalog = self.catalog.all().await?;
        let matching: BTreeMap<_, _> = catalog
            .iter()
            .filter(|d| d.name == name && d.version == version)
            .map(|d| (d.id.clone(), d.group.clone()))
            .collect();

        let mut split: BTreeMap<String, u64> = BTreeMap::new();
        if matching.is_empty() {
            return Ok(split);
        }

        for (_user, cards) in self.inventory.all_inventories().await? {
            for card_id in cards {
                if let Some(group) = matching.get(&card_id) {
                    *split.entry(group.clone()).or_insert(0) += 1;
                }
            }
        }
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardDefinition, CardId, GroupedCounter, Rarity, UserId};
    use crate::errors::Error;
    use crate::store::file::FileStore;
    use async_trait::async_trait;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/poca-reconcile-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn card(id: &str, name: &str, version: &str, group: &str) -> CardDefinition {
        CardDefinition {
            id: CardId::new(id),
            name: name.to_string(),
            version: version.to_string(),
            group: group.to_string(),
            image_url: String::new(),
            rarity: Rarity::Common,
        }
    }

    fn reconciler(store: &Arc<FileStore>) -> CounterReconciler {
        CounterReconciler::new(store.clone(), store.clone(), store.clone())
    }

    fn grouped_of(all: &[GroupedCounter], name: &str, version: &str, group: &str) -> u64 {
        all.iter()
            .find(|g| g.name == name && g.version == version && g.group == group)
            .map(|g| g.count)
            .unwrap_or(0)
    }

    async fn seed_dahyun_split(dir: &PathBuf) -> Arc<FileStore> {
        let store = Arc::new(FileStore::open(dir).unwrap());
        store
            .seed_if_empty(&[
                card("d-twice", "Dahyun", "V1", "Twice"),
                card("d-plain", "Dahyun", "V1", ""),
                card("s-twice", "Sana", "V1", "Twice"),
            ])
            .await
            .unwrap();

        // 6 instances in group "Twice", 4 in the empty group, across users.
        for _ in 0..4 {
            store
                .append_card(UserId(1), &CardId::new("d-twice"))
                .await
                .unwrap();
        }
        for _ in 0..2 {
            store
                .append_card(UserId(2), &CardId::new("d-twice"))
                .await
                .unwrap();
        }
        for _ in 0..4 {
            store
                .append_card(UserId(2), &CardId::new("d-plain"))
                .await
                .unwrap();
        }

        store.insert_legacy("Dahyun", "V1", 10).await.unwrap();
        store
    }

    #[tokio::test]
    async fn splits_legacy_total_by_inventory_ground_truth() {
        let dir = scratch_dir("split");
        let store = seed_dahyun_split(&dir).await;

        let report = reconciler(&store).run().await.unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.groups_written, 2);

        let grouped = store.grouped_counters().await.unwrap();
        assert_eq!(grouped_of(&grouped, "Dahyun", "V1", "Twice"), 6);
        assert_eq!(grouped_of(&grouped, "Dahyun", "V1", ""), 4);
        assert!(store.legacy_counters().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unresolvable_legacy_total_lands_in_empty_group() {
        let dir = scratch_dir("fallback");
        let store = Arc::new(FileStore::open(&dir).unwrap());
        // No catalog entry and no inventory references this name/version.
        store.insert_legacy("Ghost", "V9", 42).await.unwrap();

        reconciler(&store).run().await.unwrap();

        let grouped = store.grouped_counters().await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped_of(&grouped, "Ghost", "V9", ""), 42);
        assert!(store.legacy_counters().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let dir = scratch_dir("idem");
        let store = seed_dahyun_split(&dir).await;
        let job = reconciler(&store);

        job.run().await.unwrap();
        let first = store.grouped_counters().await.unwrap();

        let report = job.run().await.unwrap();
        assert_eq!(report.migrated, 0);
        assert_eq!(store.grouped_counters().await.unwrap(), first);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn crash_between_write_and_delete_converges_on_rerun() {
        let dir = scratch_dir("crash");
        let store = seed_dahyun_split(&dir).await;

        // Simulate a crash after step (c): grouped counters written, legacy
        // record still present.
        store.set_grouped("Dahyun", "V1", "Twice", 6).await.unwrap();
        store.set_grouped("Dahyun", "V1", "", 4).await.unwrap();

        let report = reconciler(&store).run().await.unwrap();
        assert_eq!(report.migrated, 1);

        let grouped = store.grouped_counters().await.unwrap();
        assert_eq!(grouped_of(&grouped, "Dahyun", "V1", "Twice"), 6);
        assert_eq!(grouped_of(&grouped, "Dahyun", "V1", ""), 4);
        assert!(store.legacy_counters().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    /// Counter store that refuses writes for one name, to exercise
    /// per-record failure isolation.
    struct FailingWrites {
        inner: Arc<FileStore>,
        poison_name: String,
    }

    #[async_trait]
    impl CounterStore for FailingWrites {
        async fn bump_grouped(&self, name: &str, version: &str, group: &str) -> Result<u64> {
            self.inner.bump_grouped(name, version, group).await
        }

        async fn set_grouped(
            &self,
            name: &str,
            version: &str,
            group: &str,
            count: u64,
        ) -> Result<()> {
            if name == self.poison_name {
                return Err(Error::Store("write refused".to_string()));
            }
            self.inner.set_grouped(name, version, group, count).await
        }

        async fn delete_legacy(&self, name: &str, version: &str) -> Result<bool> {
            self.inner.delete_legacy(name, version).await
        }

        async fn legacy_counters(&self) -> Result<Vec<crate::domain::LegacyCounter>> {
            self.inner.legacy_counters().await
        }

        async fn grouped_counters(&self) -> Result<Vec<GroupedCounter>> {
            self.inner.grouped_counters().await
        }
    }

    #[tokio::test]
    async fn one_bad_record_does_not_halt_the_pass() {
        let dir = scratch_dir("isolation");
        let store = seed_dahyun_split(&dir).await;
        store.insert_legacy("Sana", "V1", 5).await.unwrap();

        let counters: Arc<dyn CounterStore> = Arc::new(FailingWrites {
            inner: store.clone(),
            poison_name: "Dahyun".to_string(),
        });
        let job = CounterReconciler::new(store.clone(), store.clone(), counters);

        let report = job.run().await.unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(report.failed, 1);

        // The failing record is intact for retry; the other is done.
        let legacy = store.legacy_counters().await.unwrap();
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].name, "Dahyun");
        assert_eq!(legacy[0].total, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
