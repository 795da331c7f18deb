//! JSON-file-backed store.
//!
//! One document per collection under the data directory. All mutations run
//! inside one `tokio::sync::Mutex` over the in-memory state and commit with
//! write-to-temp-then-rename, so each store method is a single atomic
//! commit. Reconciliation relies on this: writing grouped counters and
//! deleting the legacy record are two separate commits.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    domain::{CardDefinition, CardId, Counter, GroupedCounter, LegacyCounter, UserId},
    errors::Error,
    store::port::{CatalogStore, CounterStore, InventoryStore},
    Result,
};

const CATALOG_FILE: &str = "catalog.json";
const INVENTORY_FILE: &str = "inventories.json";
const COUNTERS_FILE: &str = "counters.json";

#[derive(Default)]
struct StoreState {
    catalog: Vec<CardDefinition>,
    // JSON object keys must be strings, so user ids are stored as decimal strings.
    inventories: BTreeMap<String, Vec<CardId>>,
    legacy: BTreeMap<(String, String), u64>,
    grouped: BTreeMap<(String, String, String), u64>,
}

pub struct FileStore {
    catalog_path: PathBuf,
    inventory_path: PathBuf,
    counters_path: PathBuf,
    state: Mutex<StoreState>,
}

impl FileStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let catalog_path = data_dir.join(CATALOG_FILE);
        let inventory_path = data_dir.join(INVENTORY_FILE);
        let counters_path = data_dir.join(COUNTERS_FILE);

        let catalog: Vec<CardDefinition> = read_json_or_default(&catalog_path)?;
        let inventories: BTreeMap<String, Vec<CardId>> = read_json_or_default(&inventory_path)?;
        let counters: Vec<Counter> = read_json_or_default(&counters_path)?;

        let mut legacy = BTreeMap::new();
        let mut grouped = BTreeMap::new();
        for counter in counters {
            match counter {
                Counter::Legacy {
                    name,
                    version,
                    total,
                } => {
                    legacy.insert((name, version), total);
                }
                Counter::Grouped {
                    name,
                    version,
                    group,
                    count,
                } => {
                    grouped.insert((name, version, group), count);
                }
            }
        }

        Ok(Self {
            catalog_path,
            inventory_path,
            counters_path,
            state: Mutex::new(StoreState {
                catalog,
                inventories,
                legacy,
                grouped,
            }),
        })
    }

    fn persist_counters(&self, st: &StoreState) -> Result<()> {
        let mut doc: Vec<Counter> = Vec::with_capacity(st.legacy.len() + st.grouped.len());
        for ((name, version), total) in &st.legacy {
            doc.push(Counter::Legacy {
                name: name.clone(),
                version: version.clone(),
                total: *total,
            });
        }
        for ((name, version, group), count) in &st.grouped {
            doc.push(Counter::Grouped {
                name: name.clone(),
                version: version.clone(),
                group: group.clone(),
                count: *count,
            });
        }
        write_json(&self.counters_path, &doc)
    }

    /// Test fixture: legacy counters only ever pre-exist in production data.
    #[cfg(test)]
    pub(crate) async fn insert_legacy(&self, name: &str, version: &str, total: u64) -> Result<()> {
        let mut st = self.state.lock().await;
        st.legacy
            .insert((name.to_string(), version.to_string()), total);
        self.persist_counters(&st)
    }
}

#[async_trait]
impl CatalogStore for FileStore {
    async fn seed_if_empty(&self, defs: &[CardDefinition]) -> Result<usize> {
        let mut st = self.state.lock().await;
        if !st.catalog.is_empty() {
            return Ok(0);
        }

        let mut seen = std::collections::BTreeSet::new();
        for def in defs {
            if !seen.insert(&def.id) {
                return Err(Error::Config(format!(
                    "duplicate card id `{}` in seed dataset",
                    def.id.as_str()
                )));
            }
        }

        st.catalog = defs.to_vec();
        write_json(&self.catalog_path, &st.catalog)?;
        Ok(st.catalog.len())
    }

    async fn sample_random(&self) -> Result<CardDefinition> {
        let st = self.state.lock().await;
        if st.catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let idx = rand::thread_rng().gen_range(0..st.catalog.len());
        Ok(st.catalog[idx].clone())
    }

    async fn find(&self, id: &CardId) -> Result<Option<CardDefinition>> {
        let st = self.state.lock().await;
        Ok(st.catalog.iter().find(|d| &d.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<CardDefinition>> {
        let st = self.state.lock().await;
        Ok(st.catalog.clone())
    }
}

#[async_trait]
impl InventoryStore for FileStore {
    async fn append_card(&self, user_id: UserId, card_id: &CardId) -> Result<()> {
        let mut st = self.state.lock().await;
        st.inventories
            .entry(user_id.0.to_string())
            .or_default()
            .push(card_id.clone());
        write_json(&self.inventory_path, &st.inventories)
    }

    async fn owned_cards(&self, user_id: UserId) -> Result<Vec<CardId>> {
        let st = self.state.lock().await;
        Ok(st
            .inventories
            .get(&user_id.0.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn all_inventories(&self) -> Result<Vec<(UserId, Vec<CardId>)>> {
        let st = self.state.lock().await;
        let mut out = Vec::with_capacity(st.inventories.len());
        for (key, cards) in &st.inventories {
            let id = key
                .parse::<i64>()
                .map_err(|_| Error::Store(format!("invalid user id key `{key}`")))?;
            out.push((UserId(id), cards.clone()));
        }
        Ok(out)
    }
}

#[async_trait]
impl CounterStore for FileStore {
    async fn bump_grouped(&self, name: &str, version: &str, group: &str) -> Result<u64> {
        let mut st = self.state.lock().await;
        let key = (name.to_string(), version.to_string(), group.to_string());
        let count = st.grouped.entry(key).or_insert(0);
        *count += 1;
        let new_count = *count;
        self.persist_counters(&st)?;
        Ok(new_count)
    }

    async fn set_grouped(&self, name: &str, version: &str, group: &str, count: u64) -> Result<()> {
        let mut st = self.state.lock().await;
        let key = (name.to_string(), version.to_string(), group.to_string());
        st.grouped.insert(key, count);
        self.persist_counters(&st)
    }

    async fn delete_legacy(&self, name: &str, version: &str) -> Result<bool> {
        let mut st = self.state.lock().await;
        let removed = st
            .legacy
            .remove(&(name.to_string(), version.to_string()))
            .is_some();
        if removed {
            self.persist_counters(&st)?;
        }
        Ok(removed)
    }

    async fn legacy_counters(&self) -> Result<Vec<LegacyCounter>> {
        let st = self.state.lock().await;
        Ok(st
            .legacy
            .iter()
            .map(|((name, version), total)| LegacyCounter {
                name: name.clone(),
                version: version.clone(),
                total: *total,
            })
            .collect())
    }

    async fn grouped_counters(&self) -> Result<Vec<GroupedCounter>> {
        let st = self.state.lock().await;
        Ok(st
            .grouped
            .iter()
            .map(|((name, version, group), count)| GroupedCounter {
                name: name.clone(),
                version: version.clone(),
                group: group.clone(),
                count: *count,
            })
            .collect())
    }
}

/// Load the seed dataset: an ordered JSON array, one record per card.
pub fn load_card_dataset(path: &Path) -> Result<Vec<CardDefinition>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
