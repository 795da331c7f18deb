//! Inventory Reporting Engine: per-user counts for `/collection`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    domain::{CardDefinition, CardId, UserId},
    store::port::{CatalogStore, InventoryStore},
    Result,
};

/// One distinct card in a user's collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardCount {
    pub card_id: CardId,
    pub count: u64,
}

pub struct CollectionService {
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<dyn InventoryStore>,
}

impl CollectionService {
    pub fn new(catalog: Arc<dyn CatalogStore>, inventory: Arc<dyn InventoryStore>) -> Self {
        Self { catalog, inventory }
    }

    /// Group the user's claim sequence by card id.
    ///
    /// Output order is first-occurrence order within the claim sequence, so
    /// the same inventory always renders the same list. A user with no
    /// inventory gets an empty result, not an error.
    pub async fn summarize(&self, user_id: UserId) -> Result<Vec<CardCount>> {
        let owned = self.inventory.owned_cards(user_id).await?;

        let mut out: Vec<CardCount> = Vec::new();
        let mut index: HashMap<CardId, usize> = HashMap::new();
        for card_id in owned {
            match index.get(&card_id) {
                Some(&i) => out[i].count += 1,
                None => {
                    index.insert(card_id.clone(), out.len());
                    out.push(CardCount { card_id, count: 1 });
                }
            }
        }
        Ok(out)
    }

    /// `summarize` joined with catalog definitions for display. Cards whose
    /// definition is missing from the catalog still appear, unnamed.
    pub async fn summarize_with_cards(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(CardCount, Option<CardDefinition>)>> {
        let counts = self.summarize(user_id).await?;
        let mut out = Vec::with_capacity(counts.len());
        for owned in counts {
            let def = self.catalog.find(&owned.card_id).await?;
            out.push((owned, def));
        }
        Ok(out)
    }
}
