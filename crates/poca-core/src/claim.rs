//! Card Distribution Engine: one uniform random draw per `/card` command.

use std::sync::Arc;

use crate::{
    domain::{CardDefinition, UserId},
    store::port::{CatalogStore, CounterStore, InventoryStore},
    Result,
};

pub struct ClaimService {
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<dyn InventoryStore>,
    counters: Arc<dyn CounterStore>,
}

impl ClaimService {
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

    /// Draw one card and append it to the user's inventory.
    ///
    /// The inventory append is the commit point: an empty catalog or a
    /// failed append leaves the inventory untouched and surfaces the error.
    /// The grouped counter bump after the append is a derived aggregate;
    /// if it fails the claim still stands and reconciliation repairs the
    /// counter from inventory ground truth later.
    pub async fn claim(&self, user_id: UserId) -> Result<CardDefinition> {
        let card = self.catalog.sample_random().await?;
        self.inventory.append_card(user_id, &card.id).await?;

        if let Err(e) = self
            .counters
            .bump_grouped(&card.name, &card.version, &card.group)
            .await
        {
            tracing::warn!(
                card = card.id.as_str(),
                error = %e,
                "claim committed but counter bump failed"
            );
        }

        tracing::info!(
            user = user_id.0,
            card = card.id.as_str(),
            name = %card.name,
            "card claimed"
        );
        Ok(card)
    }
}
