use std::sync::Arc;

use poca_core::{
    config::Config,
    reconcile::CounterReconciler,
    store::{
        file::{load_card_dataset, FileStore},
        port::CatalogStore,
    },
};

#[tokio::main]
async fn main() -> Result<(), poca_core::Error> {
    poca_core::logging::init("poca");

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(FileStore::open(&cfg.data_dir)?);

    if cfg.cards_file.exists() {
        let defs = load_card_dataset(&cfg.cards_file)?;
        let seeded = store.seed_if_empty(&defs).await?;
        if seeded > 0 {
            println!("Catalog seeded: {seeded} cards");
        }
    }

    // Maintenance mode: repartition legacy counters and exit.
    if std::env::args().nth(1).as_deref() == Some("reconcile-counters") {
        let job = CounterReconciler::new(store.clone(), store.clone(), store.clone());
        let report = job.run().await?;
        println!(
            "Reconciliation done: {} migrated, {} failed, {} group counters written",
            report.migrated, report.failed, report.groups_written
        );
        return Ok(());
    }

    poca_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| poca_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
