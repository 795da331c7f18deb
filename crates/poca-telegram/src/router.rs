use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use poca_core::{
    claim::ClaimService, collection::CollectionService, config::Config,
    messaging::port::MessagingPort, store::file::FileStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub claims: Arc<ClaimService>,
    pub collection: Arc<CollectionService>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<FileStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("poca bot started: @{}", me.username());
    }
    println!("Data directory: {}", cfg.data_dir.display());

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let claims = Arc::new(ClaimService::new(store.clone(), store.clone(), store.clone()));
    let collection = Arc::new(CollectionService::new(store.clone(), store.clone()));

    let state = Arc::new(AppState {
        cfg,
        claims,
        collection,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
