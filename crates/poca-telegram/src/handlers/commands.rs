use std::sync::Arc;

use teloxide::prelude::*;

use poca_core::{
    domain::{ChatId, UserId},
    errors::Error,
    messaging::types::Command,
    texts,
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let (name, args) = parse_command(msg.text().unwrap_or(""));

    let cmd = Command {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(from.id.0 as i64),
        username: from.username.clone(),
        name,
        args,
    };

    dispatch(cmd, state).await;
    Ok(())
}

async fn dispatch(cmd: Command, state: Arc<AppState>) {
    match cmd.name.as_str() {
        "card" | "claim" => handle_claim(&cmd, &state).await,
        "collection" => handle_collection(&cmd, &state).await,
        "start" => send(&state, cmd.chat_id, texts::start_text()).await,
        "help" => send(&state, cmd.chat_id, texts::help_text()).await,
        _ => send(&state, cmd.chat_id, texts::unknown_command()).await,
    }
}

async fn handle_claim(cmd: &Command, state: &AppState) {
    match state.claims.claim(cmd.user_id).await {
        Ok(card) => {
            let caption = texts::claim_caption(&card);
            if let Err(e) = state
                .messenger
                .send_photo(cmd.chat_id, &card.image_url, &caption)
                .await
            {
                tracing::warn!(user = cmd.user_id.0, error = %e, "card delivery failed");
            }
        }
        Err(Error::EmptyCatalog) => send(state, cmd.chat_id, texts::empty_catalog()).await,
        Err(e) => {
            tracing::error!(user = cmd.user_id.0, error = %e, "claim failed");
            send(state, cmd.chat_id, texts::store_busy()).await;
        }
    }
}

async fn handle_collection(cmd: &Command, state: &AppState) {
    match state.collection.summarize_with_cards(cmd.user_id).await {
        Ok(lines) if lines.is_empty() => send(state, cmd.chat_id, texts::no_cards_yet()).await,
        Ok(lines) => send(state, cmd.chat_id, &texts::collection_message(&lines)).await,
        Err(e) => {
            tracing::error!(user = cmd.user_id.0, error = %e, "collection summary failed");
            send(state, cmd.chat_id, texts::store_busy()).await;
        }
    }
}

async fn send(state: &AppState, chat_id: ChatId, html: &str) {
    if let Err(e) = state.messenger.send_html(chat_id, html).await {
        tracing::warn!(chat = chat_id.0, error = %e, "send failed");
    }
}
