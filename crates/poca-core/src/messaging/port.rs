use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the core renders strings and card
/// references, the adapter owns all transport I/O.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;

    /// Deliver a card image by URL with an HTML caption. Falls back to a
    /// plain message when the implementation cannot deliver the image.
    async fn send_photo(&self, chat_id: ChatId, image_url: &str, caption_html: &str) -> Result<()>;
}
