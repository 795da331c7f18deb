//! User-facing string catalog.
//!
//! The gateway renders these; the core never talks to the transport
//! directly. Telegram HTML supports only a small subset: `<b>`, `<i>`,
//! `<code>`, `<pre>`, `<a href="...">`.

use crate::collection::CardCount;
use crate::domain::CardDefinition;

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Caption sent with a freshly drawn card photo.
pub fn claim_caption(card: &CardDefinition) -> String {
    let mut out = format!("🎴 <b>{}</b>", escape_html(&card.name));
    if !card.version.is_empty() {
        out.push_str(&format!(" <i>{}</i>", escape_html(&card.version)));
    }
    if !card.group.is_empty() {
        out.push_str(&format!("\n{}", escape_html(&card.group)));
    }
    out.push_str(&format!("\n등급: {}", card.rarity.label()));
    out
}

/// Collection summary, one line per distinct card in first-claim order.
pub fn collection_message(lines: &[(CardCount, Option<CardDefinition>)]) -> String {
    let mut out = String::from("📚 <b>내 포카 컬렉션</b>\n");
    let mut total = 0u64;
    for (owned, def) in lines {
        let display = match def {
            Some(d) if !d.version.is_empty() => {
                format!("{} ({})", escape_html(&d.name), escape_html(&d.version))
            }
            Some(d) => escape_html(&d.name),
            None => escape_html(owned.card_id.as_str()),
        };
        out.push_str(&format!("\n{display} × {}", owned.count));
        total += owned.count;
    }
    out.push_str(&format!("\n\n총 {total}장"));
    out
}

pub fn no_cards_yet() -> &'static str {
    "아직 포카가 없어요! /card 로 첫 카드를 뽑아보세요 🎴"
}

pub fn empty_catalog() -> &'static str {
    "카드가 아직 준비되지 않았어요. 잠시 후 다시 시도해주세요."
}

pub fn store_busy() -> &'static str {
    "지금은 처리할 수 없어요. 잠시 후 다시 시도해주세요."
}

pub fn start_text() -> &'static str {
    "안녕하세요! 포카 수집 봇입니다.\n\n\
     /card - 랜덤 포카 뽑기\n\
     /collection - 내 컬렉션 보기\n\
     /help - 도움말"
}

pub fn help_text() -> &'static str {
    "🎴 <b>poca bot</b>\n\n\
     /card - draw one random photocard\n\
     /collection - show your collection\n\
     /start - 시작하기"
}

pub fn unknown_command() -> &'static str {
    "모르는 명령어예요. /help 를 확인해주세요."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardId, Rarity};

    fn card(name: &str, version: &str, group: &str) -> CardDefinition {
        CardDefinition {
            id: CardId::new("c1"),
            name: name.to_string(),
            version: version.to_string(),
            group: group.to_string(),
            image_url: String::new(),
            rarity: Rarity::Rare,
        }
    }

    #[test]
    fn escapes_html_entities() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn claim_caption_includes_version_and_group() {
        let caption = claim_caption(&card("Dahyun", "V1", "Twice"));
        assert!(caption.contains("<b>Dahyun</b>"));
        assert!(caption.contains("<i>V1</i>"));
        assert!(caption.contains("Twice"));
        assert!(caption.contains("Rare"));
    }

    #[test]
    fn claim_caption_skips_empty_fields() {
        let caption = claim_caption(&card("Dahyun", "", ""));
        assert!(!caption.contains("<i>"));
        assert!(caption.contains("<b>Dahyun</b>"));
    }

    #[test]
    fn collection_message_totals_counts() {
        let lines = vec![
            (
                CardCount {
                    card_id: CardId::new("c1"),
                    count: 2,
                },
                Some(card("Dahyun", "V1", "Twice")),
            ),
            (
                CardCount {
                    card_id: CardId::new("c2"),
                    count: 1,
                },
                None,
            ),
        ];
        let msg = collection_message(&lines);
        assert!(msg.contains("Dahyun (V1) × 2"));
        assert!(msg.contains("c2 × 1"));
        assert!(msg.contains("총 3장"));
    }
}
