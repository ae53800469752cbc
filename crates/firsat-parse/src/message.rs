// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel message parsing.
//!
//! Turns raw message text plus its rich-text entities and inline-button
//! URLs into a structured deal draft. Every field resolves through an
//! ordered fallback chain and degrades to an explicit default rather than
//! an error; a post with nothing usable still parses.

use std::sync::LazyLock;

use regex::Regex;

use firsat_core::types::{FALLBACK_TITLE, MAX_TITLE_LEN, MessageEntity};

use crate::category::detect_category;
use crate::price::parse_price;
use crate::store::resolve_store;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Ordered price patterns: labelled amounts first, then currency-suffixed,
/// then currency-prefixed. The first candidate that parses wins.
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?i)(?:toplam|total|fiyat|price|ücret)[\s:]+(\d{1,3}(?:\.\d{3})*(?:,\d{2})?|\d{1,3}(?:,\d{3})*(?:\.\d{2})?)",
        )
        .unwrap(),
        Regex::new(r"(?i)(\d{1,3}(?:[.,\s]\d{3})*(?:[.,]\d{2})?)\s*(?:TL|₺|lira|'ye|'a)").unwrap(),
        Regex::new(r"(?i)(?:₺|TL)\s*(\d{1,3}(?:[.,\s]\d{3})*(?:[.,]\d{2})?)").unwrap(),
    ]
});

/// Structured output of message parsing; the orchestrator enriches this
/// into a full deal record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealDraft {
    pub title: String,
    /// Message-derived price; 0.0 when no pattern matched. A link-derived
    /// price overrides this later.
    pub price: f64,
    pub store: String,
    pub category: String,
    pub link: Option<String>,
    /// Verbatim source text.
    pub description: String,
}

/// Parses a message into a deal draft.
///
/// URL trust order: inline buttons > rich-text entities > plain-text scan.
pub fn parse_message(
    text: &str,
    entities: &[MessageEntity],
    button_urls: &[String],
) -> DealDraft {
    let urls = collect_urls(text, entities, button_urls);
    let link = urls.first().cloned();

    DealDraft {
        title: extract_title(text),
        price: extract_price(text),
        store: resolve_store(text, link.as_deref()),
        category: detect_category(text),
        link,
        description: text.to_string(),
    }
}

/// Gathers candidate URLs in trust order, deduplicating while preserving
/// first-seen position.
fn collect_urls(text: &str, entities: &[MessageEntity], button_urls: &[String]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let mut push = |url: String| {
        if !url.is_empty() && !urls.contains(&url) {
            urls.push(url);
        }
    };

    for url in button_urls {
        push(url.clone());
    }

    for entity in entities {
        match &entity.url {
            Some(explicit) => push(explicit.clone()),
            None => {
                // Plain url entities carry no target; the span over the
                // message text is the URL itself.
                let span: String = text
                    .chars()
                    .skip(entity.offset)
                    .take(entity.length)
                    .collect();
                if span.starts_with("http://") || span.starts_with("https://") {
                    push(span);
                }
            }
        }
    }

    for m in URL_PATTERN.find_iter(text) {
        push(m.as_str().to_string());
    }

    urls
}

/// Tries the ordered price patterns against the full text.
fn extract_price(text: &str) -> f64 {
    for pattern in PRICE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text)
            && let Some(amount) = captures.get(1)
            && let Some(price) = parse_price(amount.as_str())
        {
            return price;
        }
    }
    0.0
}

/// First non-empty line with URLs stripped, falling back to the second
/// line when the first is too short, truncated to [`MAX_TITLE_LEN`].
fn extract_title(text: &str) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some(first) = lines.first() else {
        return FALLBACK_TITLE.to_string();
    };

    let mut title = strip_urls(first);
    if title.chars().count() < 3
        && let Some(second) = lines.get(1)
    {
        title = strip_urls(second);
    }

    let title = truncate_title(&title);
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

fn strip_urls(line: &str) -> String {
    URL_PATTERN.replace_all(line, "").trim().to_string()
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_LEN {
        title.chars().take(MAX_TITLE_LEN - 3).collect::<String>() + "..."
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_url(url: &str) -> MessageEntity {
        MessageEntity {
            offset: 0,
            length: 0,
            url: Some(url.to_string()),
        }
    }

    #[test]
    fn button_url_outranks_entity_and_text() {
        let text = "Fırsat https://text.example.com/p";
        let entities = vec![entity_url("https://entity.example.com/p")];
        let buttons = vec!["https://button.example.com/p".to_string()];

        let draft = parse_message(text, &entities, &buttons);
        assert_eq!(draft.link.as_deref(), Some("https://button.example.com/p"));
    }

    #[test]
    fn entity_url_outranks_text_url() {
        let text = "Fırsat https://text.example.com/p";
        let entities = vec![entity_url("https://entity.example.com/p")];

        let draft = parse_message(text, &entities, &[]);
        assert_eq!(draft.link.as_deref(), Some("https://entity.example.com/p"));
    }

    #[test]
    fn span_entities_resolve_over_the_text() {
        let text = "https://span.example.com/p harika";
        let entities = vec![MessageEntity {
            offset: 0,
            length: 26,
            url: None,
        }];

        let draft = parse_message(text, &entities, &[]);
        assert_eq!(draft.link.as_deref(), Some("https://span.example.com/p"));
    }

    #[test]
    fn labelled_price_outranks_suffixed_price() {
        let text = "Ürün 99,90 TL değil!\nToplam: 1.779,00 TL";
        let draft = parse_message(text, &[], &[]);
        assert_eq!(draft.price, 1779.0);
    }

    #[test]
    fn suffixed_and_prefixed_prices_parse() {
        assert_eq!(parse_message("Kulaklık 329 TL", &[], &[]).price, 329.0);
        assert_eq!(parse_message("Sadece ₺1.299", &[], &[]).price, 1299.0);
    }

    #[test]
    fn missing_price_stays_zero() {
        assert_eq!(parse_message("Fiyatsız duyuru", &[], &[]).price, 0.0);
    }

    #[test]
    fn title_is_first_line_without_urls() {
        let draft = parse_message(
            "RTX 4090 https://www.trendyol.com/abc\nStokta!",
            &[],
            &[],
        );
        assert_eq!(draft.title, "RTX 4090");
    }

    #[test]
    fn short_first_line_falls_back_to_second() {
        let draft = parse_message("🔥\nMakita Matkap Seti", &[], &[]);
        assert_eq!(draft.title, "Makita Matkap Seti");
    }

    #[test]
    fn long_title_is_truncated_to_exactly_100_chars() {
        let long_line = "a".repeat(150);
        let draft = parse_message(&long_line, &[], &[]);
        assert_eq!(draft.title.chars().count(), 100);
        assert!(draft.title.ends_with("..."));
    }

    #[test]
    fn empty_text_gets_fallback_title() {
        let draft = parse_message("", &[], &[]);
        assert_eq!(draft.title, FALLBACK_TITLE);
    }

    #[test]
    fn description_preserves_text_verbatim() {
        let text = "Başlık\n\nDetaylar: %50 indirim";
        assert_eq!(parse_message(text, &[], &[]).description, text);
    }

    #[test]
    fn end_to_end_channel_post() {
        let text = "RTX 4090\nToplam 45.999,00 TL\nhttps://www.trendyol.com/abc";
        let draft = parse_message(text, &[], &[]);

        assert_eq!(draft.title, "RTX 4090");
        assert_eq!(draft.price, 45999.0);
        assert_eq!(draft.link.as_deref(), Some("https://www.trendyol.com/abc"));
        assert_eq!(draft.store, "Trendyol");
        assert_eq!(draft.category, "bilgisayar");
    }
}
