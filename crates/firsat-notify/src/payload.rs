// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification payload construction and topic name normalization.

use std::collections::BTreeMap;

use firsat_core::types::{Deal, DealPayload, DocId};

/// Android channel for user-facing deal notifications.
const DEALS_CHANNEL: &str = "deals_channel";

/// Android channel for the admin review queue.
const ADMIN_CHANNEL: &str = "admin_channel";

const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Normalizes a name into the transport's topic alphabet.
///
/// Lowercases, folds Turkish diacritics to ASCII, and collapses anything
/// outside `[a-z0-9_]` to an underscore. Empty input maps to the general
/// topic name.
pub fn clean_topic_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .flat_map(|c| fold_turkish(c).to_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "genel".to_string()
    } else {
        cleaned
    }
}

/// Case- and diacritic-insensitive normalization for keyword matching.
pub fn normalize_for_match(raw: &str) -> String {
    raw.chars()
        .flat_map(|c| fold_turkish(c).to_lowercase())
        .collect()
}

/// Folds the Turkish diacritic letters to their ASCII neighbors.
fn fold_turkish(c: char) -> char {
    match c {
        'ğ' | 'Ğ' => 'g',
        'ü' | 'Ü' => 'u',
        'ş' | 'Ş' => 's',
        'ı' | 'İ' => 'i',
        'ö' | 'Ö' => 'o',
        'ç' | 'Ç' => 'c',
        _ => c,
    }
}

/// The user-facing payload for an approved deal.
pub fn deal_payload(deal: &Deal, doc_id: &DocId) -> DealPayload {
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "deal".to_string());
    data.insert("dealId".to_string(), doc_id.0.clone());
    data.insert("category".to_string(), deal.category.clone());
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());

    DealPayload {
        title: "🔥 Yeni Sıcak Fırsat!".to_string(),
        body: format!("{}\n💰 {} TL", deal.title, deal.price),
        data,
        android_channel: DEALS_CHANNEL.to_string(),
        image_url: deal.image_url.clone(),
    }
}

/// The admin review-queue payload, including provenance so moderators can
/// tell bot-sourced deals from user submissions.
pub fn admin_payload(deal: &Deal, doc_id: &DocId) -> DealPayload {
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "admin_deal".to_string());
    data.insert("dealId".to_string(), doc_id.0.clone());
    data.insert(
        "submittedBy".to_string(),
        if deal.is_user_submitted { "user" } else { "bot" }.to_string(),
    );
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());

    DealPayload {
        title: "👮 Yeni Onay Bekleyen Fırsat".to_string(),
        body: format!("{}\n💰 {} TL", deal.title, deal.price),
        data,
        android_channel: ADMIN_CHANNEL.to_string(),
        image_url: None,
    }
}

/// A personalized payload naming the keyword that matched.
pub fn keyword_payload(deal: &Deal, doc_id: &DocId, keyword: &str) -> DealPayload {
    let mut payload = deal_payload(deal, doc_id);
    payload.title = format!("🔔 \"{keyword}\" için yeni fırsat!");
    payload.data.insert("type".to_string(), "keyword".to_string());
    payload
        .data
        .insert("keyword".to_string(), keyword.to_string());
    payload
}

/// The "X shared a new deal" payload for a poster's followers.
pub fn follower_payload(deal: &Deal, doc_id: &DocId, poster_name: &str) -> DealPayload {
    let mut payload = deal_payload(deal, doc_id);
    payload.title = format!("{poster_name} yeni bir fırsat paylaştı");
    payload.data.insert("type".to_string(), "follower".to_string());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use firsat_core::types::DealSource;

    fn deal() -> Deal {
        Deal {
            title: "RTX 4090".into(),
            price: 45999.0,
            original_price: 45999.0,
            discount_rate: 0,
            store: "Trendyol".into(),
            category: "bilgisayar".into(),
            link: "https://www.trendyol.com/abc".into(),
            image_url: Some("https://cdn.example.com/a.jpg".into()),
            description: "RTX 4090".into(),
            source: DealSource::Telegram,
            is_approved: true,
            is_expired: false,
            is_editor_pick: false,
            is_user_submitted: false,
            posted_by: None,
            chat_id: None,
            chat_type: None,
            chat_title: None,
            chat_username: "kanal".into(),
            message_id: 1,
            hot_votes: 0,
            cold_votes: 0,
            comment_count: 0,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn topic_names_fold_diacritics_and_punctuation() {
        assert_eq!(clean_topic_name("Ev Elektroniği & Yaşam"), "ev_elektronigi___yasam");
        assert_eq!(clean_topic_name("bilgisayar"), "bilgisayar");
        assert_eq!(clean_topic_name("Ağ/Yazılım"), "ag_yazilim");
        assert_eq!(clean_topic_name(""), "genel");
    }

    #[test]
    fn match_normalization_is_case_and_diacritic_insensitive() {
        assert_eq!(normalize_for_match("SÜPÜRGE"), "supurge");
        assert_eq!(normalize_for_match("İndirim"), "indirim");
    }

    #[test]
    fn deal_payload_carries_routing_data() {
        let payload = deal_payload(&deal(), &DocId("d42".into()));
        assert_eq!(payload.data.get("type").unwrap(), "deal");
        assert_eq!(payload.data.get("dealId").unwrap(), "d42");
        assert_eq!(payload.data.get("category").unwrap(), "bilgisayar");
        assert_eq!(payload.android_channel, "deals_channel");
        assert!(payload.body.contains("45999"));
        assert!(payload.image_url.is_some());
    }

    #[test]
    fn admin_payload_marks_provenance() {
        let bot = admin_payload(&deal(), &DocId("d1".into()));
        assert_eq!(bot.data.get("submittedBy").unwrap(), "bot");
        assert_eq!(bot.android_channel, "admin_channel");

        let mut user_deal = deal();
        user_deal.is_user_submitted = true;
        let user = admin_payload(&user_deal, &DocId("d1".into()));
        assert_eq!(user.data.get("submittedBy").unwrap(), "user");
    }

    #[test]
    fn keyword_payload_names_the_match() {
        let payload = keyword_payload(&deal(), &DocId("d1".into()), "rtx");
        assert!(payload.title.contains("rtx"));
        assert_eq!(payload.data.get("keyword").unwrap(), "rtx");
        assert_eq!(payload.data.get("type").unwrap(), "keyword");
    }
}
