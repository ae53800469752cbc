// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Firsat workspace.
//!
//! Everything the document store persists is modeled as a strongly-typed
//! record here; raw dynamic data is validated and defaulted at the store
//! boundary, never inside the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Title length cap; longer titles are truncated with a trailing ellipsis.
pub const MAX_TITLE_LEN: usize = 100;

/// Placeholder title used when a message yields no usable first line.
pub const FALLBACK_TITLE: &str = "Fırsat";

/// Sentinel store name used when no merchant can be resolved.
pub const UNKNOWN_STORE: &str = "Bilinmeyen Mağaza";

/// Default category id when no keyword matches.
pub const DEFAULT_CATEGORY: &str = "tumu";

/// Opaque document id assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocId(pub String);

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a deal record originated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DealSource {
    Telegram,
    UserSubmitted,
    Admin,
}

/// A persisted offer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// Product title, never empty, at most [`MAX_TITLE_LEN`] chars.
    pub title: String,
    /// Authoritative (possibly discounted) price.
    pub price: f64,
    /// Pre-discount price; equals `price` when undetermined.
    pub original_price: f64,
    /// Percentage discount derived from the two prices; 0 when unknown.
    pub discount_rate: u8,
    /// Human-readable merchant name, [`UNKNOWN_STORE`] when unresolved.
    pub store: String,
    /// Category taxonomy id, [`DEFAULT_CATEGORY`] when no keyword matched.
    pub category: String,
    /// Canonical product URL.
    pub link: String,
    /// Absolute HTTPS image URL; `blob:`/`data:` references are never stored.
    pub image_url: Option<String>,
    /// Verbatim source text of the originating message.
    pub description: String,
    pub source: DealSource,
    pub is_approved: bool,
    pub is_expired: bool,
    pub is_editor_pick: bool,
    pub is_user_submitted: bool,
    /// Authoring user for user-submitted deals, channel tag otherwise.
    pub posted_by: Option<String>,
    /// Originating chat numeric id, when known.
    pub chat_id: Option<String>,
    pub chat_type: Option<String>,
    pub chat_title: Option<String>,
    /// Half of the natural dedup key, together with `message_id`.
    pub chat_username: String,
    pub message_id: i64,
    pub hot_votes: u32,
    pub cold_votes: u32,
    pub comment_count: u32,
    /// RFC 3339 timestamps assigned at the store boundary.
    pub created_at: String,
    pub updated_at: String,
}

impl Deal {
    /// Recomputes the discount rate from `original_price` and `price`.
    ///
    /// Only a strictly larger original price yields a non-zero rate.
    pub fn compute_discount_rate(original_price: f64, price: f64) -> u8 {
        if original_price > price && price > 0.0 {
            (((original_price - price) / original_price) * 100.0) as u8
        } else {
            0
        }
    }
}

/// Partial update applied to an existing deal document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealPatch {
    pub is_approved: Option<bool>,
    pub is_expired: Option<bool>,
    pub image_url: Option<String>,
    pub updated_at: Option<String>,
}

/// A deal document paired with its store-assigned id.
#[derive(Debug, Clone)]
pub struct StoredDeal {
    pub id: DocId,
    pub deal: Deal,
}

/// A user record, read-only from this pipeline's perspective.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Push token; users without one cannot receive direct messages.
    pub notification_token: Option<String>,
    /// Keywords the user explicitly watches.
    #[serde(default)]
    pub watch_keywords: Vec<String>,
    /// Legacy keyword list, unioned with `watch_keywords` at match time.
    #[serde(default)]
    pub notification_keywords: Vec<String>,
    #[serde(default)]
    pub followed_categories: Vec<String>,
    /// Followers who opted into notifications; a subset of the full follower list.
    #[serde(default)]
    pub followers_with_notifications: Vec<String>,
    /// General-notification preference. Keyword matches bypass this.
    #[serde(default)]
    pub general_notifications_enabled: bool,
    /// Display name used in follower notification bodies.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A single element of the document store's deal change stream.
#[derive(Debug, Clone)]
pub struct DealChange {
    pub doc_id: DocId,
    /// `None` for a freshly created document.
    pub before: Option<Deal>,
    pub after: Deal,
}

// --- Channel transport types ---

/// How a configured channel is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Public `@username` (stored without the `@`).
    Username(String),
    /// Numeric chat or channel id; group ids are negative.
    Id(i64),
}

impl ChannelRef {
    /// Parses a configured channel string into a reference.
    ///
    /// `@name` and bare names resolve to [`ChannelRef::Username`]; anything
    /// that parses as an integer resolves to [`ChannelRef::Id`].
    pub fn parse(raw: &str) -> ChannelRef {
        let trimmed = raw.trim();
        if let Some(name) = trimmed.strip_prefix('@') {
            return ChannelRef::Username(name.to_string());
        }
        match trimmed.parse::<i64>() {
            Ok(id) => ChannelRef::Id(id),
            Err(_) => ChannelRef::Username(trimmed.to_string()),
        }
    }

    /// The identifier used in the dedup key and asset paths.
    pub fn identifier(&self) -> String {
        match self {
            ChannelRef::Username(name) => name.clone(),
            ChannelRef::Id(id) => id.to_string(),
        }
    }
}

/// A resolved channel or group entity.
#[derive(Debug, Clone)]
pub struct ChannelEntity {
    pub id: i64,
    pub title: Option<String>,
    pub is_broadcast: bool,
}

/// A rich-text entity span inside a channel message.
#[derive(Debug, Clone, Default)]
pub struct MessageEntity {
    pub offset: usize,
    pub length: usize,
    /// Explicit target for text-url entities; plain url entities resolve
    /// their span over the message text instead.
    pub url: Option<String>,
}

/// A message listed from a channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelMessage {
    pub id: i64,
    pub text: String,
    pub entities: Vec<MessageEntity>,
    pub has_media: bool,
    /// URLs carried by inline reply buttons, highest-trust link source.
    pub button_urls: Vec<String>,
}

/// Media size variant requested from the channel transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaVariant {
    Largest,
    Smallest,
    Default,
}

// --- Notification transport types ---

/// Transport-neutral push payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DealPayload {
    pub title: String,
    pub body: String,
    /// Opaque key/value data fields delivered alongside the notification.
    pub data: BTreeMap<String, String>,
    /// Android notification channel hint.
    pub android_channel: String,
    pub image_url: Option<String>,
}

/// One recipient of a batch send.
#[derive(Debug, Clone)]
pub struct TokenMessage {
    pub token: String,
    pub payload: DealPayload,
}

/// Outcome of delivering to a single recipient.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub token: String,
    pub error: Option<String>,
}

/// Tally returned by a batch send.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<SendResult>,
}

impl BatchReport {
    /// Merges another report into this one.
    pub fn absorb(&mut self, other: BatchReport) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        self.results.extend(other.results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_ref_parses_username_forms() {
        assert_eq!(
            ChannelRef::parse("@firsatkanali"),
            ChannelRef::Username("firsatkanali".into())
        );
        assert_eq!(
            ChannelRef::parse("firsatkanali"),
            ChannelRef::Username("firsatkanali".into())
        );
    }

    #[test]
    fn channel_ref_parses_numeric_ids() {
        assert_eq!(ChannelRef::parse("-1001234"), ChannelRef::Id(-1001234));
        assert_eq!(ChannelRef::parse("42"), ChannelRef::Id(42));
    }

    #[test]
    fn discount_rate_requires_larger_original() {
        assert_eq!(Deal::compute_discount_rate(200.0, 100.0), 50);
        assert_eq!(Deal::compute_discount_rate(100.0, 100.0), 0);
        assert_eq!(Deal::compute_discount_rate(0.0, 100.0), 0);
        assert_eq!(Deal::compute_discount_rate(100.0, 0.0), 0);
    }

    #[test]
    fn deal_source_round_trips_through_strings() {
        use std::str::FromStr;
        for source in [DealSource::Telegram, DealSource::UserSubmitted, DealSource::Admin] {
            let s = source.to_string();
            assert_eq!(DealSource::from_str(&s).unwrap(), source);
        }
    }

    #[test]
    fn deal_source_serializes_kebab_case() {
        let json = serde_json::to_string(&DealSource::UserSubmitted).unwrap();
        assert_eq!(json, r#""user-submitted""#);
        let parsed: DealSource = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DealSource::UserSubmitted);
    }

    #[test]
    fn batch_report_absorb_sums_tallies() {
        let mut a = BatchReport {
            success_count: 2,
            failure_count: 1,
            results: vec![SendResult {
                token: "t1".into(),
                error: None,
            }],
        };
        a.absorb(BatchReport {
            success_count: 3,
            failure_count: 0,
            results: vec![],
        });
        assert_eq!(a.success_count, 5);
        assert_eq!(a.failure_count, 1);
    }
}
