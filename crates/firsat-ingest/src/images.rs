// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal image resolution.
//!
//! Channel-native media is the preferred source: it is what the poster
//! actually attached, and it is the only legitimate source when the
//! message references `blob:` URLs that can never be persisted. Link-based
//! extraction is the fallback, and "no image" is a valid final answer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use firsat_core::types::{ChannelEntity, ChannelMessage, MediaVariant};
use firsat_core::{AssetStore, ChannelTransport};
use firsat_scrape::PageData;

/// Downloads below this size are thumbnails or error payloads, not photos.
const MIN_IMAGE_BYTES: usize = 1024;

/// Size variants tried per download attempt, best first. A storage backend
/// may reject a particular variant, so all are tried before backing off.
const VARIANT_LADDER: [MediaVariant; 3] = [
    MediaVariant::Largest,
    MediaVariant::Smallest,
    MediaVariant::Default,
];

/// Resolves deal images from channel media with a link-extraction fallback.
pub struct ImageResolver {
    channel: Arc<dyn ChannelTransport>,
    assets: Arc<dyn AssetStore>,
    path_prefix: String,
    max_retries: usize,
}

impl ImageResolver {
    pub fn new(
        channel: Arc<dyn ChannelTransport>,
        assets: Arc<dyn AssetStore>,
        path_prefix: impl Into<String>,
        max_retries: usize,
    ) -> Self {
        Self {
            channel,
            assets,
            path_prefix: path_prefix.into(),
            max_retries,
        }
    }

    /// Resolves an image URL for a message.
    ///
    /// Tries channel media first (when present, or when a `blob:` reference
    /// forces it), then falls back to whatever the link extractor found.
    /// Returns `None` when neither source yields an image.
    pub async fn resolve(
        &self,
        entity: &ChannelEntity,
        message: &ChannelMessage,
        chat_identifier: &str,
        page_data: Option<&PageData>,
    ) -> Option<String> {
        if wants_channel_media(message) {
            if let Some(url) = self
                .resolve_from_channel(entity, message, chat_identifier)
                .await
            {
                return Some(url);
            }
        }

        let fallback = page_data.and_then(|data| data.image.clone());
        if fallback.is_some() {
            debug!(message_id = message.id, "image resolved from link");
        }
        fallback
    }

    /// Downloads, validates, and uploads channel media, retrying with a
    /// linearly growing backoff.
    async fn resolve_from_channel(
        &self,
        entity: &ChannelEntity,
        message: &ChannelMessage,
        chat_identifier: &str,
    ) -> Option<String> {
        for attempt in 0..=self.max_retries {
            if let Some(bytes) = self.download_any_variant(entity, message.id).await {
                if bytes.len() >= MIN_IMAGE_BYTES {
                    if !has_image_signature(&bytes) {
                        // Telegram photo media is JPEG in practice; store it
                        // anyway and let the client decide.
                        warn!(
                            message_id = message.id,
                            "unrecognized image signature, storing as JPEG"
                        );
                    }
                    return self.upload(chat_identifier, message.id, bytes).await;
                }
                warn!(
                    message_id = message.id,
                    size = bytes.len(),
                    "channel media too small, retrying"
                );
            }
            if attempt < self.max_retries {
                let backoff = Duration::from_secs((attempt + 1) as u64);
                debug!(
                    message_id = message.id,
                    attempt = attempt + 1,
                    total = self.max_retries + 1,
                    "media download failed, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
        }
        warn!(
            message_id = message.id,
            "channel media unavailable after all attempts"
        );
        None
    }

    /// Tries every size variant once, in preference order.
    async fn download_any_variant(
        &self,
        entity: &ChannelEntity,
        message_id: i64,
    ) -> Option<Vec<u8>> {
        for variant in VARIANT_LADDER {
            match self.channel.download_media(entity, message_id, variant).await {
                Ok(Some(bytes)) if !bytes.is_empty() => {
                    debug!(message_id, ?variant, size = bytes.len(), "media downloaded");
                    return Some(bytes);
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!(message_id, ?variant, error = %e, "variant download failed");
                    continue;
                }
            }
        }
        None
    }

    async fn upload(
        &self,
        chat_identifier: &str,
        message_id: i64,
        bytes: Vec<u8>,
    ) -> Option<String> {
        let path = format!(
            "{}/{}/{}_{}.jpg",
            self.path_prefix,
            chat_identifier,
            message_id,
            Utc::now().timestamp_millis()
        );
        match self.assets.upload(&path, bytes, "image/jpeg", true).await {
            Ok(url) => {
                info!(message_id, url = %url, "channel image uploaded");
                Some(url)
            }
            Err(e) => {
                warn!(message_id, error = %e, "image upload failed");
                None
            }
        }
    }
}

/// True when channel media should be attempted for this message.
///
/// A literal `blob:` reference anywhere in the message forces the attempt:
/// such a reference is never persistable, so channel media is the only
/// legitimate image source left.
pub fn wants_channel_media(message: &ChannelMessage) -> bool {
    if message.has_media {
        return true;
    }
    if message.text.contains("blob:") {
        return true;
    }
    message
        .entities
        .iter()
        .any(|e| e.url.as_deref().is_some_and(|u| u.starts_with("blob:")))
}

/// Sniffs the JPEG/PNG/GIF magic bytes.
pub fn has_image_signature(bytes: &[u8]) -> bool {
    matches!(
        bytes,
        [0xFF, 0xD8, ..] | [0x89, 0x50, 0x4E, 0x47, ..] | [0x47, 0x49, 0x46, ..]
    )
}
