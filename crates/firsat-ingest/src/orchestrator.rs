// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal ingestion orchestrator.
//!
//! Polls a bounded window of recent channel messages, deduplicates against
//! the document store, parses each message into a draft, enriches it from
//! the linked merchant page, and persists the result. Channels are
//! independent units of work: a channel that fails to resolve aborts only
//! its own run, and a message that fails to process only skips itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use tracing::{debug, error, info, warn};

use firsat_config::model::{HttpConfig, IngestConfig};
use firsat_core::types::{
    ChannelEntity, ChannelMessage, ChannelRef, Deal, DealSource, DocId,
};
use firsat_core::{ChannelTransport, DocumentStore, FirsatError};
use firsat_parse::{DealDraft, parse_message, store_from_hostname};
use firsat_scrape::{FetchedPage, HtmlFetcher, PageData, analyze_page};

use crate::images::{ImageResolver, wants_channel_media};

/// Per-channel ingestion summary.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub created: Vec<DocId>,
    pub skipped: usize,
    pub failed: usize,
}

/// Orchestrates one ingestion pass per channel.
pub struct ChannelIngestor {
    store: Arc<dyn DocumentStore>,
    channel: Arc<dyn ChannelTransport>,
    fetcher: HtmlFetcher,
    images: ImageResolver,
    ingest_config: IngestConfig,
    http_config: HttpConfig,
}

impl ChannelIngestor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        channel: Arc<dyn ChannelTransport>,
        fetcher: HtmlFetcher,
        images: ImageResolver,
        ingest_config: IngestConfig,
        http_config: HttpConfig,
    ) -> Self {
        Self {
            store,
            channel,
            fetcher,
            images,
            ingest_config,
            http_config,
        }
    }

    /// Runs one ingestion pass over every configured channel.
    ///
    /// Channels are isolated: a failing channel is logged and the pass
    /// continues with the next one.
    pub async fn ingest_all(&self) -> Vec<(String, Result<IngestSummary, FirsatError>)> {
        if let Err(e) = self.channel.connect().await {
            error!(error = %e, "channel session connect failed");
            return self
                .ingest_config
                .channels
                .iter()
                .map(|raw| {
                    (
                        raw.clone(),
                        Err(FirsatError::channel("channel session unavailable")),
                    )
                })
                .collect();
        }

        let mut results = Vec::new();
        for raw in self.ingest_config.channels.clone() {
            let outcome = self.ingest_channel(&raw).await;
            if let Err(e) = &outcome {
                error!(channel = %raw, error = %e, "channel ingestion failed");
            }
            results.push((raw, outcome));
        }
        results
    }

    /// Ingests the recent-message window of a single channel.
    ///
    /// Entity resolution failure propagates and aborts this channel's run;
    /// per-message failures are logged and skipped.
    ///
    /// Dedup is a read-then-write check: two concurrent runs over the same
    /// channel could double-insert a message before either write is
    /// visible. The deployment model is a single poller per channel, which
    /// keeps that window theoretical.
    pub async fn ingest_channel(&self, raw_channel: &str) -> Result<IngestSummary, FirsatError> {
        let channel_ref = ChannelRef::parse(raw_channel);
        let chat_identifier = channel_ref.identifier();

        let entity = self.resolve_entity(&channel_ref).await?;
        info!(
            channel = %chat_identifier,
            entity_id = entity.id,
            title = entity.title.as_deref().unwrap_or_default(),
            "channel resolved"
        );

        let messages = self
            .channel
            .list_recent_messages(&entity, self.ingest_config.fetch_limit)
            .await?;
        debug!(channel = %chat_identifier, count = messages.len(), "messages listed");

        let mut summary = IngestSummary::default();
        for message in &messages {
            if message.text.trim().is_empty() {
                continue;
            }
            match self.process_message(&entity, &chat_identifier, message).await {
                Ok(Some(id)) => summary.created.push(id),
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        channel = %chat_identifier,
                        message_id = message.id,
                        error = %e,
                        "message processing failed, continuing batch"
                    );
                }
            }
        }

        info!(
            channel = %chat_identifier,
            created = summary.created.len(),
            skipped = summary.skipped,
            failed = summary.failed,
            "ingestion pass complete"
        );
        Ok(summary)
    }

    /// Resolves a channel reference, walking the id-normalization ladder
    /// for group ids: the raw negative id first, then the
    /// supergroup-prefixed form, then the bare chat id. Usernames resolve
    /// directly.
    async fn resolve_entity(&self, channel_ref: &ChannelRef) -> Result<ChannelEntity, FirsatError> {
        let first_attempt = self.channel.resolve_entity(channel_ref).await;

        let &ChannelRef::Id(id) = channel_ref else {
            return first_attempt;
        };
        if id >= 0 {
            return first_attempt;
        }
        let first_err = match first_attempt {
            Ok(entity) => return Ok(entity),
            Err(e) => e,
        };

        // Group ids sometimes need the supergroup prefix transform.
        let digits = id.unsigned_abs();
        if !id.to_string().starts_with("-100")
            && let Ok(supergroup_id) = format!("-100{digits}").parse::<i64>()
        {
            debug!(id, supergroup_id, "retrying with supergroup id");
            if let Ok(entity) = self
                .channel
                .resolve_entity(&ChannelRef::Id(supergroup_id))
                .await
            {
                return Ok(entity);
            }
        }

        // Last resort: a plain (non-super) group chat id.
        debug!(id, "retrying with bare chat id");
        match self.channel.resolve_entity(&ChannelRef::Id(id.abs())).await {
            Ok(entity) => Ok(entity),
            Err(_) => Err(first_err),
        }
    }

    /// Processes one message end to end. `Ok(None)` is a skip (duplicate
    /// or unusable draft), not a failure.
    async fn process_message(
        &self,
        entity: &ChannelEntity,
        chat_identifier: &str,
        message: &ChannelMessage,
    ) -> Result<Option<DocId>, FirsatError> {
        if self
            .store
            .find_deal_by_message(chat_identifier, message.id)
            .await?
            .is_some()
        {
            debug!(message_id = message.id, "already ingested, skipping");
            return Ok(None);
        }

        let draft = parse_message(&message.text, &message.entities, &message.button_urls);
        let Some(link) = draft.link.clone() else {
            warn!(message_id = message.id, "draft has no link, skipping");
            return Ok(None);
        };

        // A slow merchant page must not starve the rest of the batch.
        let enrichment_budget = Duration::from_secs(self.ingest_config.max_enrichment_secs);
        let enrichment = tokio::time::timeout(
            enrichment_budget,
            self.enrich(entity, chat_identifier, message, &link),
        )
        .await
        .unwrap_or_else(|_| {
            warn!(
                message_id = message.id,
                budget = ?enrichment_budget,
                "enrichment timed out, persisting unenriched"
            );
            Enrichment::default()
        });

        let deal = build_deal(draft, link, chat_identifier, entity, message, enrichment);
        let id = self.store.create_deal(&deal).await?;
        counter!("firsat_deals_created").increment(1);
        info!(
            message_id = message.id,
            doc_id = %id,
            title = %deal.title,
            price = deal.price,
            "deal created"
        );
        Ok(Some(id))
    }

    /// Fetches the linked page once and derives every enrichment from it:
    /// link price (authoritative over the message-parsed price), original
    /// price, image, and the post-redirect merchant identity.
    async fn enrich(
        &self,
        entity: &ChannelEntity,
        chat_identifier: &str,
        message: &ChannelMessage,
        link: &str,
    ) -> Enrichment {
        let page: Option<FetchedPage> = if should_fetch(link) {
            self.fetcher
                .fetch_html(link, self.http_config.max_retries)
                .await
        } else {
            None
        };

        let page_data: Option<PageData> = page
            .as_ref()
            .map(|p| analyze_page(&p.html, &p.final_url));

        let image_url = self
            .images
            .resolve(entity, message, chat_identifier, page_data.as_ref())
            .await;

        let final_url = page.as_ref().map(|p| p.final_url.clone());

        Enrichment {
            page_data,
            image_url,
            final_url,
        }
    }
}

/// Whether the link is worth fetching at all. A message that only carries
/// a `blob:` reference has nothing fetchable behind it.
fn should_fetch(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// Everything the link and media enrichment recovered for one message.
#[derive(Debug, Default)]
struct Enrichment {
    page_data: Option<PageData>,
    image_url: Option<String>,
    final_url: Option<String>,
}

/// Assembles the full deal record from the draft and its enrichment.
fn build_deal(
    draft: DealDraft,
    link: String,
    chat_identifier: &str,
    entity: &ChannelEntity,
    message: &ChannelMessage,
    enrichment: Enrichment,
) -> Deal {
    let mut price = draft.price;
    let mut original_price = 0.0;

    // Link data is more authoritative than free-text parsing.
    if let Some(page_data) = &enrichment.page_data
        && let Some(link_price) = page_data.price
    {
        price = link_price;
        original_price = page_data.original_price.unwrap_or(0.0);
    }
    if original_price <= price {
        original_price = price;
    }

    // A redirect landed on the real merchant; refresh the store name and
    // persist the final URL.
    let mut store_name = draft.store;
    let final_link = match enrichment.final_url {
        Some(final_url) if final_url != link => {
            if let Ok(parsed) = url::Url::parse(&final_url)
                && let Some(host) = parsed.host_str()
                && let Some(refreshed) = store_from_hostname(host)
            {
                debug!(from = %link, to = %final_url, store = %refreshed, "redirect refreshed store");
                store_name = refreshed;
            }
            final_url
        }
        _ => link,
    };

    let now = Utc::now().to_rfc3339();
    Deal {
        title: draft.title,
        price,
        original_price,
        discount_rate: Deal::compute_discount_rate(original_price, price),
        store: store_name,
        category: draft.category,
        link: final_link,
        image_url: enrichment.image_url,
        description: draft.description,
        source: DealSource::Telegram,
        is_approved: false,
        is_expired: false,
        is_editor_pick: false,
        is_user_submitted: false,
        posted_by: Some(format!("telegram_channel_{chat_identifier}")),
        chat_id: Some(entity.id.to_string()),
        chat_type: Some(if entity.is_broadcast { "channel" } else { "group" }.to_string()),
        chat_title: entity.title.clone(),
        chat_username: chat_identifier.to_string(),
        message_id: message.id,
        hot_votes: 0,
        cold_votes: 0,
        comment_count: 0,
        created_at: now.clone(),
        updated_at: now,
    }
}
