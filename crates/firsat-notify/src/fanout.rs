// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification fan-out engine.
//!
//! Reacts to deal lifecycle events from the document store. An unapproved
//! creation notifies the admin review queue; an approval (at creation or
//! by moderation) triggers three independent sub-dispatches: broad and
//! category topics, keyword watchers, and the poster's followers. The
//! sub-dispatches are failure-isolated from each other, and per-recipient
//! delivery failures are logged, never retried here.

use std::sync::Arc;

use futures::StreamExt;
use metrics::counter;
use tracing::{debug, error, info, warn};

use firsat_config::model::NotifyConfig;
use firsat_core::types::{Deal, DealChange, DocId, TokenMessage};
use firsat_core::{DocumentStore, FirsatError, NotificationTransport};

use crate::event::{FanoutDecision, classify};
use crate::keywords::{chunk, matching_keyword};
use crate::payload::{
    admin_payload, clean_topic_name, deal_payload, follower_payload, keyword_payload,
    normalize_for_match,
};

/// Event-triggered notification dispatcher.
pub struct FanoutEngine {
    store: Arc<dyn DocumentStore>,
    transport: Arc<dyn NotificationTransport>,
    config: NotifyConfig,
}

impl FanoutEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        transport: Arc<dyn NotificationTransport>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// Subscribes to the document store's deal changes and dispatches
    /// until the stream ends.
    pub async fn run(&self) -> Result<(), FirsatError> {
        let mut changes = self.store.subscribe_deal_changes().await?;
        info!("fan-out engine subscribed to deal changes");
        while let Some(change) = changes.next().await {
            self.handle_change(&change).await;
        }
        info!("deal change stream ended");
        Ok(())
    }

    /// Dispatches a single change. All delivery failures surface as log
    /// entries; nothing here aborts the change stream.
    pub async fn handle_change(&self, change: &DealChange) {
        match classify(change) {
            FanoutDecision::AdminReview => {
                debug!(doc_id = %change.doc_id, "unapproved deal, admin review only");
                self.admin_review(&change.after, &change.doc_id).await;
            }
            FanoutDecision::FullFanout => {
                info!(doc_id = %change.doc_id, title = %change.after.title, "running full fan-out");
                self.full_fanout(&change.after, &change.doc_id).await;
            }
            FanoutDecision::Ignore => {
                debug!(doc_id = %change.doc_id, "change requires no notification");
            }
        }
    }

    /// Sends the single admin-queue notification for an unapproved deal.
    /// A deal with no resolved price or image still reaches review.
    async fn admin_review(&self, deal: &Deal, doc_id: &DocId) {
        let payload = admin_payload(deal, doc_id);
        match self
            .transport
            .send_to_topic(&self.config.admin_topic, &payload)
            .await
        {
            Ok(()) => counter!("firsat_notify_admin").increment(1),
            Err(e) => error!(doc_id = %doc_id, error = %e, "admin notification failed"),
        }
    }

    /// Runs the three sub-dispatches. Each catches its own failure so one
    /// failing audience never blocks the others.
    pub async fn full_fanout(&self, deal: &Deal, doc_id: &DocId) {
        self.topic_dispatch(deal, doc_id).await;

        if let Err(e) = self.keyword_dispatch(deal, doc_id).await {
            error!(doc_id = %doc_id, error = %e, "keyword dispatch failed");
        }
        if let Err(e) = self.follower_dispatch(deal, doc_id).await {
            error!(doc_id = %doc_id, error = %e, "follower dispatch failed");
        }
    }

    /// Broad "all deals" topic plus the per-category topic.
    async fn topic_dispatch(&self, deal: &Deal, doc_id: &DocId) {
        let payload = deal_payload(deal, doc_id);
        let category_topic = format!("category_{}", clean_topic_name(&deal.category));

        for topic in [self.config.broad_topic.as_str(), category_topic.as_str()] {
            match self.transport.send_to_topic(topic, &payload).await {
                Ok(()) => {
                    debug!(topic, doc_id = %doc_id, "topic notification sent");
                    counter!("firsat_notify_topic").increment(1);
                }
                Err(e) => {
                    error!(topic, doc_id = %doc_id, error = %e, "topic notification failed");
                }
            }
        }
    }

    /// Scans every user's watched keywords against the deal text.
    ///
    /// Keyword matches are opt-in-specific and deliberately bypass the
    /// per-user general-notification preference.
    async fn keyword_dispatch(&self, deal: &Deal, doc_id: &DocId) -> Result<(), FirsatError> {
        let users = self.store.list_users().await?;
        let haystack = normalize_for_match(&format!("{} {}", deal.title, deal.description));

        let mut messages: Vec<TokenMessage> = Vec::new();
        for user in &users {
            let Some(token) = user.notification_token.as_deref() else {
                continue;
            };
            if let Some(keyword) = matching_keyword(user, &haystack) {
                messages.push(TokenMessage {
                    token: token.to_string(),
                    payload: keyword_payload(deal, doc_id, &keyword),
                });
            }
        }

        if messages.is_empty() {
            debug!(doc_id = %doc_id, "no keyword watchers matched");
            return Ok(());
        }

        info!(
            doc_id = %doc_id,
            recipients = messages.len(),
            "dispatching keyword notifications"
        );
        self.send_chunked(messages).await;
        Ok(())
    }

    /// Notifies the poster's opted-in followers about a user-submitted
    /// deal. Bot-sourced deals never reach this audience.
    async fn follower_dispatch(&self, deal: &Deal, doc_id: &DocId) -> Result<(), FirsatError> {
        if !deal.is_user_submitted {
            return Ok(());
        }
        let Some(poster_id) = deal.posted_by.as_deref() else {
            return Ok(());
        };

        let Some(poster) = self.store.get_user(poster_id).await? else {
            warn!(doc_id = %doc_id, poster_id, "poster record not found");
            return Ok(());
        };
        let poster_name = poster.display_name.clone().unwrap_or(poster.id.clone());

        let mut messages: Vec<TokenMessage> = Vec::new();
        for follower_id in &poster.followers_with_notifications {
            let Some(follower) = self.store.get_user(follower_id).await? else {
                continue;
            };
            let Some(token) = follower.notification_token else {
                continue;
            };
            messages.push(TokenMessage {
                token,
                payload: follower_payload(deal, doc_id, &poster_name),
            });
        }

        if messages.is_empty() {
            debug!(doc_id = %doc_id, "no followers to notify");
            return Ok(());
        }

        info!(
            doc_id = %doc_id,
            recipients = messages.len(),
            "dispatching follower notifications"
        );
        self.send_chunked(messages).await;
        Ok(())
    }

    /// Sends token messages in transport-sized batches, logging the
    /// per-recipient tally. Failed recipients are logged and dropped;
    /// retry is a monitoring-layer concern, not ours.
    async fn send_chunked(&self, messages: Vec<TokenMessage>) {
        for batch in chunk(messages, self.config.batch_size) {
            let size = batch.len();
            match self.transport.send_batch(batch).await {
                Ok(report) => {
                    counter!("firsat_notify_sent").increment(report.success_count as u64);
                    counter!("firsat_notify_failures").increment(report.failure_count as u64);
                    if report.failure_count > 0 {
                        for failed in report.results.iter().filter(|r| r.error.is_some()) {
                            warn!(
                                token = %failed.token,
                                error = failed.error.as_deref().unwrap_or_default(),
                                "recipient delivery failed"
                            );
                        }
                    }
                    debug!(
                        sent = report.success_count,
                        failed = report.failure_count,
                        "batch dispatched"
                    );
                }
                Err(e) => {
                    counter!("firsat_notify_failures").increment(size as u64);
                    error!(size, error = %e, "batch send rejected");
                }
            }
        }
    }
}
