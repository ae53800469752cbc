// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collaborator implementations for integration tests.
//!
//! Every external service the pipeline consumes has a scriptable stand-in
//! here: a document store backed by vectors, a notification transport that
//! records what it was asked to send, a channel transport serving canned
//! messages and media, and an asset store that fabricates public URLs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures_core::stream::BoxStream;
use tokio::sync::mpsc;

use firsat_core::types::{
    BatchReport, ChannelEntity, ChannelMessage, ChannelRef, Deal, DealChange, DealPatch,
    DealPayload, DocId, MediaVariant, SendResult, StoredDeal, TokenMessage, User,
};
use firsat_core::{
    AssetStore, ChannelTransport, DocumentStore, FirsatError, NotificationTransport,
};

// --- Document store ---

/// Vector-backed document store that emits deal changes to at most one
/// subscriber.
#[derive(Default)]
pub struct MemoryStore {
    deals: Mutex<Vec<StoredDeal>>,
    users: Mutex<Vec<User>>,
    next_id: AtomicU64,
    change_tx: Mutex<Option<mpsc::UnboundedSender<DealChange>>>,
    change_rx: Mutex<Option<mpsc::UnboundedReceiver<DealChange>>>,
    /// When set, `create_deal` fails for deals whose title contains this
    /// substring. Used to exercise per-message failure isolation.
    fail_creates_containing: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            change_tx: Mutex::new(Some(tx)),
            change_rx: Mutex::new(Some(rx)),
            ..Default::default()
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn deals(&self) -> Vec<StoredDeal> {
        self.deals.lock().unwrap().clone()
    }

    pub fn deal_count(&self) -> usize {
        self.deals.lock().unwrap().len()
    }

    pub fn fail_creates_containing(&self, needle: &str) {
        *self.fail_creates_containing.lock().unwrap() = Some(needle.to_string());
    }

    /// Drops the change sender so a subscribed stream ends.
    pub fn close_changes(&self) {
        self.change_tx.lock().unwrap().take();
    }

    fn emit(&self, change: DealChange) {
        if let Some(tx) = self.change_tx.lock().unwrap().as_ref() {
            let _ = tx.send(change);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_deal_by_message(
        &self,
        chat_username: &str,
        message_id: i64,
    ) -> Result<Option<StoredDeal>, FirsatError> {
        Ok(self
            .deals
            .lock()
            .unwrap()
            .iter()
            .find(|stored| {
                stored.deal.chat_username == chat_username && stored.deal.message_id == message_id
            })
            .cloned())
    }

    async fn create_deal(&self, deal: &Deal) -> Result<DocId, FirsatError> {
        if let Some(needle) = self.fail_creates_containing.lock().unwrap().as_ref()
            && deal.title.contains(needle)
        {
            return Err(FirsatError::Store {
                source: format!("write rejected for '{}'", deal.title).into(),
            });
        }

        let id = DocId(format!("deal-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.deals.lock().unwrap().push(StoredDeal {
            id: id.clone(),
            deal: deal.clone(),
        });
        self.emit(DealChange {
            doc_id: id.clone(),
            before: None,
            after: deal.clone(),
        });
        Ok(id)
    }

    async fn update_deal(&self, id: &DocId, patch: &DealPatch) -> Result<(), FirsatError> {
        let mut deals = self.deals.lock().unwrap();
        let stored = deals
            .iter_mut()
            .find(|stored| &stored.id == id)
            .ok_or_else(|| FirsatError::Store {
                source: format!("no deal {id}").into(),
            })?;

        let before = stored.deal.clone();
        if let Some(approved) = patch.is_approved {
            stored.deal.is_approved = approved;
        }
        if let Some(expired) = patch.is_expired {
            stored.deal.is_expired = expired;
        }
        if let Some(image_url) = &patch.image_url {
            stored.deal.image_url = Some(image_url.clone());
        }
        if let Some(updated_at) = &patch.updated_at {
            stored.deal.updated_at = updated_at.clone();
        }
        let change = DealChange {
            doc_id: id.clone(),
            before: Some(before),
            after: stored.deal.clone(),
        };
        drop(deals);
        self.emit(change);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, FirsatError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, FirsatError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn subscribe_deal_changes(
        &self,
    ) -> Result<BoxStream<'static, DealChange>, FirsatError> {
        let rx = self
            .change_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| FirsatError::Store {
                source: "change stream already subscribed".into(),
            })?;
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|change| (change, rx))
        });
        Ok(Box::pin(stream))
    }
}

// --- Notification transport ---

/// Transport that records every send and can be told to fail specific
/// tokens or reject topic sends wholesale.
#[derive(Default)]
pub struct RecordingNotifier {
    topic_sends: Mutex<Vec<(String, DealPayload)>>,
    batches: Mutex<Vec<Vec<TokenMessage>>>,
    failing_tokens: Mutex<Vec<String>>,
    fail_topics: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_token(&self, token: &str) {
        self.failing_tokens.lock().unwrap().push(token.to_string());
    }

    pub fn fail_topic_sends(&self) {
        *self.fail_topics.lock().unwrap() = true;
    }

    pub fn topic_sends(&self) -> Vec<(String, DealPayload)> {
        self.topic_sends.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<TokenMessage>> {
        self.batches.lock().unwrap().clone()
    }

    /// All tokens across all batches, in send order.
    pub fn batched_tokens(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|m| m.token.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationTransport for RecordingNotifier {
    async fn send_to_topic(
        &self,
        topic: &str,
        payload: &DealPayload,
    ) -> Result<(), FirsatError> {
        if *self.fail_topics.lock().unwrap() {
            return Err(FirsatError::Notify {
                message: format!("topic {topic} rejected"),
                source: None,
            });
        }
        self.topic_sends
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.clone()));
        Ok(())
    }

    async fn send_batch(
        &self,
        messages: Vec<TokenMessage>,
    ) -> Result<BatchReport, FirsatError> {
        let failing = self.failing_tokens.lock().unwrap().clone();
        let mut report = BatchReport::default();
        for message in &messages {
            if failing.contains(&message.token) {
                report.failure_count += 1;
                report.results.push(SendResult {
                    token: message.token.clone(),
                    error: Some("unregistered token".into()),
                });
            } else {
                report.success_count += 1;
                report.results.push(SendResult {
                    token: message.token.clone(),
                    error: None,
                });
            }
        }
        self.batches.lock().unwrap().push(messages);
        Ok(report)
    }
}

// --- Channel transport ---

/// Channel transport serving canned entities, messages, and media.
#[derive(Default)]
pub struct ScriptedChannel {
    entities: Mutex<HashMap<String, ChannelEntity>>,
    messages: Mutex<HashMap<i64, Vec<ChannelMessage>>>,
    media: Mutex<HashMap<i64, Vec<u8>>>,
    fail_resolution: Mutex<bool>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity under a channel identifier (`@`-less username
    /// or id string) with its message window.
    pub fn add_channel(
        &self,
        identifier: &str,
        entity: ChannelEntity,
        messages: Vec<ChannelMessage>,
    ) {
        self.messages.lock().unwrap().insert(entity.id, messages);
        self.entities
            .lock()
            .unwrap()
            .insert(identifier.to_string(), entity);
    }

    pub fn add_media(&self, message_id: i64, bytes: Vec<u8>) {
        self.media.lock().unwrap().insert(message_id, bytes);
    }

    pub fn fail_resolution(&self) {
        *self.fail_resolution.lock().unwrap() = true;
    }
}

#[async_trait]
impl ChannelTransport for ScriptedChannel {
    async fn connect(&self) -> Result<(), FirsatError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), FirsatError> {
        Ok(())
    }

    async fn resolve_entity(
        &self,
        channel: &ChannelRef,
    ) -> Result<ChannelEntity, FirsatError> {
        if *self.fail_resolution.lock().unwrap() {
            return Err(FirsatError::channel("entity resolution scripted to fail"));
        }
        self.entities
            .lock()
            .unwrap()
            .get(&channel.identifier())
            .cloned()
            .ok_or_else(|| FirsatError::channel(format!("unknown channel {channel:?}")))
    }

    async fn list_recent_messages(
        &self,
        entity: &ChannelEntity,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, FirsatError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(&entity.id)
            .map(|msgs| msgs.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn download_media(
        &self,
        _entity: &ChannelEntity,
        message_id: i64,
        _variant: MediaVariant,
    ) -> Result<Option<Vec<u8>>, FirsatError> {
        Ok(self.media.lock().unwrap().get(&message_id).cloned())
    }
}

// --- Asset store ---

/// Asset store that records uploads and fabricates public URLs.
#[derive(Default)]
pub struct MemoryAssets {
    uploads: Mutex<Vec<(String, usize)>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploaded paths with their payload sizes.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MemoryAssets {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        _make_public: bool,
    ) -> Result<String, FirsatError> {
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len()));
        Ok(format!("https://assets.invalid/{path}"))
    }
}
