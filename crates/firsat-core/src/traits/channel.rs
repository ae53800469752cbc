// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel transport collaborator trait.

use async_trait::async_trait;

use crate::error::FirsatError;
use crate::types::{ChannelEntity, ChannelMessage, ChannelRef, MediaVariant};

/// Session against the messaging platform the deals are sourced from.
///
/// The transport owns connection state and authentication; the pipeline
/// only lists a bounded window of recent messages and downloads media.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Establishes the session. Idempotent when already connected.
    async fn connect(&self) -> Result<(), FirsatError>;

    /// Tears the session down, releasing any held resources.
    async fn disconnect(&self) -> Result<(), FirsatError>;

    /// Resolves a channel reference to a live entity.
    ///
    /// One lookup per call; the ingestion orchestrator owns the
    /// id-normalization ladder for group ids and retries with transformed
    /// references itself.
    async fn resolve_entity(&self, channel: &ChannelRef) -> Result<ChannelEntity, FirsatError>;

    /// Lists the most recent `limit` messages of an entity, newest first.
    async fn list_recent_messages(
        &self,
        entity: &ChannelEntity,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, FirsatError>;

    /// Downloads a message's media in the requested size variant.
    ///
    /// `Ok(None)` means the message has no media or the variant is
    /// unavailable; transport failures are errors so the caller can retry
    /// another variant.
    async fn download_media(
        &self,
        entity: &ChannelEntity,
        message_id: i64,
        variant: MediaVariant,
    ) -> Result<Option<Vec<u8>>, FirsatError>;
}
