// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store collaborator trait.

use async_trait::async_trait;
use futures_core::stream::BoxStream;

use crate::error::FirsatError;
use crate::types::{Deal, DealChange, DealPatch, DocId, StoredDeal, User};

/// The shared document store holding deals and users.
///
/// Deals are written by the ingestion orchestrator; users are read-only
/// here, owned by external account flows. Validation and defaulting of raw
/// store documents happens inside implementations, so the pipeline only
/// ever sees well-formed records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Looks up a deal by its natural dedup key.
    async fn find_deal_by_message(
        &self,
        chat_username: &str,
        message_id: i64,
    ) -> Result<Option<StoredDeal>, FirsatError>;

    /// Persists a new deal and returns its assigned id.
    async fn create_deal(&self, deal: &Deal) -> Result<DocId, FirsatError>;

    /// Applies a partial update to an existing deal document.
    async fn update_deal(&self, id: &DocId, patch: &DealPatch) -> Result<(), FirsatError>;

    /// Returns every user record. The keyword fan-out scans this list
    /// linearly; there is no precomputed keyword index.
    async fn list_users(&self) -> Result<Vec<User>, FirsatError>;

    /// Fetches a single user by id.
    async fn get_user(&self, id: &str) -> Result<Option<User>, FirsatError>;

    /// Subscribes to deal create/update events.
    ///
    /// The stream yields a [`DealChange`] per document mutation; `before`
    /// is `None` for creations. The stream ends when the store connection
    /// closes.
    async fn subscribe_deal_changes(
        &self,
    ) -> Result<BoxStream<'static, DealChange>, FirsatError>;
}
