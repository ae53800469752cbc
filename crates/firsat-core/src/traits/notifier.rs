// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification transport collaborator trait.

use async_trait::async_trait;

use crate::error::FirsatError;
use crate::types::{BatchReport, DealPayload, TokenMessage};

/// Push-delivery transport.
///
/// Topic sends reach every subscriber of a named topic; batch sends target
/// individual device tokens. The transport caps batch size (observed cap
/// 300-500 per call), so callers chunk before handing messages over.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Delivers one payload to every subscriber of `topic`.
    async fn send_to_topic(&self, topic: &str, payload: &DealPayload) -> Result<(), FirsatError>;

    /// Delivers personalized payloads to a batch of tokens.
    ///
    /// Per-recipient failures are reported in the returned tally, not as an
    /// error; `Err` means the whole batch was rejected.
    async fn send_batch(&self, messages: Vec<TokenMessage>) -> Result<BatchReport, FirsatError>;
}
