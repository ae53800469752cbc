// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Firsat deal pipeline.

use thiserror::Error;

/// The primary error type used across all Firsat collaborator traits and
/// pipeline operations.
#[derive(Debug, Error)]
pub enum FirsatError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store errors (query failure, rejected write, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel transport errors (connection failure, entity resolution, media download).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTML fetch errors that survived the retry budget.
    #[error("fetch error: {message}")]
    Fetch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notification transport errors (topic send failure, batch rejection).
    #[error("notify error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Asset store errors (upload rejected, bucket unavailable).
    #[error("asset error: {source}")]
    Asset {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FirsatError {
    /// Wraps an arbitrary error as a store failure.
    pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FirsatError::Store {
            source: Box::new(source),
        }
    }

    /// Builds a channel error from a message alone.
    pub fn channel(message: impl Into<String>) -> Self {
        FirsatError::Channel {
            message: message.into(),
            source: None,
        }
    }
}
