// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Firsat deal pipeline.
//!
//! This crate provides the domain types, error type, and collaborator
//! trait definitions used throughout the workspace. The document store,
//! notification transport, channel transport, and asset store are external
//! services consumed through the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FirsatError;
pub use types::{
    BatchReport, ChannelEntity, ChannelMessage, ChannelRef, Deal, DealChange, DealPatch,
    DealPayload, DealSource, DocId, MediaVariant, MessageEntity, SendResult, StoredDeal,
    TokenMessage, User,
};

pub use traits::{AssetStore, ChannelTransport, DocumentStore, NotificationTransport};
