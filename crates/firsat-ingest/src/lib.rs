// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel ingestion for the Firsat deal pipeline.
//!
//! [`ChannelIngestor`] is the entry point: one call polls a bounded window
//! of recent messages per configured channel, deduplicates against the
//! document store, enriches drafts from linked merchant pages and channel
//! media, and persists new deals unapproved. Collaborators are injected;
//! nothing here owns a connection.

pub mod images;
pub mod orchestrator;

pub use images::ImageResolver;
pub use orchestrator::{ChannelIngestor, IngestSummary};
