// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification targeting and fan-out for the Firsat deal pipeline.
//!
//! [`FanoutEngine::run`] subscribes to the document store's deal change
//! stream; [`event::classify`] decides what each change means, and the
//! engine fans approved deals out to topic subscribers, keyword watchers,
//! and the poster's followers in three failure-isolated sub-dispatches.

pub mod event;
pub mod fanout;
pub mod keywords;
pub mod payload;

pub use event::{FanoutDecision, classify};
pub use fanout::FanoutEngine;
pub use payload::clean_topic_name;
