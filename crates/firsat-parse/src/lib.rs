// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message and price parsing for the Firsat deal pipeline.
//!
//! Pure functions only: locale-aware price normalization, channel message
//! parsing with ordered fallback chains, merchant and category resolution.
//! Nothing in this crate touches the network or the store.

pub mod category;
pub mod message;
pub mod price;
pub mod store;

pub use category::detect_category;
pub use message::{DealDraft, parse_message};
pub use price::parse_price;
pub use store::{resolve_store, store_from_hostname, store_from_link};
