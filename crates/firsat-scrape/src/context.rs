// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared extraction context.

use scraper::Html;
use serde_json::Value;
use url::Url;

/// Everything an extraction strategy may inspect: the parsed DOM, the raw
/// (possibly truncated) HTML, the page's final URL for relative-link
/// resolution, and the pre-parsed JSON-LD blocks.
pub struct PageContext<'a> {
    pub document: &'a Html,
    pub raw_html: &'a str,
    pub base: &'a Url,
    pub jsonld: &'a [Value],
}
