// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Firsat deal pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Firsat configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FirsatConfig {
    /// Channel polling and ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Outbound HTML fetch settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Notification fan-out settings.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Channel transport credentials.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Image asset storage settings.
    #[serde(default)]
    pub assets: AssetConfig,
}

/// Channel polling and ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Channels to poll, as `@username` or numeric/group id strings.
    #[serde(default)]
    pub channels: Vec<String>,

    /// How many recent messages to list per channel per run.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Upper bound on per-message enrichment time, in seconds. A slow
    /// merchant page must not starve the rest of the batch.
    #[serde(default = "default_enrichment_secs")]
    pub max_enrichment_secs: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            fetch_limit: default_fetch_limit(),
            max_enrichment_secs: default_enrichment_secs(),
            log_level: default_log_level(),
        }
    }
}

fn default_fetch_limit() -> usize {
    5
}

fn default_enrichment_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound HTML fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Response body cap in bytes; structured data is front-loaded, so the
    /// rest of the page is not worth the transfer.
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_html_bytes: default_max_html_bytes(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> usize {
    2
}

fn default_max_html_bytes() -> usize {
    200_000
}

/// Notification fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Topic receiving approval-queue notifications.
    #[serde(default = "default_admin_topic")]
    pub admin_topic: String,

    /// Topic receiving every approved deal.
    #[serde(default = "default_broad_topic")]
    pub broad_topic: String,

    /// Recipients per batch send; the transport caps batch size per call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            admin_topic: default_admin_topic(),
            broad_topic: default_broad_topic(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_admin_topic() -> String {
    "admin_deals".to_string()
}

fn default_broad_topic() -> String {
    "all_deals".to_string()
}

fn default_batch_size() -> usize {
    300
}

/// Channel transport credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Platform API id. `None` disables ingestion.
    #[serde(default)]
    pub api_id: Option<i32>,

    /// Platform API hash.
    #[serde(default)]
    pub api_hash: Option<String>,

    /// Serialized session string for an authenticated account.
    #[serde(default)]
    pub session: Option<String>,
}

/// Image asset storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Path prefix for uploaded channel images.
    #[serde(default = "default_asset_prefix")]
    pub path_prefix: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_asset_prefix(),
        }
    }
}

fn default_asset_prefix() -> String {
    "telegram".to_string()
}
