// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./firsat.toml` > `~/.config/firsat/firsat.toml`
//! > `/etc/firsat/firsat.toml`, with environment variable overrides via the
//! `FIRSAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FirsatConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/firsat/firsat.toml` (system-wide)
/// 3. `~/.config/firsat/firsat.toml` (user XDG config)
/// 4. `./firsat.toml` (local directory)
/// 5. `FIRSAT_*` environment variables
pub fn load_config() -> Result<FirsatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FirsatConfig::default()))
        .merge(Toml::file("/etc/firsat/firsat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("firsat/firsat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("firsat.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Useful for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FirsatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FirsatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FirsatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FirsatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FIRSAT_HTTP_MAX_RETRIES` must map to
/// `http.max_retries`, not `http.max.retries`.
fn env_provider() -> Env {
    Env::prefixed("FIRSAT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("ingest_", "ingest.", 1)
            .replacen("http_", "http.", 1)
            .replacen("notify_", "notify.", 1)
            .replacen("channel_", "channel.", 1)
            .replacen("assets_", "assets.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_extract_cleanly() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.ingest.fetch_limit, 5);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.max_html_bytes, 200_000);
        assert_eq!(config.notify.batch_size, 300);
        assert_eq!(config.notify.broad_topic, "all_deals");
        assert!(config.channel.api_id.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [ingest]
            channels = ["@firsatkanali", "-1001234"]
            fetch_limit = 10

            [notify]
            batch_size = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.ingest.channels.len(), 2);
        assert_eq!(config.ingest.fetch_limit, 10);
        assert_eq!(config.notify.batch_size, 100);
        // Untouched sections keep their defaults.
        assert_eq!(config.http.max_retries, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [ingest]
            fetch_limt = 10
            "#,
        );
        assert!(result.is_err(), "typoed key should fail extraction");
    }
}
