// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of loaded configuration.
//!
//! Figment guarantees the types; this pass checks value ranges and
//! cross-field constraints that serde cannot express.

use firsat_core::FirsatError;

use crate::model::FirsatConfig;

/// Validates a loaded configuration, collecting every violation.
pub fn validate_config(config: &FirsatConfig) -> Result<(), FirsatError> {
    let mut problems = Vec::new();

    if config.ingest.fetch_limit == 0 {
        problems.push("ingest.fetch_limit must be at least 1".to_string());
    }
    if config.ingest.fetch_limit > 100 {
        problems.push(format!(
            "ingest.fetch_limit is {}; this pipeline polls a bounded window, not history (max 100)",
            config.ingest.fetch_limit
        ));
    }
    if config.ingest.max_enrichment_secs == 0 {
        problems.push("ingest.max_enrichment_secs must be at least 1".to_string());
    }

    const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !VALID_LEVELS.contains(&config.ingest.log_level.as_str()) {
        problems.push(format!(
            "ingest.log_level '{}' is not one of {:?}",
            config.ingest.log_level, VALID_LEVELS
        ));
    }

    if config.http.timeout_secs == 0 {
        problems.push("http.timeout_secs must be at least 1".to_string());
    }
    if config.http.max_html_bytes < 1024 {
        problems.push("http.max_html_bytes below 1 KiB cannot hold a <head> section".to_string());
    }

    if config.notify.batch_size == 0 || config.notify.batch_size > 500 {
        problems.push(format!(
            "notify.batch_size is {}; the transport accepts 1..=500 per call",
            config.notify.batch_size
        ));
    }
    if config.notify.admin_topic.is_empty() {
        problems.push("notify.admin_topic cannot be empty".to_string());
    }
    if config.notify.broad_topic.is_empty() {
        problems.push("notify.broad_topic cannot be empty".to_string());
    }

    for raw in &config.ingest.channels {
        if raw.trim().is_empty() {
            problems.push("ingest.channels contains an empty entry".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(FirsatError::Config(problems.join("; ")))
    }
}
