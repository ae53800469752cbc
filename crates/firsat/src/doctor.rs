// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration preflight checks.

use firsat_config::FirsatConfig;
use firsat_core::FirsatError;
use firsat_core::types::ChannelRef;

/// Reports how each configured channel parses and which credentials are
/// missing. Validation already ran; this is the human-readable summary.
pub fn run(config: &FirsatConfig) -> Result<(), FirsatError> {
    println!("firsat doctor");
    println!();

    if config.ingest.channels.is_empty() {
        println!("channels: none configured (ingest.channels is empty)");
    } else {
        println!("channels ({}):", config.ingest.channels.len());
        for raw in &config.ingest.channels {
            match ChannelRef::parse(raw) {
                ChannelRef::Username(name) => println!("  {raw} -> username '{name}'"),
                ChannelRef::Id(id) if id < 0 => {
                    println!("  {raw} -> group id {id} (supergroup ladder applies)")
                }
                ChannelRef::Id(id) => println!("  {raw} -> chat id {id}"),
            }
        }
    }
    println!();

    let mut warnings = 0;
    if config.channel.api_id.is_none() {
        println!("warning: channel.api_id is not set; ingestion cannot connect");
        warnings += 1;
    }
    if config.channel.api_hash.is_none() {
        println!("warning: channel.api_hash is not set; ingestion cannot connect");
        warnings += 1;
    }
    if config.channel.session.is_none() {
        println!("warning: channel.session is not set; an interactive login will be required");
        warnings += 1;
    }

    println!();
    println!(
        "fetch window: {} messages, enrichment budget {}s, http timeout {}s (+{} retries)",
        config.ingest.fetch_limit,
        config.ingest.max_enrichment_secs,
        config.http.timeout_secs,
        config.http.max_retries,
    );
    println!(
        "notify: broad topic '{}', admin topic '{}', batch size {}",
        config.notify.broad_topic, config.notify.admin_topic, config.notify.batch_size,
    );
    println!();

    if warnings == 0 {
        println!("ok: configuration is complete");
    } else {
        println!("{warnings} warning(s)");
    }
    Ok(())
}
