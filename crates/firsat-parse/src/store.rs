// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merchant name resolution.
//!
//! Resolution ladder: explicit "store:" label in the message, known-brand
//! keyword anywhere in the text, then the link's domain name. Redirect
//! hosts (Google, YouTube) carry no merchant information and fall through
//! to the unknown-store sentinel.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use firsat_core::types::UNKNOWN_STORE;

/// Known merchant brands, matched case-insensitively as substrings of the
/// message text or the link hostname.
const KNOWN_STORES: &[(&str, &str)] = &[
    ("hepsiburada", "Hepsiburada"),
    ("trendyol", "Trendyol"),
    ("n11", "N11"),
    ("gittigidiyor", "GittiGidiyor"),
    ("amazon", "Amazon"),
    ("vatan", "Vatan Bilgisayar"),
    ("mediamarkt", "MediaMarkt"),
    ("teknosa", "Teknosa"),
];

/// Hosts that are link shorteners or redirectors, not merchants.
const REDIRECT_HOSTS: &[&str] = &["google", "youtube"];

static STORE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:mağaza|store|satıcı|seller|site)[\s:]+([^\n]+)").unwrap());

/// Resolves the merchant name for a message, using the link domain as a
/// fallback. Never returns an empty string.
pub fn resolve_store(text: &str, link: Option<&str>) -> String {
    if let Some(labelled) = labelled_store(text) {
        return labelled;
    }
    if let Some(brand) = brand_in_text(text) {
        return brand.to_string();
    }
    if let Some(link) = link
        && let Some(from_domain) = store_from_link(link)
    {
        return from_domain;
    }
    UNKNOWN_STORE.to_string()
}

/// Extracts an explicitly labelled store name ("mağaza: X").
///
/// The captured value is trimmed at the first comma and capped at 50 chars.
fn labelled_store(text: &str) -> Option<String> {
    let captures = STORE_LABEL.captures(text)?;
    let raw = captures.get(1)?.as_str();
    let name = raw.split(',').next().unwrap_or(raw).trim();
    if name.is_empty() {
        return None;
    }
    let mut name = name.to_string();
    if name.chars().count() > 50 {
        name = name.chars().take(47).collect::<String>() + "...";
    }
    Some(name)
}

/// Scans the text for a known brand keyword.
fn brand_in_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KNOWN_STORES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, display)| *display)
}

/// Derives a merchant name from a product URL's hostname.
pub fn store_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    store_from_hostname(host)
}

/// Derives a merchant name from a bare hostname.
///
/// Known brands match first; redirect hosts yield no store; anything else
/// falls back to the capitalized second-level domain label
/// (`example.com.tr` -> `Example`).
pub fn store_from_hostname(hostname: &str) -> Option<String> {
    let host = hostname.trim_start_matches("www.").to_lowercase();

    if let Some((_, display)) = KNOWN_STORES.iter().find(|(keyword, _)| host.contains(keyword)) {
        return Some((*display).to_string());
    }
    if REDIRECT_HOSTS.iter().any(|r| host.contains(r)) {
        return None;
    }

    let parts: Vec<&str> = host.split('.').collect();
    let label = match parts.as_slice() {
        [] | [""] => return None,
        [only] => *only,
        [.., second_last, last] => {
            if matches!(*last, "com" | "net" | "org" | "tr") {
                // Walk left past stacked public suffixes: example.com.tr.
                if matches!(*second_last, "com" | "net" | "org") && parts.len() >= 3 {
                    parts[parts.len() - 3]
                } else {
                    second_last
                }
            } else {
                parts[0]
            }
        }
    };

    if label.is_empty() {
        return None;
    }
    Some(capitalize(label))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
