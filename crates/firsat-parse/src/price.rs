// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locale-aware price string parsing.
//!
//! Turkish merchant pages and channel posts mix two numeric conventions:
//! `1.234,56` (dot thousands, comma decimal) and `1,234.56` (the Western
//! inverse). The separator roles are disambiguated from the fragment after
//! the last separator, matching how the amounts are written in practice.

use std::sync::LazyLock;

use regex::Regex;

/// Upper plausibility bound; anything above is misparsed garbage
/// (phone numbers, SKUs, timestamps).
const MAX_PLAUSIBLE_PRICE: f64 = 10_000_000.0;

static CURRENCY_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:₺|TL|lira|TRY|USD|EUR|\$|€|'ye|'a)").unwrap());

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Parses a raw price string into a decimal amount.
///
/// Returns `None` for non-numeric input, percentages (discount rates, not
/// prices), and amounts outside `(0, 10_000_000]`.
///
/// Separator rules:
/// - both `.` and `,` present: ≤2 digits after the last `,` means Turkish
///   convention (`,` decimal, `.` thousands); otherwise `,` is a thousands
///   separator and `.` the decimal point.
/// - only `,`: ≤2 trailing digits means decimal separator, otherwise
///   thousands.
/// - only `.` or neither: `.` is a thousands separator and is stripped.
pub fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // "%57" is a discount rate, never a price.
    if raw.contains('%') {
        return None;
    }

    // Unit prices and the like arrive parenthesized next to the real amount.
    let cleaned = PARENTHESIZED.replace_all(raw, "");
    let cleaned = CURRENCY_TOKENS.replace_all(&cleaned, "");
    let cleaned: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = normalize_separators(&cleaned);
    let price: f64 = normalized.parse().ok()?;

    if price <= 0.0 || price > MAX_PLAUSIBLE_PRICE {
        return None;
    }
    Some(price)
}

/// Rewrites locale separators into a plain `f64`-parseable form.
fn normalize_separators(s: &str) -> String {
    let has_comma = s.contains(',');
    let has_dot = s.contains('.');

    if has_comma && has_dot {
        if decimal_fragment(s, ',') {
            // Turkish: 1.859,12 -> 1859.12
            s.replace('.', "").replace(',', ".")
        } else {
            // Western: 1,234.56 -> 1234.56
            s.replace(',', "")
        }
    } else if has_comma {
        if decimal_fragment(s, ',') {
            s.replace(',', ".")
        } else {
            s.replace(',', "")
        }
    } else {
        // Dots alone are thousands separators: 1.859 -> 1859.
        s.replace('.', "")
    }
}

/// True when the fragment after the last `sep` reads as a decimal part:
/// one or two digits, nothing else.
fn decimal_fragment(s: &str, sep: char) -> bool {
    match s.rsplit_once(sep) {
        Some((_, frag)) => {
            !frag.is_empty() && frag.len() <= 2 && frag.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
