// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merchant-specific price extraction.
//!
//! The big Turkish storefronts each need their own selector list; the
//! single-page-app ones additionally bury the live price in inline script
//! JSON long before the DOM shows it. Selector lists are data, matched in
//! order, first plausible hit wins.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::debug;

use firsat_parse::parse_price;

use crate::context::PageContext;
use crate::price::{PriceQuote, plausible};

/// Amazon renders price fragments (`.a-price-whole`) that parse as tiny
/// numbers; anything under this is selector junk, not a deal price.
const AMAZON_MIN_PRICE: f64 = 20.0;

/// Dispatches to the merchant matching the page hostname.
pub fn merchant_price(host: &str, page: &PageContext<'_>) -> Option<PriceQuote> {
    if host.contains("trendyol") {
        trendyol_price(page)
    } else if host.contains("hepsiburada") {
        hepsiburada_price(page)
    } else if host.contains("n11") {
        n11_price(page)
    } else if host.contains("amazon") {
        amazon_price(page)
    } else {
        None
    }
}

// --- Trendyol ---

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

/// Price keys inside Trendyol's inline state JSON, in preference order.
static TRENDYOL_SCRIPT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""salePrice"\s*:\s*(\d+(?:\.\d+)?)"#,
        r#""price"\s*:\s*(\d+(?:\.\d+)?)"#,
        r#""discountedPrice"\s*:\s*(\d+(?:\.\d+)?)"#,
        r#""currentPrice"\s*:\s*(\d+(?:\.\d+)?)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TRENDYOL_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".prc-dsc",
        ".pr-new-br",
        ".prc-box-dscntd",
        "[data-price]",
        ".product-price-container .prc-dsc",
        ".pr-bx-w .prc-dsc",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

fn trendyol_price(page: &PageContext<'_>) -> Option<PriceQuote> {
    // The SPA ships its state as script JSON; that is fresher than the DOM.
    for script in page.document.select(&SCRIPT) {
        let content: String = script.text().collect();
        for pattern in TRENDYOL_SCRIPT_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(&content)
                && let Some(price) = captures
                    .get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .filter(|p| plausible(*p))
            {
                debug!(price, "trendyol script JSON price");
                return Some(PriceQuote {
                    price,
                    original_price: None,
                });
            }
        }
    }

    selector_price(page, &TRENDYOL_SELECTORS, &["data-price", "data-sale-price"])
}

// --- Hepsiburada ---

static HEPSIBURADA_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".price-value",
        r#"[data-bind*="price"]"#,
        ".product-price .price-value",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

fn hepsiburada_price(page: &PageContext<'_>) -> Option<PriceQuote> {
    selector_price(page, &HEPSIBURADA_SELECTORS, &["data-price"])
}

// --- N11 ---

static N11_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [".newPrice", ".priceContainer .newPrice"]
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

fn n11_price(page: &PageContext<'_>) -> Option<PriceQuote> {
    selector_price(page, &N11_SELECTORS, &[])
}

// --- Amazon ---

static PRICE_TO_PAY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".priceToPay").expect("valid selector"));

static BASIS_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".basisPrice").expect("valid selector"));

static OFFSCREEN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-offscreen").expect("valid selector"));

static AMAZON_PRICE_FALLBACKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "#corePriceDisplay_desktop_feature_div .a-price.priceToPay .a-offscreen",
        "#apex_desktop .a-price.priceToPay .a-offscreen",
        "#corePrice_feature_div .a-price.priceToPay .a-offscreen",
        "#corePriceDisplay_desktop_feature_div .a-price-whole",
        "#apex_desktop .a-price-whole",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

static AMAZON_ORIGINAL_FALLBACKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "span.a-price.a-text-price span.a-offscreen",
        ".a-text-strike",
        r#"span[data-a-strike="true"] span.a-offscreen"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

/// Amazon exposes the discounted figure under `.priceToPay` and the list
/// price under `.basisPrice`. Several copies of each render per page, so
/// the discounted price is the minimum over the hits and the list price
/// the maximum that still exceeds it.
fn amazon_price(page: &PageContext<'_>) -> Option<PriceQuote> {
    let mut discounted: Vec<f64> = Vec::new();
    for element in page.document.select(&PRICE_TO_PAY) {
        // Prefer the hidden full-precision text over the visible fragments.
        let text = match element.select(&OFFSCREEN).next() {
            Some(hidden) => hidden.text().collect::<String>(),
            None => element.text().collect::<String>(),
        };
        if let Some(price) = parse_price(&text).filter(|p| plausible(*p) && *p >= AMAZON_MIN_PRICE)
        {
            discounted.push(price);
        }
    }

    let mut price = discounted.iter().copied().fold(f64::INFINITY, f64::min);
    if !price.is_finite() {
        price = AMAZON_PRICE_FALLBACKS.iter().find_map(|selector| {
            let element = page.document.select(selector).next()?;
            let text: String = element.text().collect();
            parse_price(&text).filter(|p| plausible(*p) && *p >= AMAZON_MIN_PRICE)
        })?;
    }

    let mut originals: Vec<f64> = Vec::new();
    for element in page.document.select(&BASIS_PRICE) {
        let text = match element.select(&OFFSCREEN).next() {
            Some(hidden) => hidden.text().collect::<String>(),
            None => element.text().collect::<String>(),
        };
        if let Some(original) = parse_price(&text).filter(|p| *p > price && *p >= AMAZON_MIN_PRICE)
        {
            originals.push(original);
        }
    }

    let original_price = originals
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let original_price = if original_price.is_finite() {
        Some(original_price)
    } else {
        AMAZON_ORIGINAL_FALLBACKS.iter().find_map(|selector| {
            let element = page.document.select(selector).next()?;
            let text: String = element.text().collect();
            parse_price(&text).filter(|p| *p > price && *p >= AMAZON_MIN_PRICE)
        })
    };

    Some(PriceQuote {
        price,
        original_price,
    })
}

/// Walks a selector list, reading visible text first and the listed
/// attributes second.
fn selector_price(
    page: &PageContext<'_>,
    selectors: &[Selector],
    attrs: &[&str],
) -> Option<PriceQuote> {
    for selector in selectors {
        let Some(element) = page.document.select(selector).next() else {
            continue;
        };
        let text: String = element.text().collect();
        let candidate = if text.trim().is_empty() {
            attrs
                .iter()
                .find_map(|attr| element.value().attr(attr))
                .unwrap_or_default()
                .to_string()
        } else {
            text
        };
        if let Some(price) = parse_price(&candidate).filter(|p| plausible(*p)) {
            return Some(PriceQuote {
                price,
                original_price: None,
            });
        }
    }
    None
}
