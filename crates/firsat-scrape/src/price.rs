// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered price extraction strategies.
//!
//! Each strategy inspects the fetched page independently and returns the
//! first plausible candidate it finds; the chain walks them in trust order
//! and stops at the first hit. A price from structured data always beats a
//! price scraped out of presentation markup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::debug;

use firsat_parse::parse_price;

use crate::context::PageContext;
use crate::jsonld;
use crate::sites;

/// Deal prices above this are implausible and rejected wholesale.
const MAX_DEAL_PRICE: f64 = 1_000_000.0;

/// A price candidate, optionally paired with the pre-discount figure when
/// the page exposes one.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub original_price: Option<f64>,
}

impl PriceQuote {
    fn plain(price: f64) -> Self {
        Self {
            price,
            original_price: None,
        }
    }
}

/// Accepts only prices a deal could plausibly carry.
pub(crate) fn plausible(price: f64) -> bool {
    price > 0.0 && price < MAX_DEAL_PRICE
}

/// One independent extraction strategy.
pub trait PriceStrategy {
    fn name(&self) -> &'static str;
    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote>;
}

/// The default chain, in trust order.
pub fn default_price_chain() -> Vec<Box<dyn PriceStrategy>> {
    vec![
        Box::new(JsonLdPrice),
        Box::new(MetaTagPrice),
        Box::new(DataAttributePrice),
        Box::new(ItempropPrice),
        Box::new(MerchantPrice),
        Box::new(GenericClassPrice),
        Box::new(RawHtmlPrice),
    ]
}

/// Walks the chain and returns the first hit.
pub fn extract_price(page: &PageContext<'_>) -> Option<PriceQuote> {
    for strategy in default_price_chain() {
        if let Some(quote) = strategy.try_extract(page) {
            debug!(strategy = strategy.name(), price = quote.price, "price extracted");
            return Some(quote);
        }
    }
    None
}

/// JSON-LD offer data, the highest-trust source.
struct JsonLdPrice;

impl PriceStrategy for JsonLdPrice {
    fn name(&self) -> &'static str {
        "jsonld"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        page.jsonld
            .iter()
            .find_map(jsonld::find_price)
            .filter(|p| plausible(*p))
            .map(PriceQuote::plain)
    }
}

/// Product meta tags.
struct MetaTagPrice;

static META_PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"meta[property="product:price:amount"]"#,
        r#"meta[property="og:price:amount"]"#,
        r#"meta[name="price"]"#,
        r#"meta[itemprop="price"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

impl PriceStrategy for MetaTagPrice {
    fn name(&self) -> &'static str {
        "meta"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        for selector in META_PRICE_SELECTORS.iter() {
            if let Some(element) = page.document.select(selector).next()
                && let Some(content) = element.value().attr("content")
                && let Some(price) = parse_price(content).filter(|p| plausible(*p))
            {
                return Some(PriceQuote::plain(price));
            }
        }
        None
    }
}

/// `data-price`-style attributes.
struct DataAttributePrice;

static DATA_PRICE_SELECTORS: LazyLock<Vec<(Selector, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Selector::parse("[data-price]").expect("valid selector"),
            "data-price",
        ),
        (
            Selector::parse("[data-product-price]").expect("valid selector"),
            "data-product-price",
        ),
    ]
});

impl PriceStrategy for DataAttributePrice {
    fn name(&self) -> &'static str {
        "data-attr"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        for (selector, attr) in DATA_PRICE_SELECTORS.iter() {
            if let Some(element) = page.document.select(selector).next()
                && let Some(value) = element.value().attr(attr)
                && let Some(price) = parse_price(value).filter(|p| plausible(*p))
            {
                return Some(PriceQuote::plain(price));
            }
        }
        None
    }
}

/// Microdata `itemprop="price"` elements: content attribute first, visible
/// text second.
struct ItempropPrice;

static ITEMPROP_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="price"]"#).expect("valid selector"));

impl PriceStrategy for ItempropPrice {
    fn name(&self) -> &'static str {
        "itemprop"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        let element = page.document.select(&ITEMPROP_PRICE).next()?;
        let candidate = element
            .value()
            .attr("content")
            .map(str::to_string)
            .unwrap_or_else(|| element.text().collect::<String>());
        parse_price(&candidate)
            .filter(|p| plausible(*p))
            .map(PriceQuote::plain)
    }
}

/// Merchant-specific selector lists, dispatched on the page hostname.
struct MerchantPrice;

impl PriceStrategy for MerchantPrice {
    fn name(&self) -> &'static str {
        "merchant"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        let host = page.base.host_str()?.to_lowercase();
        sites::merchant_price(&host, page)
    }
}

/// Generic price-looking CSS classes, excluding struck-through and
/// pre-discount figures.
struct GenericClassPrice;

static CLASSED_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").expect("valid selector"));

const PRICE_CLASS_HINTS: [&str; 2] = ["price", "fiyat"];
const EXCLUDED_CLASS_HINTS: [&str; 5] = ["old", "discount", "original", "eski", "orijinal"];

impl PriceStrategy for GenericClassPrice {
    fn name(&self) -> &'static str {
        "generic-class"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        for element in page.document.select(&CLASSED_ELEMENTS) {
            let classes = element.value().attr("class").unwrap_or_default().to_lowercase();
            if !PRICE_CLASS_HINTS.iter().any(|hint| classes.contains(hint)) {
                continue;
            }
            if EXCLUDED_CLASS_HINTS.iter().any(|hint| classes.contains(hint)) {
                continue;
            }
            let text: String = element.text().collect();
            if let Some(price) = parse_price(&text).filter(|p| plausible(*p)) {
                return Some(PriceQuote::plain(price));
            }
        }
        None
    }
}

/// Last resort: scan the raw HTML for a currency-adjacent number.
struct RawHtmlPrice;

static RAW_PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₺|TL|lira)[\s:]*(\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{2})?)").unwrap()
});

impl PriceStrategy for RawHtmlPrice {
    fn name(&self) -> &'static str {
        "raw-regex"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<PriceQuote> {
        let captures = RAW_PRICE_PATTERN.captures(page.raw_html)?;
        parse_price(captures.get(1)?.as_str())
            .filter(|p| plausible(*p))
            .map(PriceQuote::plain)
    }
}
