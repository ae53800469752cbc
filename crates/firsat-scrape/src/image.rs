// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered image extraction strategies.
//!
//! Mirrors the price chain: structured data first, then social-card meta
//! tags, then storefront data attributes, then progressively looser DOM
//! heuristics. Every candidate is resolved to an absolute URL against the
//! page origin; `blob:` and `data:` references are unusable outside the
//! page and are discarded wherever they surface.

use std::sync::LazyLock;

use scraper::Selector;
use tracing::debug;
use url::Url;

use crate::context::PageContext;
use crate::jsonld;

/// Substrings that mark an `<img>` as chrome rather than product imagery.
const NON_PRODUCT_HINTS: [&str; 4] = ["icon", "logo", "placeholder", "avatar"];

/// One independent image extraction strategy.
pub trait ImageStrategy {
    fn name(&self) -> &'static str;
    fn try_extract(&self, page: &PageContext<'_>) -> Option<String>;
}

/// The default chain, in trust order.
pub fn default_image_chain() -> Vec<Box<dyn ImageStrategy>> {
    vec![
        Box::new(JsonLdImage),
        Box::new(OpenGraphImage),
        Box::new(TwitterCardImage),
        Box::new(DataAttributeImage),
        Box::new(ItempropImage),
        Box::new(ProductClassImage),
        Box::new(FirstPlausibleImage),
    ]
}

/// Walks the chain and returns the first absolute, non-blob URL.
pub fn extract_image(page: &PageContext<'_>) -> Option<String> {
    for strategy in default_image_chain() {
        if let Some(url) = strategy.try_extract(page) {
            debug!(strategy = strategy.name(), url = %url, "image extracted");
            return Some(url);
        }
    }
    None
}

/// Resolves a candidate to an absolute URL against the page base.
///
/// `blob:`/`data:` candidates resolve to `None`: they reference in-page
/// state that cannot be persisted.
pub(crate) fn resolve_candidate(candidate: &str, base: &Url) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty()
        || candidate.starts_with("blob:")
        || candidate.starts_with("data:")
    {
        return None;
    }
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Some(candidate.to_string());
    }
    base.join(candidate).ok().map(|u| u.to_string())
}

struct JsonLdImage;

impl ImageStrategy for JsonLdImage {
    fn name(&self) -> &'static str {
        "jsonld"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        let candidate = page.jsonld.iter().find_map(jsonld::find_image)?;
        resolve_candidate(&candidate, page.base)
    }
}

struct OpenGraphImage;

static OG_IMAGE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"meta[property="og:image"]"#,
        r#"meta[name="og:image"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

impl ImageStrategy for OpenGraphImage {
    fn name(&self) -> &'static str {
        "og-image"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        meta_content(page, &OG_IMAGE_SELECTORS)
    }
}

struct TwitterCardImage;

static TWITTER_IMAGE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"meta[name="twitter:image"]"#,
        r#"meta[property="twitter:image"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

impl ImageStrategy for TwitterCardImage {
    fn name(&self) -> &'static str {
        "twitter-card"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        meta_content(page, &TWITTER_IMAGE_SELECTORS)
    }
}

fn meta_content(page: &PageContext<'_>, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        if let Some(element) = page.document.select(selector).next()
            && let Some(content) = element.value().attr("content")
            && let Some(url) = resolve_candidate(content, page.base)
        {
            return Some(url);
        }
    }
    None
}

/// Storefront data attributes (`data-image` and lazy-load variants).
struct DataAttributeImage;

static DATA_IMAGE_SELECTORS: LazyLock<Vec<(Selector, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Selector::parse("[data-image]").expect("valid selector"),
            "data-image",
        ),
        (
            Selector::parse("[data-original-src]").expect("valid selector"),
            "data-original-src",
        ),
    ]
});

impl ImageStrategy for DataAttributeImage {
    fn name(&self) -> &'static str {
        "data-attr"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        for (selector, attr) in DATA_IMAGE_SELECTORS.iter() {
            if let Some(element) = page.document.select(selector).next()
                && let Some(value) = element.value().attr(attr)
                && let Some(url) = resolve_candidate(value, page.base)
            {
                return Some(url);
            }
        }
        None
    }
}

/// Microdata `itemprop="image"`: content attribute or src.
struct ItempropImage;

static ITEMPROP_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="image"]"#).expect("valid selector"));

impl ImageStrategy for ItempropImage {
    fn name(&self) -> &'static str {
        "itemprop"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        let element = page.document.select(&ITEMPROP_IMAGE).next()?;
        let candidate = element
            .value()
            .attr("content")
            .or_else(|| element.value().attr("src"))?;
        resolve_candidate(candidate, page.base)
    }
}

/// Images whose class names mark them as product imagery.
struct ProductClassImage;

static ALL_IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

const PRODUCT_CLASS_HINTS: [&str; 3] = ["product", "main", "primary"];

impl ImageStrategy for ProductClassImage {
    fn name(&self) -> &'static str {
        "product-class"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        for element in page.document.select(&ALL_IMAGES) {
            let classes = element.value().attr("class").unwrap_or_default().to_lowercase();
            if !PRODUCT_CLASS_HINTS.iter().any(|hint| classes.contains(hint)) {
                continue;
            }
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            if NON_PRODUCT_HINTS.iter().any(|hint| src.contains(hint)) {
                continue;
            }
            if let Some(url) = resolve_candidate(src, page.base) {
                return Some(url);
            }
        }
        None
    }
}

/// Absolute last resort: the first `<img>` that plausibly shows a product.
struct FirstPlausibleImage;

impl ImageStrategy for FirstPlausibleImage {
    fn name(&self) -> &'static str {
        "first-img"
    }

    fn try_extract(&self, page: &PageContext<'_>) -> Option<String> {
        for element in page.document.select(&ALL_IMAGES) {
            let candidate = element
                .value()
                .attr("src")
                .or_else(|| element.value().attr("data-src"))
                .or_else(|| element.value().attr("data-lazy-src"));
            let Some(src) = candidate else { continue };
            if NON_PRODUCT_HINTS.iter().any(|hint| src.contains(hint)) {
                continue;
            }
            if !(src.starts_with("http") || src.starts_with('/')) {
                continue;
            }
            if let Some(url) = resolve_candidate(src, page.base) {
                return Some(url);
            }
        }
        None
    }
}
