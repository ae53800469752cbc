// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded HTML fetching and structured-data extraction.
//!
//! The fetcher pulls a size-capped snippet of a merchant page; the
//! extractor chains pull price and image candidates out of it through
//! ordered, independent strategies (JSON-LD first, raw-HTML regex last).
//! Absence of data is a normal outcome at every level, never an error.

pub mod context;
pub mod fetch;
pub mod image;
pub mod jsonld;
pub mod price;
pub mod sites;

pub use context::PageContext;
pub use fetch::{FetchedPage, HtmlFetcher};
pub use image::{ImageStrategy, extract_image};
pub use price::{PriceQuote, PriceStrategy, extract_price};

use scraper::Html;
use url::Url;

/// Everything the extractor chains recovered from one fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub image: Option<String>,
}

/// Runs both extractor chains over a fetched page.
///
/// Parsing is synchronous and self-contained; the DOM never crosses an
/// await point. An unparseable base URL yields empty data, since relative
/// candidates could not be resolved anyway.
pub fn analyze_page(html: &str, base_url: &str) -> PageData {
    let Ok(base) = Url::parse(base_url) else {
        return PageData::default();
    };
    let document = Html::parse_document(html);
    let jsonld = jsonld::jsonld_documents(&document);

    let page = PageContext {
        document: &document,
        raw_html: html,
        base: &base,
        jsonld: &jsonld,
    };

    let quote = price::extract_price(&page);
    PageData {
        price: quote.as_ref().map(|q| q.price),
        original_price: quote.and_then(|q| q.original_price),
        image: image::extract_image(&page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.com/urun/123";

    #[test]
    fn jsonld_price_beats_meta_and_classes() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"offers":{"price":"1.299,00"}}</script>
            <meta property="product:price:amount" content="1500">
            </head><body><span class="price">1.700,00 TL</span></body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(data.price, Some(1299.0));
    }

    #[test]
    fn meta_price_used_when_no_jsonld() {
        let html = r#"<html><head>
            <meta property="product:price:amount" content="849,90">
            </head><body><span class="price">999 TL</span></body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(data.price, Some(849.90));
    }

    #[test]
    fn data_attribute_price_is_found() {
        let html = r#"<html><body><div data-price="459,50"></div></body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(data.price, Some(459.50));
    }

    #[test]
    fn generic_class_skips_old_price_markers() {
        let html = r#"<html><body>
            <span class="price-old">2.000,00 TL</span>
            <span class="current-price">1.450,00 TL</span>
            </body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(data.price, Some(1450.0));
    }

    #[test]
    fn raw_regex_is_the_last_resort() {
        let html = "<html><body><p>Sadece 1.234,56 TL yerine ₺999,90!</p></body></html>";
        let data = analyze_page(html, BASE);
        // No structured data anywhere; the currency-prefixed scan fires.
        assert_eq!(data.price, Some(999.90));
    }

    #[test]
    fn implausible_prices_are_rejected() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"offers":{"price":5000000}}</script>
            </head></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(data.price, None);
    }

    #[test]
    fn og_image_beats_plain_img_tags() {
        let html = r#"<html><head>
            <meta property="og:image" content="/img/product.jpg">
            </head><body><img src="https://cdn.example.com/banner.jpg"></body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(
            data.image.as_deref(),
            Some("https://www.example.com/img/product.jpg")
        );
    }

    #[test]
    fn blob_image_candidates_are_discarded() {
        let html = r#"<html><head>
            <meta property="og:image" content="blob:https://www.example.com/abc-def">
            </head><body><img class="product-image" src="/real.jpg"></body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(
            data.image.as_deref(),
            Some("https://www.example.com/real.jpg")
        );
    }

    #[test]
    fn icon_and_logo_images_are_skipped() {
        let html = r#"<html><body>
            <img src="/assets/logo.png">
            <img src="/assets/cart-icon.svg">
            <img src="/media/urun-buyuk.jpg">
            </body></html>"#;
        let data = analyze_page(html, BASE);
        assert_eq!(
            data.image.as_deref(),
            Some("https://www.example.com/media/urun-buyuk.jpg")
        );
    }

    #[test]
    fn trendyol_script_json_price_is_found() {
        let html = r#"<html><body>
            <script>window.__STATE__={"product":{"salePrice":1599.5}}</script>
            </body></html>"#;
        let data = analyze_page(html, "https://www.trendyol.com/abc-p-123");
        assert_eq!(data.price, Some(1599.5));
    }

    #[test]
    fn amazon_price_to_pay_takes_minimum_and_basis_maximum() {
        let html = r#"<html><body>
            <span class="priceToPay"><span class="a-offscreen">1.859,12 TL</span></span>
            <span class="priceToPay"><span class="a-offscreen">1.999,00 TL</span></span>
            <span class="basisPrice"><span class="a-offscreen">2.499,00 TL</span></span>
            </body></html>"#;
        let data = analyze_page(html, "https://www.amazon.com.tr/dp/B0TEST");
        assert_eq!(data.price, Some(1859.12));
        assert_eq!(data.original_price, Some(2499.0));
    }

    #[test]
    fn empty_page_yields_empty_data() {
        let data = analyze_page("<html></html>", BASE);
        assert_eq!(data, PageData::default());
    }

    #[test]
    fn invalid_base_url_yields_empty_data() {
        let data = analyze_page("<html></html>", "not a url");
        assert_eq!(data, PageData::default());
    }
}
