// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-LD structured-data search.
//!
//! Merchant pages embed `application/ld+json` blocks describing the
//! product offer. These are the highest-trust source for both price and
//! image facts, so both extractor chains try them first. The search is
//! recursive: real-world JSON-LD nests offers inside graphs, arrays, and
//! vendor-specific wrappers.

use scraper::{Html, Selector};
use serde_json::Value;

use firsat_parse::parse_price;

/// Collects the parsed JSON-LD documents of a page.
pub fn jsonld_documents(document: &Html) -> Vec<Value> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("valid selector");
    document
        .select(&selector)
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            serde_json::from_str::<Value>(raw.trim()).ok()
        })
        .collect()
}

/// Recursively searches a JSON-LD value for an offer price.
///
/// Key priority within an object: `price`, then `offers` (recursed),
/// then `lowPrice`, then `highPrice`; other keys are recursed as a last
/// resort so wrapped `@graph` structures still resolve.
pub fn find_price(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => {
            if let Some(price) = map.get("price").and_then(price_of) {
                return Some(price);
            }
            if let Some(offers) = map.get("offers")
                && let Some(price) = find_price(offers)
            {
                return Some(price);
            }
            for key in ["lowPrice", "highPrice"] {
                if let Some(price) = map.get(key).and_then(price_of) {
                    return Some(price);
                }
            }
            map.values().find_map(find_price)
        }
        Value::Array(items) => items.iter().find_map(find_price),
        _ => None,
    }
}

/// Recursively searches a JSON-LD value for a product image URL.
pub fn find_image(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(image) = map.get("image")
                && let Some(url) = image_of(image)
            {
                return Some(url);
            }
            map.values().find_map(find_image)
        }
        Value::Array(items) => items.iter().find_map(find_image),
        _ => None,
    }
}

/// Interprets a price-bearing JSON value (string or number).
fn price_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_price(s),
        Value::Number(n) => {
            let price = n.as_f64()?;
            if price > 0.0 { Some(price) } else { None }
        }
        _ => None,
    }
}

/// Interprets an image-bearing JSON value: a plain URL string, the first
/// element of an array, or an `ImageObject` with a `url` field.
fn image_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(image_of),
        Value::Object(map) => map.get("url").and_then(image_of),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(jsonld: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{jsonld}</script></head></html>"#
        ))
    }

    #[test]
    fn offer_price_is_found() {
        let html = page(r#"{"@type":"Product","offers":{"price":"1.859,12"}}"#);
        let docs = jsonld_documents(&html);
        assert_eq!(docs.iter().find_map(find_price), Some(1859.12));
    }

    #[test]
    fn low_price_is_found_when_no_price() {
        let html = page(r#"{"offers":{"lowPrice":449,"highPrice":599}}"#);
        let docs = jsonld_documents(&html);
        assert_eq!(docs.iter().find_map(find_price), Some(449.0));
    }

    #[test]
    fn nested_graph_structures_resolve() {
        let html = page(
            r#"{"@graph":[{"@type":"BreadcrumbList"},{"@type":"Product","offers":{"price":299.9}}]}"#,
        );
        let docs = jsonld_documents(&html);
        assert_eq!(docs.iter().find_map(find_price), Some(299.9));
    }

    #[test]
    fn image_string_and_object_forms_resolve() {
        let html = page(r#"{"image":"https://cdn.example.com/a.jpg"}"#);
        let docs = jsonld_documents(&html);
        assert_eq!(
            docs.iter().find_map(find_image).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );

        let html = page(r#"{"image":{"@type":"ImageObject","url":"https://cdn.example.com/b.jpg"}}"#);
        let docs = jsonld_documents(&html);
        assert_eq!(
            docs.iter().find_map(find_image).as_deref(),
            Some("https://cdn.example.com/b.jpg")
        );
    }

    #[test]
    fn malformed_jsonld_is_skipped() {
        let html = page(r#"{"offers": nonsense"#);
        assert!(jsonld_documents(&html).is_empty());
    }

    #[test]
    fn zero_price_is_not_a_hit() {
        let html = page(r#"{"offers":{"price":0}}"#);
        let docs = jsonld_documents(&html);
        assert_eq!(docs.iter().find_map(find_price), None);
    }
}
