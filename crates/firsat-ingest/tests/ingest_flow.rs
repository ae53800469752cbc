// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end ingestion tests against in-memory collaborators and a local
//! mock merchant server.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firsat_config::model::{HttpConfig, IngestConfig};
use firsat_core::types::{ChannelEntity, ChannelMessage};
use firsat_ingest::{ChannelIngestor, ImageResolver};
use firsat_scrape::HtmlFetcher;
use firsat_test_utils::{MemoryAssets, MemoryStore, ScriptedChannel};

const PRODUCT_PAGE: &str = r#"<html><head>
    <script type="application/ld+json">{"@type":"Product","offers":{"price":"1.299,00"}}</script>
    <meta property="og:image" content="/images/urun.jpg">
    </head><body><h1>Ürün</h1></body></html>"#;

fn entity(id: i64) -> ChannelEntity {
    ChannelEntity {
        id,
        title: Some("Fırsat Kanalı".into()),
        is_broadcast: true,
    }
}

fn message(id: i64, text: &str) -> ChannelMessage {
    ChannelMessage {
        id,
        text: text.into(),
        entities: Vec::new(),
        has_media: false,
        button_urls: Vec::new(),
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    channel: Arc<ScriptedChannel>,
    assets: Arc<MemoryAssets>,
    ingestor: ChannelIngestor,
}

fn harness(channels: Vec<String>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let channel = Arc::new(ScriptedChannel::new());
    let assets = Arc::new(MemoryAssets::new());

    let http_config = HttpConfig {
        timeout_secs: 5,
        max_retries: 0,
        max_html_bytes: 200_000,
    };
    let ingest_config = IngestConfig {
        channels,
        fetch_limit: 5,
        max_enrichment_secs: 30,
        log_level: "info".into(),
    };

    let fetcher = HtmlFetcher::new(&http_config).unwrap();
    let images = ImageResolver::new(channel.clone(), assets.clone(), "telegram", 0);
    let ingestor = ChannelIngestor::new(
        store.clone(),
        channel.clone(),
        fetcher,
        images,
        ingest_config,
        http_config,
    );

    Harness {
        store,
        channel,
        assets,
        ingestor,
    }
}

#[tokio::test]
async fn ingestion_creates_unapproved_enriched_deals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/urun/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@firsatkanali".into()]);
    let link = format!("{}/urun/1", server.uri());
    h.channel.add_channel(
        "firsatkanali",
        entity(100),
        vec![message(1, &format!("RTX 4090 Süper Fiyat\n45.999 TL\n{link}"))],
    );

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(summary.created.len(), 1);

    let deals = h.store.deals();
    let deal = &deals[0].deal;
    assert_eq!(deal.title, "RTX 4090 Süper Fiyat");
    assert!(!deal.is_approved);
    // The link-derived price overrides the message-parsed 45.999 TL.
    assert_eq!(deal.price, 1299.0);
    assert_eq!(deal.category, "bilgisayar");
    assert_eq!(deal.chat_username, "firsatkanali");
    assert_eq!(deal.message_id, 1);
    // The og:image resolved against the mock server origin.
    let image = deal.image_url.as_deref().unwrap();
    assert!(image.ends_with("/images/urun.jpg"));
}

#[tokio::test]
async fn second_pass_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@firsatkanali".into()]);
    let link = format!("{}/urun/2", server.uri());
    h.channel.add_channel(
        "firsatkanali",
        entity(100),
        vec![
            message(1, &format!("Klavye fırsatı\n{link}")),
            message(2, &format!("Mouse fırsatı\n{link}")),
        ],
    );

    let first = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(first.created.len(), 2);

    let second = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(second.created.len(), 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(h.store.deal_count(), 2);
}

#[tokio::test]
async fn messages_without_links_are_skipped() {
    let h = harness(vec!["@firsatkanali".into()]);
    h.channel.add_channel(
        "firsatkanali",
        entity(100),
        vec![message(1, "Sadece duyuru, link yok")],
    );

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert!(summary.created.is_empty());
    assert_eq!(summary.skipped, 1);
    assert_eq!(h.store.deal_count(), 0);
}

#[tokio::test]
async fn channel_resolution_failure_aborts_only_that_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@bozukkanal".into(), "@saglamkanal".into()]);
    // Only the second channel is registered; the first fails to resolve.
    let link = format!("{}/urun/3", server.uri());
    h.channel.add_channel(
        "saglamkanal",
        entity(200),
        vec![message(9, &format!("SSD fırsatı\n{link}"))],
    );

    let results = h.ingestor.ingest_all().await;
    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_err(), "unknown channel must error");
    let ok = results[1].1.as_ref().unwrap();
    assert_eq!(ok.created.len(), 1);
}

#[tokio::test]
async fn group_ids_resolve_through_the_supergroup_ladder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["-1234".into()]);
    // The transport only knows the supergroup-prefixed form of the id.
    let link = format!("{}/urun/7", server.uri());
    h.channel.add_channel(
        "-1001234",
        ChannelEntity {
            id: -1001234,
            title: Some("Kapalı Grup".into()),
            is_broadcast: false,
        },
        vec![message(3, &format!("RAM fırsatı\n{link}"))],
    );

    let summary = h.ingestor.ingest_channel("-1234").await.unwrap();
    assert_eq!(summary.created.len(), 1);

    let deal = &h.store.deals()[0].deal;
    // The dedup identity stays the configured identifier, not the
    // transformed one.
    assert_eq!(deal.chat_username, "-1234");
    assert_eq!(deal.chat_type.as_deref(), Some("group"));
}

#[tokio::test]
async fn channel_media_beats_link_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@firsatkanali".into()]);
    let link = format!("{}/urun/4", server.uri());
    let mut msg = message(5, &format!("Tablet fırsatı\n{link}"));
    msg.has_media = true;
    h.channel.add_channel("firsatkanali", entity(100), vec![msg]);

    // A valid JPEG payload above the 1 KB floor.
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    jpeg.resize(4096, 0);
    h.channel.add_media(5, jpeg);

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(summary.created.len(), 1);

    let deal = &h.store.deals()[0].deal;
    let image = deal.image_url.as_deref().unwrap();
    assert!(
        image.starts_with("https://assets.invalid/telegram/firsatkanali/5_"),
        "channel media should win over the page image, got {image}"
    );
    assert_eq!(h.assets.uploads().len(), 1);
}

#[tokio::test]
async fn undersized_media_falls_back_to_link_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@firsatkanali".into()]);
    let link = format!("{}/urun/5", server.uri());
    let mut msg = message(6, &format!("Webcam fırsatı\n{link}"));
    msg.has_media = true;
    h.channel.add_channel("firsatkanali", entity(100), vec![msg]);
    // Below the 1 KB floor: rejected as a thumbnail.
    h.channel.add_media(6, vec![0xFF, 0xD8, 0xFF]);

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(summary.created.len(), 1);

    let deal = &h.store.deals()[0].deal;
    let image = deal.image_url.as_deref().unwrap();
    assert!(image.ends_with("/images/urun.jpg"));
    assert!(h.assets.uploads().is_empty());
}

#[tokio::test]
async fn failing_persistence_skips_only_that_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let h = harness(vec!["@firsatkanali".into()]);
    let link = format!("{}/urun/6", server.uri());
    h.channel.add_channel(
        "firsatkanali",
        entity(100),
        vec![
            message(1, &format!("Zehirli kayıt\n{link}")),
            message(2, &format!("Temiz kayıt\n{link}")),
        ],
    );
    h.store.fail_creates_containing("Zehirli");

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(summary.created.len(), 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(h.store.deals()[0].deal.title, "Temiz kayıt");
}

#[tokio::test]
async fn unreachable_link_still_persists_the_draft() {
    let h = harness(vec!["@firsatkanali".into()]);
    // Connection refused immediately; enrichment degrades to nothing.
    h.channel.add_channel(
        "firsatkanali",
        entity(100),
        vec![message(1, "Monitör 2.499 TL\nhttp://127.0.0.1:1/urun")],
    );

    let summary = h.ingestor.ingest_channel("@firsatkanali").await.unwrap();
    assert_eq!(summary.created.len(), 1);

    let deal = &h.store.deals()[0].deal;
    // The message-parsed price survives when the link yields nothing.
    assert_eq!(deal.price, 2499.0);
    assert_eq!(deal.original_price, 2499.0);
    assert!(deal.image_url.is_none());
}
