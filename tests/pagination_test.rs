mod common;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::tempdir;

use common::*;
use tempocli::Error;
use tempocli::spotify::{
    pagination::fetch_all,
    tracks::{Target, list_tracks},
};

#[derive(Debug, Deserialize)]
struct Item {
    n: u32,
}

fn page_url(index: usize) -> String {
    format!("{API_URL}/items?page={index}")
}

/// Scripts `sizes.len()` pages holding consecutive numbers.
fn script_pages(transport: &FakeTransport, sizes: &[usize]) -> u32 {
    let mut n = 0;
    for (index, size) in sizes.iter().enumerate() {
        let items: Vec<Value> = (0..*size)
            .map(|_| {
                n += 1;
                json!({"n": n})
            })
            .collect();
        let next = (index + 1 < sizes.len()).then(|| page_url(index + 1));
        transport.on(&page_url(index), page(items, next.as_deref()));
    }
    n
}

#[tokio::test]
async fn test_fetch_all_returns_every_item_in_order() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let transport = FakeTransport::new();
    let total = script_pages(&transport, &[3, 1, 0, 4]);
    let mut executor = executor(&config, &transport);

    let collected = fetch_all::<Item>(&mut executor, &page_url(0), None)
        .await
        .unwrap();

    let numbers: Vec<u32> = collected.items.iter().map(|i| i.n).collect();
    assert_eq!(numbers, (1..=total).collect::<Vec<_>>());
    assert_eq!(collected.pages, 4);
    assert!(!collected.is_partial());
}

#[tokio::test]
async fn test_fetch_all_stops_at_page_reaching_cap() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let transport = FakeTransport::new();
    script_pages(&transport, &[3, 3, 3]);
    let mut executor = executor(&config, &transport);

    let collected = fetch_all::<Item>(&mut executor, &page_url(0), Some(4))
        .await
        .unwrap();

    assert_eq!(collected.items.len(), 6);
    assert_eq!(transport.requests_to(&page_url(0)), 1);
    assert_eq!(transport.requests_to(&page_url(1)), 1);
    assert_eq!(transport.requests_to(&page_url(2)), 0);
}

#[tokio::test]
async fn test_fetch_all_cap_on_page_boundary() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let transport = FakeTransport::new();
    script_pages(&transport, &[2, 2]);
    let mut executor = executor(&config, &transport);

    let collected = fetch_all::<Item>(&mut executor, &page_url(0), Some(2))
        .await
        .unwrap();

    assert_eq!(collected.items.len(), 2);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_error_payload_returns_partial_items() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let transport = FakeTransport::new();
    transport
        .on(
            &page_url(0),
            page(vec![json!({"n": 1}), json!({"n": 2})], Some(&page_url(1))),
        )
        .on(
            &page_url(1),
            status(
                StatusCode::NOT_FOUND,
                json!({"error": {"status": 404, "message": "Resource not found"}}),
            ),
        );
    let mut executor = executor(&config, &transport);

    let collected = fetch_all::<Item>(&mut executor, &page_url(0), None)
        .await
        .unwrap();

    assert_eq!(collected.items.len(), 2);
    match collected.partial {
        Some(Error::PartialFetch(reason)) => assert_eq!(reason, "Resource not found"),
        other => panic!("expected PartialFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_page_returns_partial_items() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let transport = FakeTransport::new();
    transport.on(
        &page_url(0),
        tempocli::spotify::transport::ApiResponse::new(StatusCode::BAD_GATEWAY, "<html>"),
    );
    let mut executor = executor(&config, &transport);

    let collected = fetch_all::<Item>(&mut executor, &page_url(0), None)
        .await
        .unwrap();

    assert!(collected.items.is_empty());
    let reason = collected.partial.unwrap();
    assert!(!reason.is_fatal());
    assert!(reason.to_string().contains("502"));
}

#[tokio::test]
async fn test_list_tracks_skips_local_and_removed_entries() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    seed_access_token(&config, "token").await;

    let target = Target::Library;
    let transport = FakeTransport::new();
    transport.on(
        &target.listing_url(API_URL),
        page(
            vec![
                track_item("t1", "One", &["A", "B"]),
                json!({"track": null}),
                json!({"track": {"id": null, "name": "local.mp3", "artists": []}}),
                track_item("t2", "Two", &["C"]),
            ],
            None,
        ),
    );
    let mut executor = executor(&config, &transport);

    let listing = list_tracks(&mut executor, API_URL, &target, None)
        .await
        .unwrap();

    let ids: Vec<&str> = listing.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
    assert_eq!(listing.items[0].artists, vec!["A", "B"]);
}
