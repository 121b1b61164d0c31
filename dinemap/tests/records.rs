mod common;

use bson::{Bson, Uuid, doc};
use common::{attrs, attrs_at, directory};
use dinemap::prelude::*;

#[tokio::test]
async fn create_assigns_identity_and_defaults() {
    let directory = directory();

    let created = directory.create(attrs("mingles")).await.unwrap();

    assert_eq!(created.bookmark_count, 0);
    assert_eq!(created.name, "mingles");

    let position = created.position.expect("position derived at create");
    assert_eq!(position.longitude(), 126.9780);
    assert_eq!(position.latitude(), 37.5665);
}

#[tokio::test]
async fn find_by_name_returns_snapshot_or_none() {
    let directory = directory();
    let created = directory.create(attrs("mingles")).await.unwrap();

    let found = directory.find_by_name("mingles").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found, created);

    assert!(directory.find_by_name("nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_id_round_trips() {
    let directory = directory();
    let created = directory.create(attrs("mingles")).await.unwrap();

    let found = directory.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found, created);

    assert!(directory.find_by_id(Uuid::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn country_lookups_filter_exactly() {
    let directory = directory();
    directory.create(attrs_at("a", "KR", "Korean", 127.0, 37.5)).await.unwrap();
    directory.create(attrs_at("b", "KR", "Korean", 127.1, 37.6)).await.unwrap();
    directory.create(attrs_at("c", "JP", "Japanese", 139.7, 35.7)).await.unwrap();

    let korean = directory.find_all_by_country("KR").await.unwrap();
    assert_eq!(korean.len(), 2);
    assert!(korean.iter().all(|r| r.country == "KR"));

    assert_eq!(directory.count_by_country("KR").await.unwrap(), 2);
    assert_eq!(directory.count_by_country("JP").await.unwrap(), 1);
    assert_eq!(directory.count_by_country("FR").await.unwrap(), 0);

    // Country matching is exact, not a pattern.
    assert!(directory.find_all_by_country("kr").await.unwrap().is_empty());
}

#[tokio::test]
async fn find_all_returns_every_record() {
    let directory = directory();
    for name in ["a", "b", "c"] {
        directory.create(attrs(name)).await.unwrap();
    }

    assert_eq!(directory.find_all().await.unwrap().len(), 3);
}

/// Seeds a stored document that predates the bookmark counter.
async fn seed_legacy_record(directory: &RestaurantDirectory<dinemap::memory::InMemoryStore>) -> Uuid {
    let id = Uuid::new();
    directory
        .backend()
        .insert_document(
            id,
            Bson::Document(doc! {
                "id": id,
                "name": "legacy",
                "address": "1 Old Rd",
                "location": "Jongno-gu",
                "minPrice": 10_i64,
                "maxPrice": 30_i64,
                "currency": "KRW",
                "cuisine": "Korean",
                "longitude": 126.98,
                "latitude": 37.57,
                "phoneNumber": "+82-2-111-1111",
                "url": "https://guide.example/legacy",
                "websiteUrl": "https://legacy.example",
                "award": "",
                "country": "KR",
                // no bookmarkCount, no position
            }),
            "restaurants",
        )
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn missing_counter_reads_as_zero_before_any_backfill() {
    let directory = directory();
    let id = seed_legacy_record(&directory).await;

    let all = directory.find_all().await.unwrap();
    let legacy = all.iter().find(|r| r.id == id).unwrap();
    assert_eq!(legacy.bookmark_count, 0);
}

#[tokio::test]
async fn backfill_normalizes_stored_records_and_is_idempotent() {
    let directory = directory();
    seed_legacy_record(&directory).await;
    directory.create(attrs("modern")).await.unwrap();

    // Only the legacy record is missing the counter.
    assert_eq!(directory.backfill_bookmark_counts().await.unwrap(), 1);

    // The stored document now carries the field explicitly.
    let stored = directory
        .backend()
        .find_one(Some(Filter::eq("name", "legacy")), "restaurants")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.as_document().unwrap().get("bookmarkCount"),
        Some(&Bson::Int64(0))
    );

    // Running it again touches nothing.
    assert_eq!(directory.backfill_bookmark_counts().await.unwrap(), 0);
}
