mod common;

use bson::{Bson, Uuid, doc};
use common::{attrs_at, directory};
use dinemap::prelude::*;

#[tokio::test]
async fn lone_pivot_returns_a_singleton_with_zero_distance() {
    let directory = directory();
    let pivot = directory
        .create(attrs_at("pivot", "KR", "Korean", 126.9780, 37.5665))
        .await
        .unwrap();

    let nearby = directory.find_near_by_id(pivot.id).await.unwrap();

    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].restaurant.id, pivot.id);
    assert!(nearby[0].distance.abs() < 1e-6);
}

#[tokio::test]
async fn results_are_nearest_first_and_include_the_pivot() {
    let directory = directory();
    // Pivot at Seoul City Hall; one neighbor ~700 m away, one ~8 km away.
    let pivot = directory
        .create(attrs_at("pivot", "KR", "Korean", 126.9780, 37.5665))
        .await
        .unwrap();
    let close = directory
        .create(attrs_at("close", "KR", "Korean", 126.9849, 37.5636))
        .await
        .unwrap();
    let farther = directory
        .create(attrs_at("farther", "KR", "Korean", 127.0276, 37.4979))
        .await
        .unwrap();

    let nearby = directory.find_near_by_id(pivot.id).await.unwrap();

    let ids = nearby
        .iter()
        .map(|n| n.restaurant.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![pivot.id, close.id, farther.id]);

    // Distances are kilometers, ascending.
    assert!(nearby[0].distance < nearby[1].distance);
    assert!(nearby[1].distance < nearby[2].distance);
    assert!(nearby[1].distance > 0.3 && nearby[1].distance < 2.0);
    assert!(nearby[2].distance > 5.0 && nearby[2].distance < 15.0);
}

#[tokio::test]
async fn matches_beyond_thirty_kilometers_are_excluded() {
    let directory = directory();
    let pivot = directory
        .create(attrs_at("pivot", "KR", "Korean", 126.9780, 37.5665))
        .await
        .unwrap();
    // Incheon, ~27 km out: inside the cap.
    directory
        .create(attrs_at("incheon", "KR", "Korean", 126.7052, 37.4563))
        .await
        .unwrap();
    // Busan, ~325 km out: excluded.
    directory
        .create(attrs_at("busan", "KR", "Korean", 129.0756, 35.1796))
        .await
        .unwrap();

    let nearby = directory.find_near_by_id(pivot.id).await.unwrap();

    let names = nearby
        .iter()
        .map(|n| n.restaurant.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["pivot", "incheon"]);
    assert!(nearby[1].distance < 30.0);
}

#[tokio::test]
async fn candidates_from_other_countries_are_excluded() {
    let directory = directory();
    let pivot = directory
        .create(attrs_at("pivot", "KR", "Korean", 126.9780, 37.5665))
        .await
        .unwrap();
    // Same block, different country attribute: filtered out.
    directory
        .create(attrs_at("elsewhere", "JP", "Japanese", 126.9781, 37.5666))
        .await
        .unwrap();

    let nearby = directory.find_near_by_id(pivot.id).await.unwrap();

    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].restaurant.id, pivot.id);
}

#[tokio::test]
async fn an_unknown_pivot_is_not_found() {
    let directory = directory();

    let err = directory.find_near_by_id(Uuid::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_, _)));
}

#[tokio::test]
async fn records_without_a_position_never_appear_in_geo_results() {
    let directory = directory();
    let pivot = directory
        .create(attrs_at("pivot", "KR", "Korean", 126.9780, 37.5665))
        .await
        .unwrap();

    // A legacy record with coordinates but no derived GeoJSON point; the
    // radius query cannot see it.
    let legacy = Uuid::new();
    directory
        .backend()
        .insert_document(
            legacy,
            Bson::Document(doc! {
                "id": legacy,
                "name": "legacy",
                "address": "1 Old Rd",
                "location": "Jung-gu",
                "minPrice": 10_i64,
                "maxPrice": 30_i64,
                "currency": "KRW",
                "cuisine": "Korean",
                "longitude": 126.9781,
                "latitude": 37.5666,
                "phoneNumber": "+82-2-111-1111",
                "url": "https://guide.example/legacy",
                "websiteUrl": "https://legacy.example",
                "award": "",
                "country": "KR",
                "bookmarkCount": 0_i64,
            }),
            "restaurants",
        )
        .await
        .unwrap();

    let nearby = directory.find_near_by_id(pivot.id).await.unwrap();

    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].restaurant.id, pivot.id);
}
