mod common;

use bson::{Bson, Uuid, doc};
use common::directory;
use dinemap::{memory::InMemoryStore, prelude::*};

#[tokio::test]
async fn upgrade_walks_the_chain_to_its_head() {
    let directory = directory();

    directory.run_migrations().await.unwrap();

    let revision = directory
        .backend()
        .current_revision_id()
        .await
        .unwrap();
    assert_eq!(revision.as_deref(), Some("backfill_bookmark_counts"));

    let collections = directory.backend().list_collections().await.unwrap();
    assert!(collections.contains(&"restaurants".to_string()));
}

#[tokio::test]
async fn upgrade_from_head_is_a_no_op() {
    let directory = directory();

    directory.run_migrations().await.unwrap();
    directory.run_migrations().await.unwrap();

    let revision = directory
        .backend()
        .current_revision_id()
        .await
        .unwrap();
    assert_eq!(revision.as_deref(), Some("backfill_bookmark_counts"));
}

#[tokio::test]
async fn backfill_migration_normalizes_legacy_counters() {
    let store = InMemoryStore::new();

    // A record written before the bookmark counter existed.
    let id = Uuid::new();
    store
        .insert_document(
            id,
            Bson::Document(doc! { "id": id, "name": "legacy", "country": "KR" }),
            "restaurants",
        )
        .await
        .unwrap();

    let directory = RestaurantDirectory::new(store);
    directory.run_migrations().await.unwrap();

    let stored = directory
        .backend()
        .find_one(Some(Filter::eq("id", id)), "restaurants")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.as_document().unwrap().get("bookmarkCount"),
        Some(&Bson::Int64(0))
    );
}

#[tokio::test]
async fn downgrade_steps_back_to_the_target_revision() {
    let directory = directory();
    directory.run_migrations().await.unwrap();

    let runner = MigrationRunner::new(directory_migrations()).unwrap();
    runner
        .downgrade_to(directory.backend(), "create_restaurants")
        .await
        .unwrap();

    let revision = directory
        .backend()
        .current_revision_id()
        .await
        .unwrap();
    assert_eq!(revision.as_deref(), Some("create_restaurants"));

    // The backfill is not reversible; the collection survives a downgrade to
    // the initial revision.
    let collections = directory.backend().list_collections().await.unwrap();
    assert!(collections.contains(&"restaurants".to_string()));
}

#[tokio::test]
async fn out_of_order_chains_are_rejected() {
    let mut chain = directory_migrations::<InMemoryStore>();
    chain.reverse();

    let err = MigrationRunner::new(chain).unwrap_err();
    assert!(matches!(err, StoreError::Migration(_)));
}
