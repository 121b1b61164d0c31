use bson::{Bson, Uuid, doc};
use dinemap_core::{
    backend::{StoreBackend, StoreSession},
    query::Filter,
    update::Update,
};
use dinemap_memory::InMemoryStore;

const COLLECTION: &str = "restaurants";

async fn seed(store: &InMemoryStore, name: &str, count: i64) -> Uuid {
    let id = Uuid::new();
    store
        .insert_document(
            id,
            Bson::Document(doc! { "id": id, "name": name, "bookmarkCount": count }),
            COLLECTION,
        )
        .await
        .unwrap();
    id
}

async fn count_of(store: &InMemoryStore, id: Uuid) -> i64 {
    store
        .find_one(Some(Filter::eq("id", id)), COLLECTION)
        .await
        .unwrap()
        .unwrap()
        .as_document()
        .unwrap()
        .get("bookmarkCount")
        .unwrap()
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn aborted_transaction_restores_pre_images() {
    let store = InMemoryStore::new();
    let id = seed(&store, "a", 3).await;

    let mut session = store.start_session().await.unwrap();
    session.start_transaction().await.unwrap();

    store
        .find_one_and_update(
            Filter::eq("id", id),
            Update::inc("bookmarkCount", 1),
            Some(&mut session),
            COLLECTION,
        )
        .await
        .unwrap();
    assert_eq!(count_of(&store, id).await, 4);

    session.abort_transaction().await.unwrap();
    assert_eq!(count_of(&store, id).await, 3);
}

#[tokio::test]
async fn committed_transaction_keeps_mutations() {
    let store = InMemoryStore::new();
    let id = seed(&store, "a", 0).await;

    let mut session = store.start_session().await.unwrap();
    session.start_transaction().await.unwrap();

    store
        .find_one_and_update(
            Filter::eq("id", id),
            Update::inc("bookmarkCount", 1),
            Some(&mut session),
            COLLECTION,
        )
        .await
        .unwrap();
    session.commit_transaction().await.unwrap();

    assert_eq!(count_of(&store, id).await, 1);
}

#[tokio::test]
async fn abort_rolls_back_multi_document_updates() {
    let store = InMemoryStore::new();
    let a = seed(&store, "a", 1).await;
    let b = seed(&store, "b", 2).await;
    let untouched = seed(&store, "c", 9).await;

    let mut session = store.start_session().await.unwrap();
    session.start_transaction().await.unwrap();

    let matched = store
        .update_many(
            Filter::is_in("id", [a, b]),
            Update::inc("bookmarkCount", -1),
            Some(&mut session),
            COLLECTION,
        )
        .await
        .unwrap();
    assert_eq!(matched, 2);
    assert_eq!(count_of(&store, a).await, 0);
    assert_eq!(count_of(&store, b).await, 1);

    session.abort_transaction().await.unwrap();
    assert_eq!(count_of(&store, a).await, 1);
    assert_eq!(count_of(&store, b).await, 2);
    assert_eq!(count_of(&store, untouched).await, 9);
}

#[tokio::test]
async fn mutations_outside_a_transaction_apply_immediately() {
    let store = InMemoryStore::new();
    let id = seed(&store, "a", 0).await;

    let mut session = store.start_session().await.unwrap();

    // No transaction started: nothing to roll back later.
    store
        .find_one_and_update(
            Filter::eq("id", id),
            Update::inc("bookmarkCount", 1),
            Some(&mut session),
            COLLECTION,
        )
        .await
        .unwrap();

    assert!(session.abort_transaction().await.is_err());
    assert_eq!(count_of(&store, id).await, 1);
}

#[tokio::test]
async fn nested_transactions_are_rejected() {
    let store = InMemoryStore::new();
    let mut session = store.start_session().await.unwrap();

    session.start_transaction().await.unwrap();
    assert!(session.start_transaction().await.is_err());
}
