use async_trait::async_trait;
use bson::{Bson, Document, Uuid, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, FindOptions, IndexOptions, ReturnDocument},
};

use dinemap_core::{
    backend::StoreBackend,
    error::{StoreError, StoreResult},
    geo::GeoNear,
    query::{Expr, Query, SortDirection},
    update::Update,
};

use crate::{
    query::{geo_near_stage, translate_filter, translate_update},
    session::MongoSession,
};

/// MongoDB implementation of the directory's store backend.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn prepare_document(&self, id: &Uuid, document: &Bson) -> StoreResult<Document> {
        Ok(Document::from_iter(
            document
                .as_document()
                .cloned()
                .ok_or_else(|| StoreError::Serialization("expected a BSON document".into()))?
                .into_iter()
                .chain(vec![("_id".to_string(), id.into())]),
        ))
    }

    fn restore_document(&self, document: &Document) -> StoreResult<Bson> {
        Ok(Bson::Document(Document::from_iter(
            document
                .clone()
                .into_iter()
                .filter(|(k, _)| k.as_str() != "_id"),
        )))
    }

    pub async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    type Session = MongoSession;

    async fn start_session(&self) -> StoreResult<Self::Session> {
        Ok(MongoSession::new(
            self.client
                .start_session()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?,
        ))
    }

    async fn insert_document(
        &self,
        id: Uuid,
        document: Bson,
        collection: &str,
    ) -> StoreResult<()> {
        self.get_collection(collection)
            .insert_one(self.prepare_document(&id, &document)?)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn find_one(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<Option<Bson>> {
        self.get_collection(collection)
            .find_one(translate_filter(filter.as_ref())?)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|doc| self.restore_document(&doc))
            .transpose()
    }

    async fn find(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        self.get_collection(collection)
            .find(translate_filter(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .iter()
            .map(|doc| self.restore_document(doc))
            .collect()
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<u64> {
        self.get_collection(collection)
            .count_documents(translate_filter(filter.as_ref())?)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn find_one_and_update(
        &self,
        filter: Expr,
        update: Update,
        session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<Option<Bson>> {
        let filter = translate_filter(Some(&filter))?;
        let update = translate_update(&update);
        let collection = self.get_collection(collection);

        let updated = match session {
            Some(session) => collection
                .find_one_and_update(filter, update)
                .return_document(ReturnDocument::After)
                .session(&mut session.inner)
                .await,
            None => collection
                .find_one_and_update(filter, update)
                .return_document(ReturnDocument::After)
                .await,
        }
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        updated
            .map(|doc| self.restore_document(&doc))
            .transpose()
    }

    async fn update_many(
        &self,
        filter: Expr,
        update: Update,
        session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<u64> {
        let filter = translate_filter(Some(&filter))?;
        let update = translate_update(&update);
        let collection = self.get_collection(collection);

        let result = match session {
            Some(session) => collection
                .update_many(filter, update)
                .session(&mut session.inner)
                .await,
            None => collection.update_many(filter, update).await,
        }
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn geo_near(&self, near: GeoNear, collection: &str) -> StoreResult<Vec<Bson>> {
        self.get_collection(collection)
            .aggregate(vec![geo_near_stage(&near)?])
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .iter()
            .map(|doc| self.restore_document(doc))
            .collect()
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .create_collection(name)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .into_iter()
            .filter(|name| name != "_revisions")
            .collect())
    }

    async fn add_index(&self, collection: &str, field: &str, unique: bool) -> StoreResult<()> {
        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { field: 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(unique)
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn add_geo_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { field: "2dsphere" })
                    .build(),
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn current_revision_id(&self) -> StoreResult<Option<String>> {
        let result = self
            .get_collection("_revisions")
            .find_one(doc! { "_id": 0 })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if let Some(doc) = result {
            if let Some(Bson::String(rev_id)) = doc.get("revision_id") {
                return Ok(Some(rev_id.clone()));
            }
        }

        Ok(None)
    }

    async fn set_revision_id(&self, revision_id: &str) -> StoreResult<()> {
        self.get_collection("_revisions")
            .update_one(
                doc! { "_id": 0 },
                doc! { "$set": { "revision_id": revision_id } },
            )
            .upsert(true)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

/// Builder carrying the backend's connection configuration.
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    pub async fn build(self) -> StoreResult<MongoDbStore> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
