//! MongoDB implementation of EventRepository

use crate::error::{EventError, Result};
use crate::models::{Event, EventPatch, NewEvent};
use crate::query::ListPlan;
use crate::repository::EventRepository;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, ClientSession, Collection, IndexModel};
use tracing::{debug, instrument};

/// MongoDB-based event repository
///
/// Holds the pooled [`Client`]. Every operation starts its own
/// [`ClientSession`]; the session and any connection it checked out go back
/// to the pool when it drops, on success, error or cancellation alike.
#[derive(Clone)]
pub struct MongoEventRepository {
    client: Client,
    collection: Collection<Event>,
}

impl MongoEventRepository {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Ascending index on `schedule` for the `latest` filter
    pub async fn create_indexes(&self) -> Result<()> {
        let index = IndexModel::builder().keys(doc! { "schedule": 1 }).build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn session(&self) -> Result<ClientSession> {
        Ok(self.client.start_session().await?)
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event))]
    async fn insert(&self, event: NewEvent) -> Result<ObjectId> {
        let mut session = self.session().await?;

        let result = self
            .collection
            .clone_with_type::<NewEvent>()
            .insert_one(&event)
            .session(&mut session)
            .await?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| EventError::Storage("inserted id is not an ObjectId".to_string()))?;
        debug!(event_id = %id, "Event inserted");
        Ok(id)
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>> {
        let mut session = self.session().await?;

        let event = self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut session)
            .await?;
        Ok(event)
    }

    #[instrument(skip(self, plan), fields(skip = plan.window.skip, limit = plan.window.limit))]
    async fn find(&self, plan: &ListPlan) -> Result<Vec<Event>> {
        let mut session = self.session().await?;

        let mut cursor = self
            .collection
            .find(plan.filter())
            .skip(plan.window.skip)
            .limit(plan.window.limit)
            .session(&mut session)
            .await?;

        let events: Vec<Event> = cursor.stream(&mut session).try_collect().await?;
        Ok(events)
    }

    #[instrument(skip(self, patch), fields(event_id = %id))]
    async fn merge(&self, id: ObjectId, patch: EventPatch) -> Result<bool> {
        let mut session = self.session().await?;

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": patch.to_document() })
            .session(&mut session)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn exists(&self, id: ObjectId) -> Result<bool> {
        let mut session = self.session().await?;

        let count = self
            .collection
            .count_documents(doc! { "_id": id })
            .limit(1)
            .session(&mut session)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let mut session = self.session().await?;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .session(&mut session)
            .await?;
        Ok(result.deleted_count > 0)
    }
}
