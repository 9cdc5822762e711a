//! Event repository trait

use crate::error::Result;
use crate::models::{Event, EventPatch, NewEvent};
use crate::query::ListPlan;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

/// Store operations over the single `events` collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a full record, returning the assigned id
    async fn insert(&self, event: NewEvent) -> Result<ObjectId>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>>;

    /// Documents matching the plan's filter, in its window
    async fn find(&self, plan: &ListPlan) -> Result<Vec<Event>>;

    /// Apply `patch` with `$set`. Returns whether a document matched.
    async fn merge(&self, id: ObjectId, patch: EventPatch) -> Result<bool>;

    async fn exists(&self, id: ObjectId) -> Result<bool>;

    /// Returns whether a document was removed
    async fn delete(&self, id: ObjectId) -> Result<bool>;
}
