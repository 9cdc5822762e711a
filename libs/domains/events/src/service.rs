//! Event service layer

use crate::error::{EventError, Result};
use crate::mapper::{build_create_record, build_update_patch};
use crate::models::{Event, EventForm, EventListQuery, UploadedFile};
use crate::query::build_list_query;
use crate::repository::EventRepository;
use crate::upload::{StoredFile, UploadStore};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Parses a 24-character hex id.
pub fn parse_event_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| EventError::InvalidId(id.to_string()))
}

/// Orchestrates the mapper, planner, repository and upload store.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct EventService<R: EventRepository, U: UploadStore> {
    repository: Arc<R>,
    uploads: Arc<U>,
}

impl<R: EventRepository, U: UploadStore> EventService<R, U> {
    pub fn new(repository: R, uploads: U) -> Self {
        Self {
            repository: Arc::new(repository),
            uploads: Arc::new(uploads),
        }
    }

    async fn store_upload(&self, image: Option<UploadedFile>) -> Result<Option<StoredFile>> {
        match image {
            Some(file) => self.uploads.store(file).await.map(Some),
            None => Ok(None),
        }
    }

    /// Returns `result`, first removing `stored` when `result` is an error.
    ///
    /// Removal is attempted once; its failure is logged and the original
    /// error returned.
    async fn discard_upload_on_error<T>(
        &self,
        result: Result<T>,
        stored: Option<&StoredFile>,
    ) -> Result<T> {
        if let (Err(err), Some(file)) = (&result, stored) {
            match self.uploads.remove(&file.path).await {
                Ok(()) => info!(path = %file.path, error = %err, "Discarded upload after failed write"),
                Err(cleanup) => warn!(
                    path = %file.path,
                    error = %err,
                    cleanup_error = %cleanup,
                    "Failed to discard upload after failed write"
                ),
            }
        }
        result
    }

    /// Store the optional image, insert the record, return its id.
    #[instrument(skip(self, form), fields(has_image = form.image.is_some()))]
    pub async fn create(&self, form: EventForm) -> Result<ObjectId> {
        let stored = self.store_upload(form.image).await?;
        let image = stored.as_ref().map(|file| file.path.as_str());

        let result = match build_create_record(form.fields, image) {
            Ok(record) => self.repository.insert(record).await,
            Err(err) => Err(err),
        };

        let id = self.discard_upload_on_error(result, stored.as_ref()).await?;
        info!(event_id = %id, "Event created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Event> {
        let oid = parse_event_id(id)?;
        self.repository
            .find_by_id(oid)
            .await?
            .ok_or(EventError::NotFound(oid))
    }

    /// Matching events in the requested window. Empty is not an error.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &EventListQuery) -> Result<Vec<Event>> {
        let plan = build_list_query(query, Utc::now())?;
        self.repository.find(&plan).await
    }

    /// Merge the supplied fields (and image, if any) into the event.
    #[instrument(skip(self, form), fields(has_image = form.image.is_some()))]
    pub async fn update(&self, id: &str, form: EventForm) -> Result<()> {
        let oid = parse_event_id(id)?;

        let stored = self.store_upload(form.image).await?;
        let image = stored.as_ref().map(|file| file.path.as_str());

        let result = match build_update_patch(form.fields, image) {
            Ok(patch) if patch.is_empty() => self.repository.exists(oid).await,
            Ok(patch) => self.repository.merge(oid, patch).await,
            Err(err) => Err(err),
        }
        .and_then(|matched| {
            if matched {
                Ok(())
            } else {
                Err(EventError::NotFound(oid))
            }
        });

        self.discard_upload_on_error(result, stored.as_ref()).await?;
        info!(event_id = %oid, "Event updated");
        Ok(())
    }

    /// Hard delete. The stored image file is left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let oid = parse_event_id(id)?;

        if !self.repository.delete(oid).await? {
            return Err(EventError::NotFound(oid));
        }

        info!(event_id = %oid, "Event deleted");
        Ok(())
    }
}
