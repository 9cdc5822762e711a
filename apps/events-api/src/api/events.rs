//! Events API routes
//!
//! Wires the events domain to MongoDB and the on-disk upload store.

use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use domain_events::{DiskUploadStore, EventService, MongoEventRepository};
use std::sync::Arc;
use tracing::info;

fn repository(state: &AppState) -> MongoEventRepository {
    MongoEventRepository::new(
        state.mongo_client.clone(),
        state.config.mongodb.database(),
        &state.config.events.collection,
    )
}

/// Create the events router. The upload directory is created if missing.
pub async fn router(state: &AppState) -> eyre::Result<Router> {
    let uploads = DiskUploadStore::new(&state.config.upload.dir);
    uploads
        .ensure_dir()
        .await
        .map_err(|e| eyre::eyre!("Failed to prepare upload directory: {}", e))?;

    info!(
        dir = %uploads.dir().display(),
        max_bytes = state.config.upload.max_bytes,
        "Upload store ready"
    );

    let service = Arc::new(EventService::new(repository(state), uploads));

    Ok(domain_events::events_router()
        .layer(DefaultBodyLimit::max(state.config.upload.max_bytes))
        .with_state(service))
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = repository(state);
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!(collection = repository.collection_name(), "Event collection indexes created");
    Ok(())
}
