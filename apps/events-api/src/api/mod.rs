//! API routes module
//!
//! Routes here are nested under `/api` by `axum_helpers::create_router`.

pub mod events;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub async fn routes(state: &AppState) -> eyre::Result<Router> {
    Ok(Router::new()
        .nest("/v3/app/events", events::router(state).await?)
        .merge(health::router(state.clone())))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    events::init_indexes(state).await
}
