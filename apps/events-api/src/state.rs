//! Application state management.
//!
//! Shared by the route builders at startup. The MongoDB client is cloneable
//! and shares one connection pool.

use mongodb::Client;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Pooled MongoDB client
    pub mongo_client: Client,
}
