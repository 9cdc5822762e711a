//! Event domain error types

use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Event domain errors
#[derive(Debug, Error)]
pub enum EventError {
    /// Identifier is not a 24-character hex ObjectId
    #[error("Invalid event id: {0}")]
    InvalidId(String),

    /// Malformed list parameters or form fields
    #[error("{0}")]
    Validation(String),

    #[error("Event not found")]
    NotFound(ObjectId),

    /// Document store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Uploaded file could not be written or removed
    #[error("Upload error: {0}")]
    Upload(String),
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for EventError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Storage(format!("BSON serialization error: {}", err))
    }
}

impl From<mongodb::bson::de::Error> for EventError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        Self::Storage(format!("BSON deserialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for EventError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<std::io::Error> for EventError {
    fn from(err: std::io::Error) -> Self {
        Self::Upload(err.to_string())
    }
}

// Convert to axum_helpers::AppError for HTTP responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::InvalidId(_) => AppError::InvalidObjectId(err.to_string()),
            EventError::Validation(message) => AppError::Validation(message),
            EventError::NotFound(_) => AppError::NotFound(err.to_string()),
            EventError::Storage(message) => AppError::Database(message),
            EventError::Upload(message) => AppError::Upload(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
