//! Events Domain
//!
//! Event records with an optional uploaded image, stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Request Flow                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  multipart form ─► handlers ─► EventService ─┬─► UploadStore │
//! │                                              │   (disk)      │
//! │                                              │               │
//! │                                              └─► EventRepo   │
//! │                                                  (MongoDB)   │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The file is written before the document. When the document write fails
//! the stored file is removed again.

use utoipa::OpenApi;

mod error;
mod handlers;
mod mapper;
mod models;
mod mongo;
mod query;
mod repository;
mod service;
mod upload;

pub use error::{EventError, Result};
pub use handlers::{
    DELETED_MESSAGE, EventsState, UPDATED_MESSAGE, events_router, read_event_form,
};
pub use mapper::{build_create_record, build_update_patch};
pub use models::{
    CreatedEvent, Event, EventFields, EventForm, EventListQuery, EventPatch, EventResponse,
    EventUploadForm, IMAGE_FIELD, NewEvent, UploadedFile,
};
pub use mongo::MongoEventRepository;
pub use query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, EventScope, LATEST, ListPlan, Window, build_list_query,
    iso_timestamp,
};
pub use repository::EventRepository;
pub use service::{EventService, parse_event_id};
pub use upload::{DiskUploadStore, StoredFile, UploadStore};

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_events,
        handlers::create_event,
        handlers::get_event,
        handlers::update_event,
        handlers::delete_event,
    ),
    components(schemas(EventResponse, CreatedEvent, EventUploadForm)),
    tags(
        (name = "events", description = "Event records with optional image upload")
    )
)]
pub struct ApiDoc;
