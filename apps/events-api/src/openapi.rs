//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Events API",
        version = "0.1.0",
        description = "MongoDB-backed REST API for event records with optional image upload",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "events", description = "Event records with optional image upload")
    )
)]
struct ApiInfo;

/// Combined OpenAPI documentation for the Events API.
///
/// Domain paths are already absolute, so they are merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ApiInfo::openapi();
        doc.merge(domain_events::ApiDoc::openapi());
        doc
    }
}
