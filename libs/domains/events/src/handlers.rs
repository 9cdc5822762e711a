//! HTTP handlers for events API

use crate::error::EventError;
use crate::models::{
    CreatedEvent, EventFields, EventForm, EventListQuery, EventResponse, EventUploadForm,
    IMAGE_FIELD, UploadedFile,
};
use crate::repository::EventRepository;
use crate::service::EventService;
use crate::upload::UploadStore;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_helpers::AppError;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const UPDATED_MESSAGE: &str = "Event updated successfully";
pub const DELETED_MESSAGE: &str = "Event deleted successfully";

/// Events router state
pub type EventsState<R, U> = Arc<EventService<R, U>>;

/// Routes for one collection of events, relative to where they are nested.
pub fn events_router<R, U>() -> Router<EventsState<R, U>>
where
    R: EventRepository + 'static,
    U: UploadStore + 'static,
{
    Router::new()
        .route("/", get(list_events::<R, U>).post(create_event::<R, U>))
        .route(
            "/{id}",
            get(get_event::<R, U>)
                .put(update_event::<R, U>)
                .delete(delete_event::<R, U>),
        )
}

/// Reads the declared text parts and at most one image part.
///
/// Unknown parts are ignored. An image part with no filename and no bytes
/// counts as no file.
pub async fn read_event_form(mut multipart: Multipart) -> Result<EventForm, AppError> {
    let mut fields = EventFields::default();
    let mut image: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;

            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            if image.is_some() {
                return Err(EventError::Validation(
                    "only one image file may be uploaded".to_string(),
                )
                .into());
            }

            image = Some(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else if let Some(slot) = fields.slot_mut(&name) {
            *slot = Some(field.text().await?);
        } else {
            debug!(part = %name, "Ignoring undeclared form part");
        }
    }

    Ok(EventForm { fields, image })
}

/// List events
#[utoipa::path(
    get,
    path = "/api/v3/app/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "Events in the requested window", body = Vec<EventResponse>),
        (status = 400, response = axum_helpers::errors::responses::BadRequestValidationResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn list_events<R: EventRepository, U: UploadStore>(
    State(state): State<EventsState<R, U>>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventResponse>>, EventError> {
    let events = state.list(&query).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/api/v3/app/events",
    request_body(content = EventUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event created", body = CreatedEvent),
        (status = 400, response = axum_helpers::errors::responses::BadRequestValidationResponse),
        (status = 413, response = axum_helpers::errors::responses::PayloadTooLargeResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, multipart))]
pub async fn create_event<R: EventRepository, U: UploadStore>(
    State(state): State<EventsState<R, U>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CreatedEvent>, AppError> {
    let form = read_event_form(multipart?).await?;
    let id = state.create(form).await?;
    Ok(Json(CreatedEvent { id: id.to_hex() }))
}

/// Get an event by id
#[utoipa::path(
    get,
    path = "/api/v3/app/events/{id}",
    params(
        ("id" = String, Path, description = "Event ObjectId (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 400, response = axum_helpers::errors::responses::BadRequestObjectIdResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn get_event<R: EventRepository, U: UploadStore>(
    State(state): State<EventsState<R, U>>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, EventError> {
    let event = state.get(&id).await?;
    Ok(Json(event.into()))
}

/// Merge the supplied fields into an event
#[utoipa::path(
    put,
    path = "/api/v3/app/events/{id}",
    params(
        ("id" = String, Path, description = "Event ObjectId (24 hex characters)")
    ),
    request_body(content = EventUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = String, content_type = "text/plain"),
        (status = 400, response = axum_helpers::errors::responses::BadRequestObjectIdResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse),
        (status = 413, response = axum_helpers::errors::responses::PayloadTooLargeResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, multipart))]
pub async fn update_event<R: EventRepository, U: UploadStore>(
    State(state): State<EventsState<R, U>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = read_event_form(multipart?).await?;
    state.update(&id, form).await?;
    Ok((StatusCode::OK, UPDATED_MESSAGE))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/v3/app/events/{id}",
    params(
        ("id" = String, Path, description = "Event ObjectId (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event deleted", body = String, content_type = "text/plain"),
        (status = 400, response = axum_helpers::errors::responses::BadRequestObjectIdResponse),
        (status = 404, response = axum_helpers::errors::responses::NotFoundResponse),
        (status = 500, response = axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn delete_event<R: EventRepository, U: UploadStore>(
    State(state): State<EventsState<R, U>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, EventError> {
    state.delete(&id).await?;
    Ok((StatusCode::OK, DELETED_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, NewEvent};
    use crate::repository::MockEventRepository;
    use crate::upload::{MockUploadStore, StoredFile};
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use mongodb::bson::oid::ObjectId;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-EVENTS-BOUNDARY";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(method: &str, uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn app(repo: MockEventRepository, uploads: MockUploadStore) -> Router {
        let service = Arc::new(EventService::new(repo, uploads));
        Router::new()
            .nest("/events", events_router())
            .with_state(service)
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn sample(id: ObjectId) -> Event {
        Event {
            id,
            name: Some("RustConf".into()),
            tagline: Some("Systems".into()),
            schedule: Some("2024-09-10T09:00:00.000Z".into()),
            description: None,
            moderator: None,
            category: None,
            sub_category: None,
            rigor_rank: Some(3),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_event_returns_id() {
        let id = ObjectId::new();
        let mut repo = MockEventRepository::new();
        repo.expect_insert()
            .withf(|record: &NewEvent| {
                record.name.as_deref() == Some("RustConf")
                    && record.rigor_rank == Some(5)
                    && record.image.is_empty()
            })
            .times(1)
            .returning(move |_| Ok(id));

        let request = multipart_request(
            "POST",
            "/events",
            &[
                Part::Text("name", "RustConf"),
                Part::Text("rigor_rank", "5"),
                Part::Text("organizer", "ignored"),
            ],
        );

        let response = app(repo, MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["id"], id.to_hex());
    }

    #[tokio::test]
    async fn test_create_event_with_image() {
        let id = ObjectId::new();
        let mut uploads = MockUploadStore::new();
        uploads
            .expect_store()
            .withf(|file: &UploadedFile| file.file_name == "banner.png" && file.bytes == b"PNG")
            .times(1)
            .returning(|file| {
                Ok(StoredFile {
                    path: format!("uploads/1-{}", file.file_name),
                    original_name: file.file_name,
                })
            });

        let mut repo = MockEventRepository::new();
        repo.expect_insert()
            .withf(|record: &NewEvent| record.image == "uploads/1-banner.png")
            .returning(move |_| Ok(id));

        let request = multipart_request(
            "POST",
            "/events",
            &[
                Part::Text("name", "With image"),
                Part::File("image", "banner.png", b"PNG"),
            ],
        );

        let response = app(repo, uploads).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_event_empty_file_part_is_no_file() {
        let id = ObjectId::new();
        let mut uploads = MockUploadStore::new();
        uploads.expect_store().never();

        let mut repo = MockEventRepository::new();
        repo.expect_insert()
            .withf(|record: &NewEvent| record.image.is_empty())
            .returning(move |_| Ok(id));

        let request = multipart_request(
            "POST",
            "/events",
            &[Part::Text("name", "x"), Part::File("image", "", b"")],
        );

        let response = app(repo, uploads).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_event_rejects_second_image() {
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();
        let mut uploads = MockUploadStore::new();
        uploads.expect_store().never();

        let request = multipart_request(
            "POST",
            "/events",
            &[
                Part::File("image", "a.png", b"a"),
                Part::File("image", "b.png", b"b"),
            ],
        );

        let response = app(repo, uploads).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_event_bad_rank_is_bad_request() {
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();

        let request = multipart_request("POST", "/events", &[Part::Text("rigor_rank", "high")]);

        let response = app(repo, MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_event_requires_multipart() {
        let request = Request::builder()
            .method("POST")
            .uri("/events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(MockEventRepository::new(), MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_create_event_storage_error_hides_detail() {
        let mut repo = MockEventRepository::new();
        repo.expect_insert()
            .returning(|_| Err(EventError::Storage("primary at 10.0.0.7 unreachable".into())));

        let request = multipart_request("POST", "/events", &[Part::Text("name", "x")]);
        let response = app(repo, MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_get_event() {
        let id = ObjectId::new();
        let mut repo = MockEventRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample(id))));

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .uri(format!("/events/{}", id.to_hex()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["name"], "RustConf");
        assert_eq!(json["rigor_rank"], 3);
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["image"], "");
    }

    #[tokio::test]
    async fn test_get_event_malformed_id() {
        let mut repo = MockEventRepository::new();
        repo.expect_find_by_id().never();

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .uri("/events/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "INVALID_OBJECT_ID");
    }

    #[tokio::test]
    async fn test_get_event_not_found() {
        let mut repo = MockEventRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .uri(format!("/events/{}", ObjectId::new().to_hex()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Event not found");
    }

    #[tokio::test]
    async fn test_list_events_passes_query() {
        let mut repo = MockEventRepository::new();
        repo.expect_find()
            .withf(|plan| plan.window.skip == 4 && plan.window.limit == 2)
            .times(1)
            .returning(|_| Ok(vec![sample(ObjectId::new()), sample(ObjectId::new())]));

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .uri("/events?type=latest&limit=2&page=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_events_invalid_page() {
        let mut repo = MockEventRepository::new();
        repo.expect_find().never();

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .uri("/events?page=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_event_returns_text() {
        let id = ObjectId::new();
        let mut repo = MockEventRepository::new();
        repo.expect_merge()
            .withf(move |target, patch| {
                *target == id
                    && patch.name.as_deref() == Some("Renamed")
                    && patch.description.as_deref() == Some("")
                    && patch.schedule.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(true));

        let request = multipart_request(
            "PUT",
            &format!("/events/{}", id.to_hex()),
            &[Part::Text("name", "Renamed"), Part::Text("description", "")],
        );

        let response = app(repo, MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, UPDATED_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_update_event_not_found() {
        let mut repo = MockEventRepository::new();
        repo.expect_merge().returning(|_, _| Ok(false));

        let request = multipart_request(
            "PUT",
            &format!("/events/{}", ObjectId::new().to_hex()),
            &[Part::Text("name", "x")],
        );

        let response = app(repo, MockUploadStore::new())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_event_malformed_id_stores_nothing() {
        let mut uploads = MockUploadStore::new();
        uploads.expect_store().never();

        let request = multipart_request(
            "PUT",
            "/events/123",
            &[Part::File("image", "a.png", b"a")],
        );

        let response = app(MockEventRepository::new(), uploads)
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_event() {
        let id = ObjectId::new();
        let mut repo = MockEventRepository::new();
        repo.expect_delete()
            .withf(move |target| *target == id)
            .times(1)
            .returning(|_| Ok(true));

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/events/{}", id.to_hex()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, DELETED_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_delete_event_twice_is_not_found() {
        let mut repo = MockEventRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let response = app(repo, MockUploadStore::new())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/events/{}", ObjectId::new().to_hex()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
