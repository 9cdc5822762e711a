//! Event domain models

use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Multipart part carrying the optional image file.
pub const IMAGE_FIELD: &str = "image";

/// Stored event document.
///
/// Every declared field is written on create, so a stored document always
/// has all of them; optional ones may be `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub tagline: Option<String>,
    /// ISO-8601 text
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Older documents may hold the rank as text
    #[serde(default, deserialize_with = "lenient_rank")]
    pub rigor_rank: Option<i64>,
    /// Path of the uploaded file, or empty
    #[serde(default)]
    pub image: String,
}

/// Reads a stored rank written as an integer, a whole double or numeric text.
///
/// Blank or non-numeric text and fractional doubles read as no rank.
fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RankVisitor;

    impl<'de> Visitor<'de> for RankVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer rank, numeric text or null")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(i64::try_from(v).ok())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            let whole = v.is_finite()
                && v.fract() == 0.0
                && v >= i64::MIN as f64
                && v < i64::MAX as f64;
            Ok(whole.then_some(v as i64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse().ok())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_option(RankVisitor)
}

/// Full record for insertion; the store assigns `_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<i64>,
    pub image: String,
}

/// Sparse merge-update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// `Some(None)` clears the rank
    pub rigor_rank: Option<Option<i64>>,
    pub image: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.to_document().is_empty()
    }

    /// Body of the `$set` operator.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();

        let text_fields = [
            ("name", &self.name),
            ("tagline", &self.tagline),
            ("schedule", &self.schedule),
            ("description", &self.description),
            ("moderator", &self.moderator),
            ("category", &self.category),
            ("sub_category", &self.sub_category),
            ("image", &self.image),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                doc.insert(key, value.as_str());
            }
        }

        if let Some(rank) = self.rigor_rank {
            doc.insert("rigor_rank", rank.map_or(Bson::Null, Bson::Int64));
        }

        doc
    }
}

/// Declared text fields of a write request.
///
/// `Some` means the part was present in the body, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<String>,
}

impl EventFields {
    /// Slot for a multipart part name; `None` for undeclared names.
    pub fn slot_mut(&mut self, part: &str) -> Option<&mut Option<String>> {
        match part {
            "name" => Some(&mut self.name),
            "tagline" => Some(&mut self.tagline),
            "schedule" => Some(&mut self.schedule),
            "description" => Some(&mut self.description),
            "moderator" => Some(&mut self.moderator),
            "category" => Some(&mut self.category),
            "sub_category" => Some(&mut self.sub_category),
            "rigor_rank" => Some(&mut self.rigor_rank),
            _ => None,
        }
    }
}

/// Uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Client-supplied name; may contain path components
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Parsed write request: text fields plus the optional file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub fields: EventFields,
    pub image: Option<UploadedFile>,
}

/// Query string of the list endpoint.
///
/// Values stay textual so malformed numbers surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// `latest` keeps events scheduled at or before now
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// 1-based page (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
}

/// JSON shape of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    /// 24-character hex ObjectId
    #[serde(rename = "_id")]
    #[schema(example = "665f1c2e9b1e8a3d4c5b6a79")]
    pub id: String,
    pub name: Option<String>,
    pub tagline: Option<String>,
    #[schema(example = "2024-05-01T10:00:00.000Z")]
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<i64>,
    #[schema(example = "uploads/1714557600000-banner.png")]
    pub image: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_hex(),
            name: event.name,
            tagline: event.tagline,
            schedule: event.schedule,
            description: event.description,
            moderator: event.moderator,
            category: event.category,
            sub_category: event.sub_category,
            rigor_rank: event.rigor_rank,
            image: event.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedEvent {
    #[schema(example = "665f1c2e9b1e8a3d4c5b6a79")]
    pub id: String,
}

/// Multipart body accepted by create and update (documentation only).
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct EventUploadForm {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Integer; empty clears it on update
    pub rigor_rank: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}
