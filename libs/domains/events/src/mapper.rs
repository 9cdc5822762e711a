//! Form fields to store records.
//!
//! Only the eight declared fields are read. On create every field is written
//! (missing ones as `null`); on update a field is written iff its part was
//! present in the request, empty strings included.

use crate::error::{EventError, Result};
use crate::models::{EventFields, EventPatch, NewEvent};

/// Parses `rigor_rank` text. Blank means no rank.
fn parse_rank(raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| EventError::Validation(format!("rigor_rank must be an integer, got {:?}", raw)))
}

/// Full record for insertion. `image` is the stored file path, if any.
pub fn build_create_record(fields: EventFields, image: Option<&str>) -> Result<NewEvent> {
    let rigor_rank = match fields.rigor_rank.as_deref() {
        Some(raw) => parse_rank(raw)?,
        None => None,
    };

    Ok(NewEvent {
        name: fields.name,
        tagline: fields.tagline,
        schedule: fields.schedule,
        description: fields.description,
        moderator: fields.moderator,
        category: fields.category,
        sub_category: fields.sub_category,
        rigor_rank,
        image: image.unwrap_or_default().to_string(),
    })
}

/// Sparse patch of the fields present in the request. May be empty.
pub fn build_update_patch(fields: EventFields, image: Option<&str>) -> Result<EventPatch> {
    let rigor_rank = fields.rigor_rank.as_deref().map(parse_rank).transpose()?;

    Ok(EventPatch {
        name: fields.name,
        tagline: fields.tagline,
        schedule: fields.schedule,
        description: fields.description,
        moderator: fields.moderator,
        category: fields.category,
        sub_category: fields.sub_category,
        rigor_rank,
        image: image.map(str::to_string),
    })
}
