//! List query planning: `type`/`page`/`limit` to a filter and a window.

use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{Document, doc};
use validator::Validate;

use crate::error::{EventError, Result};
use crate::models::EventListQuery;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// `type` value selecting events scheduled at or before now.
pub const LATEST: &str = "latest";

/// Which documents a listing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventScope {
    All,
    /// `schedule <= cutoff`, compared as text
    ScheduledUntil(String),
}

/// Slice of the filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: i64,
}

/// Filter and window for one list call. No sort: natural store order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub scope: EventScope,
    pub window: Window,
}

impl ListPlan {
    pub fn filter(&self) -> Document {
        match &self.scope {
            EventScope::All => doc! {},
            EventScope::ScheduledUntil(cutoff) => doc! { "schedule": { "$lte": cutoff } },
        }
    }
}

#[derive(Debug, Validate)]
struct Pagination {
    #[validate(range(min = 1, message = "page must be a positive integer"))]
    page: i64,
    #[validate(range(min = 1, message = "limit must be a positive integer"))]
    limit: i64,
}

fn parse_param(name: &str, raw: Option<&str>, default: i64) -> Result<i64> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            EventError::Validation(format!("{} must be a positive integer, got {:?}", name, raw))
        }),
    }
}

/// Renders an instant the way stored `schedule` values are written:
/// UTC, millisecond precision, `Z` suffix.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds the plan for one list request.
///
/// Omitted `page`/`limit` default to 1 and 10. Non-numeric, zero or negative
/// values and a skip that overflows fail with [`EventError::Validation`].
pub fn build_list_query(query: &EventListQuery, now: DateTime<Utc>) -> Result<ListPlan> {
    let pagination = Pagination {
        page: parse_param("page", query.page.as_deref(), DEFAULT_PAGE)?,
        limit: parse_param("limit", query.limit.as_deref(), DEFAULT_LIMIT)?,
    };
    pagination.validate()?;

    let skip = (pagination.page - 1)
        .checked_mul(pagination.limit)
        .and_then(|skip| u64::try_from(skip).ok())
        .ok_or_else(|| EventError::Validation("page is too large".to_string()))?;

    let scope = match query.kind.as_deref() {
        Some(LATEST) => EventScope::ScheduledUntil(iso_timestamp(now)),
        _ => EventScope::All,
    };

    Ok(ListPlan {
        scope,
        window: Window {
            skip,
            limit: pagination.limit,
        },
    })
}
