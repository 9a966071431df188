use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::utils::error::{AppError, AppResult};

/// Lifecycle status of an event.
///
/// Transitions are unrestricted: any status may be assigned from any other,
/// including itself. Tokens are lowercase and parsed case-sensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Canceled,
    Full,
}

impl EventStatus {
    pub const ALL: [EventStatus; 3] = [EventStatus::Active, EventStatus::Canceled, EventStatus::Full];

    pub fn parse_token(token: &str) -> AppResult<Self> {
        token.parse().map_err(|_| {
            AppError::ValidationError(format!(
                "Invalid event status '{}': expected one of active, canceled, full",
                token
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub image_url: Option<String>,
    pub event_type_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: EventStatus,
    pub creator_id: Uuid,
    pub creation_date: NaiveDate,
}

impl Event {
    /// Builds a brand new event: fresh id, `active` status and today's
    /// creation date, whatever the request carried.
    pub fn create(request: EventRequest, creator_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            location: Some(request.location),
            full_address: request.full_address,
            image_url: request.image_url,
            event_type_id: request.event_type_id,
            category_id: request.category_id,
            status: EventStatus::Active,
            creator_id,
            creation_date: Utc::now().date_naive(),
        }
    }

    /// Full-replace of the mutable fields. Identity, creator, status and
    /// creation date are kept; references are only replaced when supplied.
    pub fn apply_update(&mut self, request: EventRequest) {
        self.name = request.name;
        self.description = request.description;
        self.start_date = request.start_date;
        self.end_date = request.end_date;
        self.location = Some(request.location);
        self.full_address = request.full_address;
        self.image_url = request.image_url;

        if request.event_type_id.is_some() {
            self.event_type_id = request.event_type_id;
        }
        if request.category_id.is_some() {
            self.category_id = request.category_id;
        }
    }
}

/// An event together with the labels of the rows it references.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub event: Event,
    pub type_label: Option<String>,
    pub category_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[validate(
        custom(function = "not_blank", message = "Event name is required"),
        length(max = 255, message = "Event name cannot exceed 255 characters")
    )]
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(
        custom(function = "not_blank", message = "Location is required"),
        length(max = 255)
    )]
    pub location: String,
    #[validate(length(max = 255))]
    pub full_address: Option<String>,
    #[validate(length(max = 512))]
    pub image_url: Option<String>,
    pub event_type_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
}

impl EventRequest {
    pub fn check_date_order(&self) -> AppResult<()> {
        if self.end_date < self.start_date {
            return Err(AppError::ValidationError(
                "End date must not be before start date".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub full_address: Option<String>,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub event_type_id: Option<Uuid>,
    pub type_label: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_label: Option<String>,
    pub creator_id: Uuid,
    pub creation_date: NaiveDate,
}

impl From<EventRecord> for EventResponse {
    fn from(record: EventRecord) -> Self {
        let EventRecord {
            event,
            type_label,
            category_label,
        } = record;

        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            location: event.location,
            full_address: event.full_address,
            image_url: event.image_url,
            status: event.status,
            event_type_id: event.event_type_id,
            type_label,
            category_id: event.category_id,
            category_label,
            creator_id: event.creator_id,
            creation_date: event.creation_date,
        }
    }
}

/// Combined "availability" search. Only active events ever match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSearch {
    pub search: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<Uuid>,
}

impl EventSearch {
    /// Blank strings behave like absent ones.
    pub fn normalized(self) -> Self {
        Self {
            search: non_blank(self.search),
            location: non_blank(self.location),
            category_id: self.category_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Case-insensitive substring test shared by the in-memory filters.
///
/// Uses Unicode lowercasing. PostgreSQL's `lower()` follows the database
/// collation, so non-ASCII keywords may match differently between the two
/// stores; ASCII input behaves the same.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Event {
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        contains_ignore_case(&self.name, keyword)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, keyword))
    }

    pub fn matches_search(&self, search: &EventSearch) -> bool {
        if self.status != EventStatus::Active {
            return false;
        }
        if let Some(keyword) = &search.search {
            if !self.matches_keyword(keyword) {
                return false;
            }
        }
        if let Some(location) = &search.location {
            let at = self.location.as_deref().unwrap_or_default();
            if !contains_ignore_case(at, location) {
                return false;
            }
        }
        if let Some(category_id) = search.category_id {
            if self.category_id != Some(category_id) {
                return false;
            }
        }
        true
    }
}
