use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;

/// The two reference vocabularies an event can point at. Both share the
/// same shape: an id and a unique label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    EventType,
    EventCategory,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::EventType => "event_type",
            CatalogKind::EventCategory => "event_category",
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            CatalogKind::EventType => "Event type",
            CatalogKind::EventCategory => "Event category",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LabelRequest {
    #[validate(
        custom(function = "not_blank", message = "Label is required"),
        length(max = 255)
    )]
    pub label: String,
}

impl LabelRequest {
    pub fn trimmed_label(&self) -> String {
        self.label.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_request_validation() {
        let ok = LabelRequest {
            label: "Concert".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = LabelRequest {
            label: " ".to_string(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_trimmed_label() {
        let req = LabelRequest {
            label: "  Music ".to_string(),
        };
        assert_eq!(req.trimmed_label(), "Music");
    }
}
