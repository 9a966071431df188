pub mod catalog;
pub mod event;
pub mod favorite;

pub use catalog::{CatalogEntry, CatalogKind, LabelRequest};
pub use event::{
    Event, EventRecord, EventRequest, EventResponse, EventSearch, EventStatus, KeywordQuery,
    StatusQuery,
};
pub use favorite::{Favorite, FavoriteAdded, FavoriteRequest};

use std::borrow::Cow;
use validator::ValidationError;

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::from("must not be blank")));
    }
    Ok(())
}
