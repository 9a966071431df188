pub mod catalog;
pub mod events;
pub mod favorites;

pub use catalog::CatalogService;
pub use events::EventService;
pub use favorites::FavoriteService;
