// Submodules for separation of concerns
mod collection;
mod entity;
mod types;

// Public API re-exports
pub use collection::{CollectionQuery, UrlQuery};
pub use entity::EntityQuery;
pub use types::Fetched;
