pub mod driver;
pub mod envelope;
pub mod errors;
pub mod logger;
pub mod options;
pub mod pagination;
pub mod query;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::sync::Arc;

use bson::{Bson, Document};

use crate::driver::Datastore;
use crate::options::QueryOptions;
use crate::query::{CollectionQuery, EntityQuery};

pub use crate::envelope::DataResult;
pub use crate::errors::RepoError;

/// Repository façade bound to one entity collection.
///
/// Long-lived; each finder constructs a short-lived query seeded with a
/// defensive clone of the defaults, so query-side mutation never reaches the
/// repository or any sibling query. The model handle is the only state
/// shared between queries.
pub struct Repository<D: Datastore> {
    model: Arc<D>,
    options: QueryOptions,
}

impl<D: Datastore> Repository<D> {
    #[must_use]
    pub fn new(model: Arc<D>) -> Self {
        Self::with_defaults(model, QueryOptions::default())
    }

    #[must_use]
    pub fn with_defaults(model: Arc<D>, options: QueryOptions) -> Self {
        Self { model, options }
    }

    #[must_use]
    pub fn model(&self) -> &Arc<D> {
        &self.model
    }

    /// Clone of the default options, for seeding queries.
    #[must_use]
    pub fn options(&self) -> QueryOptions {
        self.options.clone()
    }

    /// A collection query against the given filter.
    #[must_use]
    pub fn find(&self, filter: Document) -> CollectionQuery<D> {
        CollectionQuery::new(filter, self.model.clone(), self.options())
    }

    /// A collection query over the whole collection.
    #[must_use]
    pub fn find_all(&self) -> CollectionQuery<D> {
        self.find(Document::new())
    }

    /// A single-entity lookup against the given filter.
    #[must_use]
    pub fn find_one(&self, filter: Document) -> EntityQuery<D> {
        EntityQuery::with_filter(filter, self.model.clone(), self.options())
    }

    /// A single-entity lookup by identifier.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> EntityQuery<D> {
        EntityQuery::with_id(id, self.model.clone(), self.options())
    }

    /// True iff the value is a string of exactly 24 hex digits
    /// (case-insensitive). Any non-string value is false; never fails.
    #[must_use]
    pub fn is_valid_object_id(value: impl Into<Bson>) -> bool {
        match value.into() {
            Bson::String(s) => s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit()),
            _ => false,
        }
    }
}
