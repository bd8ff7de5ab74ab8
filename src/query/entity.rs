use std::sync::Arc;

use bson::Document;

use crate::driver::{Datastore, DocumentLike, PendingLookup};
use crate::envelope::DataResult;
use crate::errors::RepoError;
use crate::options::{Configure, QueryOptions, Serialization};

use super::types::{Fetched, Lookup};

/// A single-result lookup bound to an identifier or ad-hoc filter.
///
/// Unlike [`CollectionQuery`](super::CollectionQuery), configuration-apply
/// errors propagate here, and the transform is opt-in: only
/// `Serialization::TransformWith` produces a plain document; everything else
/// returns the live handle.
pub struct EntityQuery<D: Datastore> {
    model: Arc<D>,
    lookup: Lookup,
    options: QueryOptions,
}

impl<D: Datastore> Configure for EntityQuery<D> {
    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }
}

impl<D: Datastore> EntityQuery<D> {
    #[must_use]
    pub fn with_filter(filter: Document, model: Arc<D>, options: QueryOptions) -> Self {
        Self { model, lookup: Lookup::Filter(filter), options }
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, model: Arc<D>, options: QueryOptions) -> Self {
        Self { model, lookup: Lookup::Id(id.into()), options }
    }

    /// Executes the lookup. Absence is the `None` case, not an error.
    pub async fn exec(&mut self) -> Result<Option<Fetched<D::Doc>>, RepoError> {
        let mut pending = match &self.lookup {
            Lookup::Filter(filter) => self.model.find_one(filter),
            Lookup::Id(id) => self.model.find_by_id(id),
        };

        if !self.options.select.is_empty() {
            pending.select(&self.options.select_vec())?;
        }
        if let Some(populate) = &self.options.populate {
            pending.populate(populate)?;
        }

        let doc = pending.exec().await?;
        match (doc, &self.options.serialization) {
            (Some(d), Serialization::TransformWith(opts)) => {
                Ok(Some(Fetched::Plain(d.to_object(Some(opts))?)))
            }
            (Some(d), _) => Ok(Some(Fetched::Live(d))),
            (None, _) => Ok(None),
        }
    }

    /// Executes and wraps the outcome in a result envelope. A miss resolves
    /// to a 404 `not_found` envelope with `data: null`; a failure to a 500
    /// `server` envelope. Never fails.
    pub async fn data_result(&mut self) -> DataResult<Fetched<D::Doc>> {
        match self.exec().await {
            Ok(Some(doc)) => {
                let mut result = DataResult::new();
                result.set_data(doc);
                result
            }
            Ok(None) => DataResult::not_found(),
            Err(err) => DataResult::server_error(err.to_string()),
        }
    }
}
