use std::sync::Arc;

use bson::{Bson, Document};
use serde::Deserialize;

use crate::driver::{Datastore, DocumentLike, PendingFind};
use crate::envelope::DataResult;
use crate::errors::RepoError;
use crate::options::{Configure, QueryOptions, Serialization};
use crate::pagination::{DEFAULT_MAX_LIMIT, PageUpdate, Paginator};

use super::types::Fetched;

/// URL-style query parameters. The only boundary where string-typed numeric
/// input is coerced; unparseable input fails with a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// A multi-result query against one filter.
///
/// Built by [`Repository::find`](crate::Repository::find), configured through
/// chained mutators, then executed. Execution is two-phase: a count against
/// the current filter seeds the paginator, and a zero total short-circuits
/// before any sort/select/populate work is done. Re-executing restarts from
/// the count with the current filter and options.
pub struct CollectionQuery<D: Datastore> {
    model: Arc<D>,
    filter: Document,
    options: QueryOptions,
    paginator: Paginator,
}

impl<D: Datastore> Configure for CollectionQuery<D> {
    fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }
}

impl<D: Datastore> CollectionQuery<D> {
    #[must_use]
    pub fn new(filter: Document, model: Arc<D>, options: QueryOptions) -> Self {
        let paginator = Paginator::new(options.pagination.as_ref(), DEFAULT_MAX_LIMIT);
        Self { model, filter, options, paginator }
    }

    /// Shallow-merges keys into the filter; colliding keys overwrite.
    pub fn filter(&mut self, patch: Document) -> &mut Self {
        for (key, value) in patch {
            self.filter.insert(key, value);
        }
        self
    }

    /// Resets the filter to the empty predicate.
    pub fn clear_filter(&mut self) -> &mut Self {
        self.filter = Document::new();
        self
    }

    /// Stores the sort descriptor verbatim; opaque to this layer.
    pub fn sort(&mut self, spec: impl Into<Bson>) -> &mut Self {
        self.options.sort = Some(spec.into());
        self
    }

    /// Applies URL parameters: pagination first, so a failing parse returns
    /// before the sort is touched.
    pub fn set_url_query(&mut self, args: &UrlQuery) -> Result<&mut Self, RepoError> {
        self.paginator.set_url(args.page.as_deref(), args.limit.as_deref())?;
        if let Some(sort) = &args.sort {
            self.sort(sort.as_str());
        }
        Ok(self)
    }

    #[must_use]
    pub const fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Best-effort query shaping in fixed order: sort, skip/limit, select,
    /// populate. Failures are collected, not propagated; the query runs with
    /// whatever configuration succeeded.
    fn pre_exec(&self, pending: &mut D::Find) -> Vec<RepoError> {
        let mut diagnostics = Vec::new();

        if let Some(sort) = &self.options.sort
            && let Err(err) = pending.sort(sort)
        {
            diagnostics.push(err);
        }

        if let Err(err) = pending.skip(self.paginator.skip()) {
            diagnostics.push(err);
        }
        if let Err(err) = pending.limit(self.paginator.limit()) {
            diagnostics.push(err);
        }

        if !self.options.select.is_empty()
            && let Err(err) = pending.select(&self.options.select_vec())
        {
            diagnostics.push(err);
        }

        if let Some(populate) = &self.options.populate
            && let Err(err) = pending.populate(populate)
        {
            diagnostics.push(err);
        }

        diagnostics
    }

    /// Executes the query: count, short-circuit on zero, shape, fetch,
    /// transform. Count, fetch, and transform errors propagate.
    pub async fn exec(&mut self) -> Result<Vec<Fetched<D::Doc>>, RepoError> {
        let total = self.model.count(&self.filter).await?;
        self.paginator.set(PageUpdate { total: Some(total), ..PageUpdate::default() });

        // Zero-result filters never pay for sort/select/populate setup.
        if total == 0 {
            return Ok(Vec::new());
        }

        let mut pending = self.model.find(&self.filter);
        for err in self.pre_exec(&mut pending) {
            log::warn!("query configuration skipped: {err}");
        }

        let docs = pending.exec().await?;
        match &self.options.serialization {
            Serialization::Live => Ok(docs.into_iter().map(Fetched::Live).collect()),
            Serialization::Transform => {
                docs.into_iter().map(|d| d.to_object(None).map(Fetched::Plain)).collect()
            }
            Serialization::TransformWith(opts) => {
                docs.into_iter().map(|d| d.to_object(Some(opts)).map(Fetched::Plain)).collect()
            }
        }
    }

    /// Executes and wraps the outcome in a result envelope. Never fails:
    /// any `exec` error resolves to a 500 `server` envelope.
    pub async fn data_result(&mut self) -> DataResult<Vec<Fetched<D::Doc>>> {
        match self.exec().await {
            Ok(data) => {
                let mut result = DataResult::new();
                result.set_data(data);
                result.info.pagination = Some(self.paginator.to_object());
                result
            }
            Err(err) => DataResult::server_error(err.to_string()),
        }
    }
}
