//! Datastore contract.
//!
//! The underlying document-database driver is an external collaborator. This
//! module is the trait seam the query layer talks through: a queryable handle
//! (`Datastore`), pending query builders (`PendingFind`, `PendingLookup`),
//! and the driver-owned document-to-plain-value transform (`DocumentLike`).

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::errors::RepoError;

/// Relation-expansion directive: resolve a referenced relation into its
/// target document inline, optionally restricting the target's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Populate {
    pub path: String,
    pub select: Option<Vec<String>>,
}

impl Populate {
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self { path: path.into(), select: None }
    }

    #[must_use]
    pub fn with_select(mut self, fields: Vec<String>) -> Self {
        self.select = Some(fields);
        self
    }
}

/// Options forwarded to the driver's document transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    #[serde(default)]
    pub virtuals: bool,
    #[serde(default)]
    pub getters: bool,
    #[serde(default)]
    pub flatten_object_ids: bool,
}

/// A raw (live) document handle as the driver hands it back.
pub trait DocumentLike: Clone + Serialize + Send + Sync {
    /// Transforms the live handle into a plain BSON document.
    fn to_object(&self, opts: Option<&TransformOptions>) -> Result<Document, RepoError>;
}

/// A multi-result query pending execution. Configuration methods are
/// fallible so the query layer can degrade gracefully when one fails.
#[allow(async_fn_in_trait)]
pub trait PendingFind {
    type Doc: DocumentLike;

    fn sort(&mut self, spec: &Bson) -> Result<(), RepoError>;
    fn skip(&mut self, n: u64) -> Result<(), RepoError>;
    fn limit(&mut self, n: u64) -> Result<(), RepoError>;
    fn select(&mut self, fields: &[String]) -> Result<(), RepoError>;
    fn populate(&mut self, specs: &[Populate]) -> Result<(), RepoError>;

    async fn exec(self) -> Result<Vec<Self::Doc>, RepoError>;
}

/// A single-result lookup pending execution.
#[allow(async_fn_in_trait)]
pub trait PendingLookup {
    type Doc: DocumentLike;

    fn select(&mut self, fields: &[String]) -> Result<(), RepoError>;
    fn populate(&mut self, specs: &[Populate]) -> Result<(), RepoError>;

    async fn exec(self) -> Result<Option<Self::Doc>, RepoError>;
}

/// The queryable handle one repository is bound to. Filters are opaque
/// externally-defined predicates; this layer never interprets them.
#[allow(async_fn_in_trait)]
pub trait Datastore {
    type Doc: DocumentLike;
    type Find: PendingFind<Doc = Self::Doc>;
    type Lookup: PendingLookup<Doc = Self::Doc>;

    async fn count(&self, filter: &Document) -> Result<u64, RepoError>;
    fn find(&self, filter: &Document) -> Self::Find;
    fn find_one(&self, filter: &Document) -> Self::Lookup;
    fn find_by_id(&self, id: &str) -> Self::Lookup;
}
