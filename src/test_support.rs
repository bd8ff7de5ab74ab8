//! In-memory datastore for tests.
//!
//! Implements the full [`Datastore`](crate::driver::Datastore) contract over
//! a vector of BSON documents: equality filter matching, sort, skip/limit,
//! projection. Every configuration call is recorded in a log the tests can
//! inspect, and failures can be injected per stage.

use std::cmp::Ordering;
use std::sync::Arc;

use bson::{Bson, Document};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::driver::{Datastore, DocumentLike, PendingFind, PendingLookup, Populate, TransformOptions};
use crate::errors::RepoError;

/// A raw document as the in-memory driver hands it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemDoc {
    pub data: Document,
}

impl DocumentLike for MemDoc {
    fn to_object(&self, opts: Option<&TransformOptions>) -> Result<Document, RepoError> {
        let _ = opts;
        Ok(self.data.clone())
    }
}

/// Injectable failures, keyed by stage name.
#[derive(Debug, Default)]
pub struct FailurePlan {
    pub count: Option<String>,
    pub exec: Option<String>,
    pub sort: Option<String>,
    pub select: Option<String>,
}

#[derive(Debug, Default)]
struct MemInner {
    docs: RwLock<Vec<Document>>,
    failures: RwLock<FailurePlan>,
    log: Mutex<Vec<String>>,
}

impl MemInner {
    fn record(&self, entry: impl Into<String>) {
        self.log.lock().push(entry.into());
    }

    fn matching(&self, filter: &Document) -> Vec<Document> {
        self.docs.read().iter().filter(|d| matches(d, filter)).cloned().collect()
    }
}

pub struct MemStore {
    inner: Arc<MemInner>,
}

impl MemStore {
    #[must_use]
    pub fn new(docs: Vec<Document>) -> Arc<Self> {
        let inner = MemInner { docs: RwLock::new(docs), ..MemInner::default() };
        Arc::new(Self { inner: Arc::new(inner) })
    }

    pub fn insert(&self, doc: Document) {
        self.inner.docs.write().push(doc);
    }

    /// Configuration and execution calls recorded so far, in order.
    #[must_use]
    pub fn config_log(&self) -> Vec<String> {
        self.inner.log.lock().clone()
    }

    pub fn fail_count(&self, message: &str) {
        self.inner.failures.write().count = Some(message.to_string());
    }

    pub fn fail_exec(&self, message: &str) {
        self.inner.failures.write().exec = Some(message.to_string());
    }

    pub fn fail_sort(&self, message: &str) {
        self.inner.failures.write().sort = Some(message.to_string());
    }

    pub fn fail_select(&self, message: &str) {
        self.inner.failures.write().select = Some(message.to_string());
    }
}

/// Equality-subset matching: every filter key must equal the document value.
fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::Int32(x)), Some(Bson::Int32(y))) => x.cmp(y),
        (Some(Bson::Int64(x)), Some(Bson::Int64(y))) => x.cmp(y),
        (Some(Bson::Double(x)), Some(Bson::Double(y))) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Sort descriptors understood by the mock: a field name (`"age"`), a
/// `-`-prefixed field name for descending, or a `{field: 1|-1}` document.
fn sort_docs(docs: &mut [Document], spec: &Bson) {
    let (field, descending) = match spec {
        Bson::String(s) => match s.strip_prefix('-') {
            Some(rest) => (rest.to_string(), true),
            None => (s.clone(), false),
        },
        Bson::Document(d) => match d.iter().next() {
            Some((k, v)) => (k.clone(), matches!(v, Bson::Int32(-1) | Bson::Int64(-1))),
            None => return,
        },
        _ => return,
    };
    docs.sort_by(|a, b| {
        let ord = compare_values(a.get(&field), b.get(&field));
        if descending { ord.reverse() } else { ord }
    });
}

/// Keeps the selected fields plus `_id`.
fn project_fields(doc: &Document, fields: &[String]) -> Document {
    let mut out = Document::new();
    for (key, value) in doc {
        if key == "_id" || fields.iter().any(|f| f == key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

pub struct MemFind {
    inner: Arc<MemInner>,
    filter: Document,
    sort: Option<Bson>,
    skip: u64,
    limit: Option<u64>,
    select: Option<Vec<String>>,
}

impl PendingFind for MemFind {
    type Doc = MemDoc;

    fn sort(&mut self, spec: &Bson) -> Result<(), RepoError> {
        self.inner.record("sort");
        if let Some(message) = self.inner.failures.read().sort.clone() {
            return Err(RepoError::ConfigApply { stage: "sort", message });
        }
        self.sort = Some(spec.clone());
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<(), RepoError> {
        self.inner.record(format!("skip {n}"));
        self.skip = n;
        Ok(())
    }

    fn limit(&mut self, n: u64) -> Result<(), RepoError> {
        self.inner.record(format!("limit {n}"));
        self.limit = Some(n);
        Ok(())
    }

    fn select(&mut self, fields: &[String]) -> Result<(), RepoError> {
        self.inner.record("select");
        if let Some(message) = self.inner.failures.read().select.clone() {
            return Err(RepoError::ConfigApply { stage: "select", message });
        }
        self.select = Some(fields.to_vec());
        Ok(())
    }

    fn populate(&mut self, specs: &[Populate]) -> Result<(), RepoError> {
        self.inner.record(format!("populate {}", specs.len()));
        Ok(())
    }

    async fn exec(self) -> Result<Vec<MemDoc>, RepoError> {
        self.inner.record("exec");
        if let Some(message) = self.inner.failures.read().exec.clone() {
            return Err(RepoError::Driver(message));
        }
        let mut docs = self.inner.matching(&self.filter);
        if let Some(spec) = &self.sort {
            sort_docs(&mut docs, spec);
        }
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = self.limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        let end = skip.saturating_add(limit).min(docs.len());
        let mut docs = if skip >= docs.len() { Vec::new() } else { docs[skip..end].to_vec() };
        if let Some(fields) = &self.select {
            for doc in &mut docs {
                *doc = project_fields(doc, fields);
            }
        }
        Ok(docs.into_iter().map(|data| MemDoc { data }).collect())
    }
}

pub struct MemLookup {
    inner: Arc<MemInner>,
    filter: Document,
    select: Option<Vec<String>>,
}

impl PendingLookup for MemLookup {
    type Doc = MemDoc;

    fn select(&mut self, fields: &[String]) -> Result<(), RepoError> {
        self.inner.record("select");
        if let Some(message) = self.inner.failures.read().select.clone() {
            return Err(RepoError::ConfigApply { stage: "select", message });
        }
        self.select = Some(fields.to_vec());
        Ok(())
    }

    fn populate(&mut self, specs: &[Populate]) -> Result<(), RepoError> {
        self.inner.record(format!("populate {}", specs.len()));
        Ok(())
    }

    async fn exec(self) -> Result<Option<MemDoc>, RepoError> {
        self.inner.record("exec");
        if let Some(message) = self.inner.failures.read().exec.clone() {
            return Err(RepoError::Driver(message));
        }
        let mut doc = match self.inner.matching(&self.filter).into_iter().next() {
            Some(doc) => doc,
            None => return Ok(None),
        };
        if let Some(fields) = &self.select {
            doc = project_fields(&doc, fields);
        }
        Ok(Some(MemDoc { data: doc }))
    }
}

impl Datastore for MemStore {
    type Doc = MemDoc;
    type Find = MemFind;
    type Lookup = MemLookup;

    async fn count(&self, filter: &Document) -> Result<u64, RepoError> {
        if let Some(message) = self.inner.failures.read().count.clone() {
            return Err(RepoError::Driver(message));
        }
        Ok(self.inner.matching(filter).len() as u64)
    }

    fn find(&self, filter: &Document) -> MemFind {
        MemFind {
            inner: self.inner.clone(),
            filter: filter.clone(),
            sort: None,
            skip: 0,
            limit: None,
            select: None,
        }
    }

    fn find_one(&self, filter: &Document) -> MemLookup {
        MemLookup { inner: self.inner.clone(), filter: filter.clone(), select: None }
    }

    fn find_by_id(&self, id: &str) -> MemLookup {
        let mut filter = Document::new();
        filter.insert("_id", id);
        MemLookup { inner: self.inner.clone(), filter, select: None }
    }
}
