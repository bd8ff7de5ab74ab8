use bson::Document;
use serde::Serialize;

/// An executed result: either a plain document produced by the driver
/// transform or the live handle when the transform was skipped. Serializes
/// untagged so both shapes flow into the result envelope unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fetched<H> {
    Plain(Document),
    Live(H),
}

impl<H> Fetched<H> {
    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Plain(doc) => Some(doc),
            Self::Live(_) => None,
        }
    }

    #[must_use]
    pub const fn as_live(&self) -> Option<&H> {
        match self {
            Self::Plain(_) => None,
            Self::Live(handle) => Some(handle),
        }
    }

    #[must_use]
    pub const fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }
}

/// What a single-entity query is bound to at construction.
#[derive(Debug, Clone)]
pub(crate) enum Lookup {
    Filter(Document),
    Id(String),
}
