//! Query-shaping options and the shared configuration base.
//!
//! `QueryOptions` is the option bag both query types own, seeded by a
//! defensive clone of the repository defaults. Field selection accumulates
//! by union; populate and sort replace wholesale; a patch merges field-wise
//! and a reset clears the entire bag.

use std::collections::BTreeSet;

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::driver::{Populate, TransformOptions};
use crate::pagination::PageConfig;

/// How raw driver documents become results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Serialization {
    /// Transform to a plain document with driver defaults.
    #[default]
    Transform,
    /// Transform with explicit options.
    TransformWith(TransformOptions),
    /// Skip the transform and return the live document handle.
    Live,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub select: BTreeSet<String>,
    pub populate: Option<Vec<Populate>>,
    pub sort: Option<Bson>,
    #[serde(default)]
    pub serialization: Serialization,
    pub pagination: Option<PageConfig>,
}

/// Field-wise patch for `QueryOptions`; absent fields leave the bag alone,
/// present fields overwrite (no deep merge).
#[derive(Debug, Clone, Default)]
pub struct OptionsPatch {
    pub select: Option<Vec<String>>,
    pub populate: Option<Vec<Populate>>,
    pub sort: Option<Bson>,
    pub serialization: Option<Serialization>,
    pub pagination: Option<PageConfig>,
}

impl QueryOptions {
    pub fn apply(&mut self, patch: OptionsPatch) {
        if let Some(fields) = patch.select {
            self.select = fields.into_iter().collect();
        }
        if let Some(populate) = patch.populate {
            self.populate = Some(populate);
        }
        if let Some(sort) = patch.sort {
            self.sort = Some(sort);
        }
        if let Some(serialization) = patch.serialization {
            self.serialization = serialization;
        }
        if let Some(pagination) = patch.pagination {
            self.pagination = Some(pagination);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Selected fields in a driver-friendly shape.
    #[must_use]
    pub fn select_vec(&self) -> Vec<String> {
        self.select.iter().cloned().collect()
    }
}

/// One field name or many; mirrors the select surface accepting either.
pub trait IntoFields {
    fn into_fields(self) -> Vec<String>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoFields for Vec<String> {
    fn into_fields(self) -> Vec<String> {
        self
    }
}

impl IntoFields for Vec<&str> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoFields for [&str; N] {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

/// One populate directive or many; a bare path is shorthand for a directive
/// with no field restriction.
pub trait IntoPopulates {
    fn into_populates(self) -> Vec<Populate>;
}

impl IntoPopulates for Populate {
    fn into_populates(self) -> Vec<Populate> {
        vec![self]
    }
}

impl IntoPopulates for Vec<Populate> {
    fn into_populates(self) -> Vec<Populate> {
        self
    }
}

impl IntoPopulates for &str {
    fn into_populates(self) -> Vec<Populate> {
        vec![Populate::path(self)]
    }
}

/// Shared configuration base for both query types: chained mutators over the
/// owned option bag. Pure in-memory mutation, no error conditions.
pub trait Configure {
    fn options_mut(&mut self) -> &mut QueryOptions;

    /// Field-wise merge of a patch into the bag.
    fn options(&mut self, patch: OptionsPatch) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().apply(patch);
        self
    }

    /// Clears the entire bag back to defaults.
    fn reset_options(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().reset();
        self
    }

    /// Unions field names into the selected set. Idempotent under repeated
    /// identical calls; never removes fields.
    fn select<F: IntoFields>(&mut self, fields: F) -> &mut Self
    where
        Self: Sized,
    {
        let options = self.options_mut();
        for field in fields.into_fields() {
            options.select.insert(field);
        }
        self
    }

    /// Replaces the populate directives wholesale; last call wins.
    fn populate<P: IntoPopulates>(&mut self, specs: P) -> &mut Self
    where
        Self: Sized,
    {
        self.options_mut().populate = Some(specs.into_populates());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Holder {
        options: QueryOptions,
    }

    impl Configure for Holder {
        fn options_mut(&mut self) -> &mut QueryOptions {
            &mut self.options
        }
    }

    #[test]
    fn select_unions_and_dedups() {
        let mut h = Holder { options: QueryOptions::default() };
        h.select("a").select(["b", "a"]);
        assert_eq!(h.options.select_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn populate_replaces() {
        let mut h = Holder { options: QueryOptions::default() };
        h.populate("author").populate("comments");
        assert_eq!(h.options.populate, Some(vec![Populate::path("comments")]));
    }

    #[test]
    fn patch_overwrites_present_fields_only() {
        let mut h = Holder { options: QueryOptions::default() };
        h.select("a");
        h.options(OptionsPatch { sort: Some(Bson::String("name".into())), ..OptionsPatch::default() });
        assert_eq!(h.options.sort, Some(Bson::String("name".into())));
        assert!(h.options.select.contains("a"));
        // A present select patch replaces the set, it does not union.
        h.options(OptionsPatch { select: Some(vec!["b".into()]), ..OptionsPatch::default() });
        assert_eq!(h.options.select_vec(), vec!["b".to_string()]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut h = Holder { options: QueryOptions::default() };
        h.select("a")
            .populate("author")
            .options(OptionsPatch {
                sort: Some(Bson::String("name".into())),
                serialization: Some(Serialization::Live),
                pagination: Some(PageConfig { limit: Some(5), max_limit: None }),
                ..OptionsPatch::default()
            });
        h.reset_options();
        assert_eq!(h.options, QueryOptions::default());
    }
}
