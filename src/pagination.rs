//! Offset/limit pagination math.
//!
//! One `Paginator` lives inside each collection query. The requested limit is
//! clamped to a maximum fixed at construction, `total` is written once per
//! execution after the count query resolves, and `to_object` serializes the
//! state for the result envelope.

use serde::{Deserialize, Serialize};

use crate::errors::RepoError;

/// Upper bound for the page size when the query options specify none.
pub const DEFAULT_MAX_LIMIT: u64 = 100;

/// Pagination seed carried in the query options; consumed once at query
/// construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    pub limit: Option<u64>,
    pub max_limit: Option<u64>,
}

/// Partial update for `Paginator::set`; absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageUpdate {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub total: Option<u64>,
}

/// Serialized pagination state carried in `info.pagination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: u64,
    limit: u64,
    max_limit: u64,
    total: u64,
}

impl Paginator {
    /// `max_limit` comes from the config when present, else the supplied
    /// default; the initial limit defaults to `max_limit` and is clamped.
    #[must_use]
    pub fn new(config: Option<&PageConfig>, default_max_limit: u64) -> Self {
        let max_limit = config.and_then(|c| c.max_limit).unwrap_or(default_max_limit).max(1);
        let limit = config.and_then(|c| c.limit).unwrap_or(max_limit).clamp(1, max_limit);
        Self { page: 1, limit, max_limit, total: 0 }
    }

    /// Updates any subset of fields. `limit` is re-clamped to
    /// `[1, max_limit]`, `page` is coerced to at least 1, `total`
    /// overwrites (last write wins).
    pub fn set(&mut self, upd: PageUpdate) -> &mut Self {
        if let Some(page) = upd.page {
            self.page = page.max(1);
        }
        if let Some(limit) = upd.limit {
            self.limit = limit.clamp(1, self.max_limit);
        }
        if let Some(total) = upd.total {
            self.total = total;
        }
        self
    }

    /// Applies URL-style string input. Unparseable numeric input fails with
    /// a validation error before any field is touched.
    pub fn set_url(
        &mut self,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<&mut Self, RepoError> {
        let page = page.map(|raw| parse_positive("page", raw)).transpose()?;
        let limit = limit.map(|raw| parse_positive("limit", raw)).transpose()?;
        Ok(self.set(PageUpdate { page, limit, total: None }))
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn max_limit(&self) -> u64 {
        self.max_limit
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Documents to skip: `(page - 1) * limit`, saturating so an extreme
    /// page number from URL input cannot overflow.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `pages = ceil(total / limit)`, and 0 when there is nothing to page.
    #[must_use]
    pub fn to_object(&self) -> PageInfo {
        let pages = if self.total == 0 || self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        };
        PageInfo { page: self.page, limit: self.limit, total: self.total, pages }
    }
}

fn parse_positive(field: &'static str, raw: &str) -> Result<u64, RepoError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RepoError::Validation(format!("{field} must be a positive integer, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 100);
        assert_eq!(p.skip(), 0);
        assert_eq!(p.to_object(), PageInfo { page: 1, limit: 100, total: 0, pages: 0 });
    }

    #[test]
    fn limit_clamped_to_max() {
        let cfg = PageConfig { limit: Some(500), max_limit: Some(50) };
        let mut p = Paginator::new(Some(&cfg), DEFAULT_MAX_LIMIT);
        assert_eq!(p.limit(), 50);
        p.set(PageUpdate { limit: Some(0), ..PageUpdate::default() });
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn skip_math() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        p.set(PageUpdate { page: Some(3), limit: Some(20), ..PageUpdate::default() });
        assert_eq!(p.skip(), 40);
    }

    #[test]
    fn page_below_one_coerced() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        p.set(PageUpdate { page: Some(0), ..PageUpdate::default() });
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn url_input_rejects_junk() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        let err = p.set_url(Some("abc"), None).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        // Nothing applied when either field fails to parse.
        let err = p.set_url(Some("2"), Some("x")).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 100);
        p.set_url(Some("2"), Some("10")).unwrap();
        assert_eq!(p.page(), 2);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn skip_saturates_on_extreme_page() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        p.set_url(Some("18446744073709551615"), Some("100")).unwrap();
        assert_eq!(p.page(), u64::MAX);
        assert_eq!(p.skip(), u64::MAX);
    }

    #[test]
    fn total_last_write_wins() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        p.set(PageUpdate { total: Some(7), ..PageUpdate::default() });
        p.set(PageUpdate { total: Some(3), ..PageUpdate::default() });
        assert_eq!(p.total(), 3);
    }

    #[test]
    fn pages_is_ceiling() {
        let mut p = Paginator::new(None, DEFAULT_MAX_LIMIT);
        p.set(PageUpdate { total: Some(101), ..PageUpdate::default() });
        assert_eq!(p.to_object().pages, 2);
        p.set(PageUpdate { total: Some(3), ..PageUpdate::default() });
        assert_eq!(p.to_object().pages, 1);
    }
}
