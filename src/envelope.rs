//! Uniform result envelope.
//!
//! Callers using the envelope path never branch on error-vs-success
//! separately from branching on `status`: every outcome, including driver
//! failures and single-entity misses, resolves to a populated `DataResult`.

use serde::Serialize;

use crate::pagination::PageInfo;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorItem {
    pub code: String,
    pub text: String,
}

impl ErrorItem {
    #[must_use]
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self { code: code.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultInfo {
    pub pagination: Option<PageInfo>,
}

/// Result envelope. `data` serializes as an explicit `null` when absent;
/// a 404 envelope carries `data: null`, never an omitted field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResult<T> {
    pub status: u16,
    pub message: String,
    pub errors: Vec<ErrorItem>,
    pub data: Option<T>,
    pub info: ResultInfo,
}

impl<T> DataResult<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: STATUS_OK,
            message: "OK".to_string(),
            errors: Vec::new(),
            data: None,
            info: ResultInfo::default(),
        }
    }

    /// A 404 envelope for a single-entity miss. Not an error at the raw
    /// query layer; a normal outcome here.
    #[must_use]
    pub fn not_found() -> Self {
        let mut result = Self::new();
        result.status = STATUS_NOT_FOUND;
        result.message = "Not Found".to_string();
        result.errors.push(ErrorItem::new("not_found", "Resource not found"));
        result
    }

    /// A 500 envelope carrying a failure's message.
    #[must_use]
    pub fn server_error(text: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.status = STATUS_SERVER_ERROR;
        result.message = "Server Error".to_string();
        result.errors.push(ErrorItem::new("server", text));
        result
    }

    pub fn set_data(&mut self, value: T) {
        self.data = Some(value);
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status < 400
    }
}

impl<T> Default for DataResult<T> {
    fn default() -> Self {
        Self::new()
    }
}
