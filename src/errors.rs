use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Failed to apply {stage}: {message}")]
    ConfigApply { stage: &'static str, message: String },
}

impl RepoError {
    /// True for errors raised while shaping a pending query (sort, skip,
    /// limit, select, populate). Collection queries log and swallow these.
    #[must_use]
    pub const fn is_config_apply(&self) -> bool {
        matches!(self, Self::ConfigApply { .. })
    }
}
