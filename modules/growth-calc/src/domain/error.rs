use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// `InvalidBase` and `InvalidExponent` are client-caused and reported
/// before any record is created. `Storage` is a run failure surfaced
/// after a record exists.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Base must be positive (got {base})")]
    InvalidBase { base: f64 },

    #[error("Exponent must be between 1 and 100 (got {exponent})")]
    InvalidExponent { exponent: i32 },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn invalid_base(base: f64) -> Self {
        Self::InvalidBase { base }
    }

    pub fn invalid_exponent(exponent: i32) -> Self {
        Self::InvalidExponent { exponent }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for errors caused by bad input rather than by this service.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidBase { .. } | Self::InvalidExponent { .. })
    }
}
