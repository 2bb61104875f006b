//! Shared primitives for all Rust crates in Auditwatch.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Auditwatch crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Settings or rule configuration cannot be used. Raised before any fetch.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The audit source could not deliver records (transport, auth, rate limit).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// One or more alert deliveries failed.
    #[error("notification error: {0}")]
    Notification(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
