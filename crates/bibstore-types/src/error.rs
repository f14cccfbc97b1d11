use thiserror::Error;

/// Errors produced by domain type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid citation key {key:?}: {reason}")]
    InvalidCitationKey { key: String, reason: String },

    #[error("invalid entry type {0:?}: must be non-empty ASCII alphanumerics")]
    InvalidEntryType(String),

    #[error("duplicate citation key: {0}")]
    DuplicateKey(String),

    #[error("invalid field: {0}")]
    InvalidField(String),
}
