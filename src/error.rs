//! Error types for metatype extraction
//!
//! The extraction engine itself never fails: problems found while reading a
//! type graph are delivered to a [`Reporter`](crate::diagnostics::Reporter).
//! These errors cover everything around it (loading descriptors, configuration).

use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, MetatypeError>;

/// Errors raised outside of the extraction engine
#[derive(Error, Debug)]
pub enum MetatypeError {
    #[error("Type descriptor already registered: {0}")]
    DuplicateType(String),

    #[error("Invalid descriptor file {path}: {reason}")]
    InvalidDescriptor { path: String, reason: String },

    #[error("Invalid metatype version: {0}")]
    InvalidVersion(String),

    #[error("Unsupported metatype version: {0}")]
    UnsupportedVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

/// Failure of a Type Descriptor Source lookup.
///
/// A missing type is not an error (`Ok(None)`); this covers sources that
/// could not answer at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Malformed type descriptor for {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("Type source unavailable while resolving {name}: {reason}")]
    Unavailable { name: String, reason: String },
}
