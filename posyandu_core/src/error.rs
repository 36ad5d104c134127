//! Error types for the posyandu_core library.

use crate::Role;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for posyandu_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Report template error
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submitted measurement is missing a field or has a non-positive value
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record with this id exists in the store
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    /// No record id starts with the typed prefix
    #[error("No record matches id '{0}'")]
    UnknownId(String),

    /// More than one record id starts with the typed prefix
    #[error("Id '{0}' is ambiguous, type more characters")]
    AmbiguousId(String),

    /// Login rejected by the authenticator
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The current session's role may not perform this action
    #[error("Permission denied: {action} requires admin (current role: {})", .role.map(Role::label).unwrap_or("Guest"))]
    PermissionDenied {
        action: &'static str,
        role: Option<Role>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
