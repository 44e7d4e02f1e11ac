//! Error types for safeguard.
//!
//! This module defines all error types used throughout the safeguard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::auth::AuthError;

/// The main error type for safeguard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The backing profile store could not be reached.
    #[error("profile store unavailable: {message}")]
    StoreUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// No profile record exists with the given identifier.
    #[error("profile not found: {id}")]
    ProfileNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    // === Profile Errors ===
    /// A profile draft failed validation.
    #[error("invalid profile: {message}")]
    InvalidProfile {
        /// Description of the validation failure.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Auth Errors ===
    /// No user is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// The authentication provider rejected a request.
    #[error(transparent)]
    Auth(#[from] AuthError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for safeguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new store unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a new profile not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::ProfileNotFound { id: id.into() }
    }

    /// Create a new invalid profile error.
    #[must_use]
    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the store could not be reached.
    ///
    /// Query failures against an open database count as unavailability too;
    /// callers treat both as a reason to degrade to the local cache.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::DatabaseOpen { .. } | Self::DatabaseQuery(_)
        )
    }

    /// Check if this error indicates a missing profile record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProfileNotFound { .. })
    }
}
