//! Error types for Icebox
//!
//! All modules use `IceboxResult<T>` as their return type. Every store
//! error is fatal to the operation in progress: a portable bundle with
//! missing or ambiguous artifacts is unusable, so nothing here is retried
//! or downgraded to a warning.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Icebox operations
pub type IceboxResult<T> = Result<T, IceboxError>;

/// All errors that can occur in Icebox
#[derive(Error, Debug)]
pub enum IceboxError {
    // Key derivation errors
    #[error("Cannot serialize arguments for '{function_identity}': {reason}")]
    Serialization {
        function_identity: String,
        reason: String,
    },

    // Build errors
    #[error("Key collision on '{key}': '{first}' and '{second}' derive the same storage key")]
    Collision {
        key: String,
        first: String,
        second: String,
    },

    #[error("Producer '{function_identity}' failed for arguments {arguments}: {reason}")]
    Producer {
        function_identity: String,
        arguments: String,
        reason: String,
    },

    #[error("No producer registered for '{0}'")]
    ProducerNotRegistered(String),

    // Lookup errors
    #[error("No artifact for '{function_identity}' under key '{key}'")]
    NotFound {
        function_identity: String,
        key: String,
    },

    #[error("Store artifact '{key}' is corrupt: {reason}")]
    StoreCorrupt { key: String, reason: String },

    #[error("Invalid store manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl IceboxError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a serialization error for a function's arguments
    pub fn serialization(
        function_identity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Serialization {
            function_identity: function_identity.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("The call site requests data that was never registered; rebuild the bundle")
            }
            Self::ProducerNotRegistered(_) => {
                Some("Register the producer before building, or fix the plugin's function identity")
            }
            Self::StoreCorrupt { .. } => Some("Run: icebox verify"),
            Self::ManifestInvalid { .. } => Some("Rebuild the store with: icebox build"),
            _ => None,
        }
    }
}
