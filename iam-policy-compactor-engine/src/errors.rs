//! Error types for the compaction engine
//!
//! Fatal problems (a malformed catalog, unreadable files, policy documents the
//! engine cannot represent) surface as [`CompactorError`]. Problems with a
//! single wildcard action are not fatal; see
//! [`ExpansionError`](crate::expansion::ExpansionError).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for operations that can fail with `CompactorError`
pub type Result<T> = std::result::Result<T, CompactorError>;

/// Errors that abort a compaction run
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompactorError {
    /// The catalog source lacks the top-level service map or has malformed entries.
    #[error("Catalog format error: {message}")]
    CatalogFormat { message: String },

    /// JSON could not be parsed or did not match the expected shape.
    #[error("JSON parsing error at line {line}, column {column}: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A filesystem operation failed.
    #[error("Failed to {operation} '{}': {source}", .path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A policy document uses a shape the engine does not support.
    #[error("Invalid policy{}: {message}", policy_label(.policy_id))]
    InvalidPolicy {
        policy_id: Option<String>,
        message: String,
    },

    /// The blocking compaction task panicked or was cancelled.
    #[error("Background compaction task failed: {source}")]
    BackgroundTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

fn policy_label(policy_id: &Option<String>) -> String {
    policy_id
        .as_ref()
        .map(|id| format!(" '{}'", id))
        .unwrap_or_default()
}

impl CompactorError {
    /// Create a catalog format error
    pub fn catalog_format(message: impl Into<String>) -> Self {
        Self::CatalogFormat {
            message: message.into(),
        }
    }

    /// Create a filesystem error with the failed operation and path
    pub fn file_system(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid policy error
    pub fn invalid_policy(policy_id: Option<&str>, message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            policy_id: policy_id.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CompactorError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}
