//! Error types for the layout store.
//!
//! # Error Recovery Strategy
//!
//! Almost nothing in the grid core is an error: invalid filter input is a
//! validation state, unknown columns are no-ops, and corrupt stored layouts
//! are treated as "no prior configuration". The one failure the core cannot
//! degrade away is the durable store refusing a write, which is surfaced as
//! [`StoreError`] so the caller can report it. In-memory layout state is
//! still updated when a write fails.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    ///
    /// Read failures never reach callers of [`crate::store::ColumnConfigStore`];
    /// they are logged and treated as an empty store.
    #[error("I/O error on store key {key:?} at {path}: {source}")]
    Io {
        /// Namespace key being accessed.
        key: String,
        /// File backing the key.
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The layout could not be encoded as JSON.
    #[error("Failed to serialize store key {key:?}: {source}")]
    Serialize {
        /// Namespace key being written.
        key: String,
        /// The underlying encoding error
        #[source]
        source: serde_json::Error,
    },

    /// The key cannot be mapped to a storage location.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcfg::model::error::StoreError;
    ///
    /// let err = StoreError::InvalidKey("../escape".to_string());
    /// assert!(err.to_string().contains("../escape"));
    /// ```
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),
}
