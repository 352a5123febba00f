//! Durable column layout storage.
//!
//! [`KeyValueStore`] is the synchronous collaborator holding raw JSON under a
//! namespace key; [`ColumnConfigStore`] owns the per-grid layout logic on top
//! of it.

pub mod column_config;
pub mod file;
pub mod memory;

pub use column_config::{ColumnConfigStore, LayoutSnapshot, DEFAULT_STORAGE_KEY};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::StoreError;

/// Synchronous string key-value store.
///
/// Implementations must report an absent key as `Ok(None)`.
pub trait KeyValueStore {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
