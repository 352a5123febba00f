//! Per-grid column layout store.
//!
//! Every grid's layout lives in one JSON array under a single namespace key.
//! Writes are read-merge-write at the entry level so one grid never clobbers
//! another, even when some stored entries no longer parse. Corrupt or
//! unreadable data is treated as "no prior configuration".

use super::KeyValueStore;
use crate::model::{column_identities, GridColumn, GridConfiguration, GridName, StoreError};
use crate::state::broadcast::{Broadcaster, SubscriptionId};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

/// Namespace key under which all layouts are stored.
pub const DEFAULT_STORAGE_KEY: &str = "gridColumnConfigurations";

/// Full per-grid-name layout map published to subscribers.
pub type LayoutSnapshot = BTreeMap<String, GridConfiguration>;

/// Column layout store shared by every grid widget.
pub struct ColumnConfigStore {
    backend: Box<dyn KeyValueStore>,
    storage_key: String,
    /// Layouts currently published, keyed by grid name.
    layouts: LayoutSnapshot,
    subscribers: Broadcaster<LayoutSnapshot>,
}

impl std::fmt::Debug for ColumnConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnConfigStore")
            .field("storage_key", &self.storage_key)
            .field("layouts", &self.layouts)
            .field("subscribers", &self.subscribers.subscriber_count())
            .finish()
    }
}

impl ColumnConfigStore {
    /// Store over `backend`, keeping every layout under `storage_key`.
    pub fn new(backend: impl KeyValueStore + 'static, storage_key: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            storage_key: storage_key.into(),
            layouts: LayoutSnapshot::new(),
            subscribers: Broadcaster::new(),
        }
    }

    /// Store using [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key(backend: impl KeyValueStore + 'static) -> Self {
        Self::new(backend, DEFAULT_STORAGE_KEY)
    }

    /// Namespace key in use.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    // ===== Subscriptions =====

    /// Receive the full layout map after every change.
    pub fn subscribe(&mut self) -> (SubscriptionId, Receiver<LayoutSnapshot>) {
        self.subscribers.subscribe()
    }

    /// Stop delivering to `id`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Layouts currently published.
    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.layouts
    }

    // ===== Operations =====

    /// Reconcile a grid's declared defaults with its stored layout.
    ///
    /// Without a stored layout the defaults are persisted. If the stored
    /// `(prop, name)` set differs from the defaults', the defaults overwrite
    /// it. Otherwise the stored layout (user visibility and order) is kept and
    /// republished.
    pub fn initialize_default_columns(
        &mut self,
        grid_name: &GridName,
        default_columns: &[GridColumn],
    ) -> Result<GridConfiguration, StoreError> {
        let declared = GridConfiguration::new(grid_name.clone(), default_columns.to_vec());
        let projected = declared.persisted();

        let stored = self
            .read_all()
            .into_iter()
            .find(|c| &c.grid_name == grid_name);

        match stored {
            None => {
                debug!(grid = %grid_name, "No stored layout, persisting defaults");
                self.set_columns(&declared)?;
                Ok(projected)
            }
            Some(stored)
                if column_identities(&stored.columns) != column_identities(&projected.columns) =>
            {
                info!(grid = %grid_name, "Declared columns changed, replacing stored layout");
                self.set_columns(&declared)?;
                Ok(projected)
            }
            Some(stored) => {
                debug!(grid = %grid_name, "Keeping stored layout");
                self.layouts
                    .insert(grid_name.to_string(), stored.clone());
                self.publish();
                Ok(stored)
            }
        }
    }

    /// Persist a grid's layout and republish.
    ///
    /// Columns are reduced to their persisted projection; empty props are
    /// dropped. The in-memory layout is updated and published even if the
    /// durable write fails; the write error is returned.
    pub fn set_columns(&mut self, config: &GridConfiguration) -> Result<(), StoreError> {
        let persisted = config.persisted();
        self.layouts
            .insert(persisted.grid_name.to_string(), persisted.clone());

        let written = self.write_entry(&persisted);
        self.publish();
        written
    }

    /// Layout for `grid_name`, from memory or else the durable store.
    pub fn configuration(&self, grid_name: &str) -> Option<GridConfiguration> {
        if let Some(config) = self.layouts.get(grid_name) {
            return Some(config.clone());
        }
        self.read_all()
            .into_iter()
            .find(|c| c.grid_name.as_str() == grid_name)
    }

    /// Names of every grid with a stored or published layout.
    pub fn grid_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .read_all()
            .into_iter()
            .map(|c| c.grid_name.to_string())
            .chain(self.layouts.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Forget the stored layout of one grid and fall back to its declared
    /// columns. Other grids' entries are untouched.
    pub fn reset_to_default(
        &mut self,
        grid_name: &GridName,
        original_columns: &[GridColumn],
    ) -> Result<(), StoreError> {
        info!(grid = %grid_name, "Resetting column layout to defaults");
        let removed = self.delete_entry(grid_name);

        let rehydrated = GridConfiguration::new(grid_name.clone(), original_columns.to_vec());
        self.layouts
            .insert(grid_name.to_string(), rehydrated.persisted());
        self.publish();
        removed
    }

    /// Drop a grid's stored and published layout without rehydrating it.
    /// Returns whether a durable entry existed.
    pub fn forget(&mut self, grid_name: &GridName) -> Result<bool, StoreError> {
        let stored = self.read_all().iter().any(|c| &c.grid_name == grid_name);
        self.layouts.remove(grid_name.as_str());
        self.publish();
        self.delete_entry(grid_name)?;
        info!(grid = %grid_name, stored, "Forgot column layout");
        Ok(stored)
    }

    /// Flip `hidden` on one column. Unknown grid or prop is a no-op
    /// (`Ok(false)`).
    pub fn toggle_column(&mut self, grid_name: &GridName, prop: &str) -> Result<bool, StoreError> {
        let Some(mut config) = self.configuration(grid_name.as_str()) else {
            return Ok(false);
        };
        let Some(column) = config.columns.iter_mut().find(|c| c.prop == prop) else {
            return Ok(false);
        };
        column.hidden = !column.hidden;
        debug!(grid = %grid_name, prop, hidden = column.hidden, "Toggled column");

        self.set_columns(&config)?;
        Ok(true)
    }

    /// Set `hidden` on every column except suppressed-toggle columns.
    /// Returns `Ok(false)` for an unknown grid.
    pub fn toggle_all_columns(
        &mut self,
        grid_name: &GridName,
        hidden: bool,
    ) -> Result<bool, StoreError> {
        let Some(mut config) = self.configuration(grid_name.as_str()) else {
            return Ok(false);
        };
        config
            .columns
            .iter_mut()
            .filter(|c| !c.suppress_toggle)
            .for_each(|c| c.hidden = hidden);
        debug!(grid = %grid_name, hidden, "Toggled all columns");

        self.set_columns(&config)?;
        Ok(true)
    }

    // ===== Durable Store Access =====

    /// Raw stored entries. A document that is not a JSON array, or that
    /// cannot be read, yields an empty list.
    fn read_entries(&self) -> Vec<Value> {
        let raw = match self.backend.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.storage_key, error = %e, "Layout store unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = %self.storage_key, error = %e, "Layout store corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Every stored layout that parses. Malformed entries are skipped.
    fn read_all(&self) -> Vec<GridConfiguration> {
        self.read_entries()
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value(entry)
                    .map_err(|e| {
                        warn!(key = %self.storage_key, index, error = %e, "Skipping malformed layout entry");
                    })
                    .ok()
            })
            .collect()
    }

    fn write_entries(&mut self, entries: &[Value]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries).map_err(|source| StoreError::Serialize {
            key: self.storage_key.clone(),
            source,
        })?;
        self.backend.set(&self.storage_key, &raw)
    }

    /// Replace or append one grid's entry. Every other entry, parseable or
    /// not, is written back unchanged.
    fn write_entry(&mut self, config: &GridConfiguration) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(config).map_err(|source| StoreError::Serialize {
            key: self.storage_key.clone(),
            source,
        })?;
        let mut entries = self.read_entries();
        match entries
            .iter_mut()
            .find(|entry| entry_grid_name(entry) == Some(config.grid_name.as_str()))
        {
            Some(existing) => *existing = encoded,
            None => entries.push(encoded),
        }
        self.write_entries(&entries)
    }

    fn delete_entry(&mut self, grid_name: &GridName) -> Result<(), StoreError> {
        let mut entries = self.read_entries();
        let before = entries.len();
        entries.retain(|entry| entry_grid_name(entry) != Some(grid_name.as_str()));
        if entries.len() == before {
            return Ok(());
        }
        self.write_entries(&entries)
    }

    fn publish(&mut self) {
        self.subscribers.publish(&self.layouts);
    }
}

/// `gridName` of a raw stored entry, if it has one.
fn entry_grid_name(entry: &Value) -> Option<&str> {
    entry.get("gridName").and_then(Value::as_str)
}

// ===== Tests =====

#[cfg(test)]
#[path = "column_config_tests.rs"]
mod tests;
