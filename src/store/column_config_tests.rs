//! Tests for the column layout store.

use super::*;
use crate::store::MemoryStore;

fn grid(name: &str) -> GridName {
    GridName::new(name).unwrap()
}

fn defaults() -> Vec<GridColumn> {
    vec![
        GridColumn::new("name", "Name").suppress_toggle(),
        GridColumn::new("status", "Status"),
    ]
}

fn stored_layouts(backend: &MemoryStore) -> Vec<GridConfiguration> {
    let raw = backend.raw(DEFAULT_STORAGE_KEY).expect("layouts persisted");
    serde_json::from_str(&raw).expect("valid layout JSON")
}

/// Backend whose writes always fail.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::InvalidKey(key.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ===== initialize_default_columns =====

#[test]
fn first_initialization_persists_defaults() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    let config = store
        .initialize_default_columns(&grid("users"), &defaults())
        .unwrap();

    assert_eq!(config.columns.len(), 2);
    let layouts = stored_layouts(&backend);
    assert_eq!(layouts.len(), 1);
    assert_eq!(layouts[0].grid_name.as_str(), "users");
}

#[test]
fn reinitialization_with_same_defaults_preserves_hidden_column() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();

    let mut customized = store.configuration("users").unwrap();
    customized.columns[1].hidden = true;
    store.set_columns(&customized).unwrap();

    // Fresh store instance simulates navigating back to the screen.
    let mut store = ColumnConfigStore::with_default_key(backend);
    let config = store.initialize_default_columns(&users, &defaults()).unwrap();

    assert!(config.column("status").unwrap().hidden);
}

#[test]
fn reinitialization_preserves_user_order() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();

    let mut customized = store.configuration("users").unwrap();
    customized.columns.reverse();
    store.set_columns(&customized).unwrap();

    let config = store.initialize_default_columns(&users, &defaults()).unwrap();

    let props: Vec<_> = config.columns.iter().map(|c| c.prop.as_str()).collect();
    assert_eq!(props, vec!["status", "name"]);
}

#[test]
fn renamed_column_replaces_stored_layout() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend);
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();
    store.toggle_column(&users, "status").unwrap();

    let renamed = vec![
        GridColumn::new("name", "Name").suppress_toggle(),
        GridColumn::new("status", "State"),
    ];
    let config = store.initialize_default_columns(&users, &renamed).unwrap();

    let status = config.column("status").unwrap();
    assert_eq!(status.name, "State");
    assert!(!status.hidden, "defaults win when columns change");
}

#[test]
fn added_column_replaces_stored_layout() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();
    store.toggle_column(&users, "status").unwrap();

    let mut extended = defaults();
    extended.push(GridColumn::new("owner", "Owner"));
    let config = store.initialize_default_columns(&users, &extended).unwrap();

    assert_eq!(config.columns.len(), 3);
    assert!(config.columns.iter().all(|c| !c.hidden));
}

#[test]
fn corrupt_store_is_treated_as_first_run() {
    let backend = MemoryStore::new();
    backend.insert_raw(DEFAULT_STORAGE_KEY, "{not json");
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    let config = store
        .initialize_default_columns(&grid("users"), &defaults())
        .unwrap();

    assert_eq!(config.columns.len(), 2);
    assert_eq!(stored_layouts(&backend).len(), 1, "corrupt data replaced");
}

#[test]
fn foreign_json_shape_is_treated_as_empty() {
    let backend = MemoryStore::new();
    backend.insert_raw(DEFAULT_STORAGE_KEY, r#"{"some":"object"}"#);
    let store = ColumnConfigStore::with_default_key(backend);

    assert_eq!(store.configuration("users"), None);
    assert!(store.grid_names().is_empty());
}

#[test]
fn malformed_entry_does_not_wipe_other_grids() {
    let backend = MemoryStore::new();
    backend.insert_raw(
        DEFAULT_STORAGE_KEY,
        r#"[
            {"gridName":"b","columns":[{"prop":"x","name":"X","hidden":true}]},
            {"gridName":"","columns":[]}
        ]"#,
    );
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    assert_eq!(store.grid_names(), vec!["b".to_string()]);
    store
        .initialize_default_columns(&grid("a"), &defaults())
        .unwrap();

    let raw: Vec<serde_json::Value> =
        serde_json::from_str(&backend.raw(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
    let names: Vec<_> = raw.iter().map(|e| e["gridName"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["b", "", "a"]);
    assert!(store.configuration("b").unwrap().column("x").unwrap().hidden);
}

#[test]
fn rewritten_entries_keep_field_order() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    store
        .initialize_default_columns(&grid("a"), &defaults())
        .unwrap();
    store
        .initialize_default_columns(&grid("b"), &defaults())
        .unwrap();

    let raw = backend.raw(DEFAULT_STORAGE_KEY).unwrap();
    assert!(raw.starts_with(r#"[{"gridName":"a","columns":[{"prop":"name","name":"Name""#));
}

#[test]
fn delete_keeps_malformed_entries_of_other_grids() {
    let backend = MemoryStore::new();
    backend.insert_raw(
        DEFAULT_STORAGE_KEY,
        r#"[{"gridName":"users","columns":[]},{"gridName":"roles","columns":[{"name":"No prop"}]}]"#,
    );
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    assert!(store.forget(&grid("users")).unwrap());

    let raw = backend.raw(DEFAULT_STORAGE_KEY).unwrap();
    assert!(raw.contains("roles"));
    assert!(!raw.contains("users"));
}

// ===== set_columns =====

#[test]
fn set_columns_drops_empty_props_and_render_hints() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    let config = GridConfiguration::new(
        grid("users"),
        vec![
            GridColumn::new("name", "Name").width(200),
            GridColumn::new("", "Spacer"),
        ],
    );
    store.set_columns(&config).unwrap();

    let layouts = stored_layouts(&backend);
    assert_eq!(layouts[0].columns.len(), 1);
    assert_eq!(layouts[0].columns[0].width, None);
    assert!(!backend.raw(DEFAULT_STORAGE_KEY).unwrap().contains("width"));
}

#[test]
fn set_columns_does_not_clobber_other_grids() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());

    store
        .set_columns(&GridConfiguration::new(grid("a"), defaults()))
        .unwrap();
    store
        .set_columns(&GridConfiguration::new(grid("b"), defaults()))
        .unwrap();

    let names: Vec<_> = stored_layouts(&backend)
        .into_iter()
        .map(|c| c.grid_name.to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn interleaved_stores_merge_instead_of_overwrite() {
    let backend = MemoryStore::new();
    let mut first = ColumnConfigStore::with_default_key(backend.clone());
    let mut second = ColumnConfigStore::with_default_key(backend.clone());

    first
        .initialize_default_columns(&grid("a"), &defaults())
        .unwrap();
    second
        .initialize_default_columns(&grid("b"), &defaults())
        .unwrap();
    first.toggle_column(&grid("a"), "status").unwrap();

    let layouts = stored_layouts(&backend);
    assert_eq!(layouts.len(), 2);
    let b = layouts.iter().find(|c| c.grid_name.as_str() == "b").unwrap();
    assert!(!b.column("status").unwrap().hidden);
}

#[test]
fn failed_write_still_updates_in_memory_layout() {
    let mut store = ColumnConfigStore::with_default_key(ReadOnlyStore);
    let (_id, rx) = store.subscribe();

    let result = store.set_columns(&GridConfiguration::new(grid("users"), defaults()));

    assert!(result.is_err());
    assert!(store.configuration("users").is_some());
    assert!(rx.try_recv().is_ok(), "subscribers still notified");
}

// ===== Subscriptions =====

#[test]
fn set_columns_publishes_full_map() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    store
        .set_columns(&GridConfiguration::new(grid("a"), defaults()))
        .unwrap();
    let (_id, rx) = store.subscribe();

    store
        .set_columns(&GridConfiguration::new(grid("b"), defaults()))
        .unwrap();

    let snapshot = rx.try_recv().unwrap();
    assert_eq!(
        snapshot.keys().cloned().collect::<Vec<_>>(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn unchanged_initialization_republishes() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    store
        .initialize_default_columns(&grid("users"), &defaults())
        .unwrap();
    let (_id, rx) = store.subscribe();

    store
        .initialize_default_columns(&grid("users"), &defaults())
        .unwrap();

    assert!(rx.try_recv().unwrap().contains_key("users"));
}

#[test]
fn unsubscribed_receiver_gets_nothing() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    let (id, rx) = store.subscribe();
    assert!(store.unsubscribe(id));

    store
        .set_columns(&GridConfiguration::new(grid("users"), defaults()))
        .unwrap();

    assert!(rx.try_recv().is_err());
}

// ===== reset_to_default =====

#[test]
fn reset_wipes_only_target_grid() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    store.initialize_default_columns(&grid("a"), &defaults()).unwrap();
    store.initialize_default_columns(&grid("b"), &defaults()).unwrap();
    store.toggle_column(&grid("b"), "status").unwrap();
    let b_before = store.configuration("b").unwrap();

    store.reset_to_default(&grid("a"), &defaults()).unwrap();

    let layouts = stored_layouts(&backend);
    assert_eq!(layouts.len(), 1);
    assert_eq!(layouts[0], b_before);
}

#[test]
fn reset_rehydrates_declared_visibility() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();
    store.toggle_all_columns(&users, true).unwrap();

    let originals = vec![
        GridColumn::new("name", "Name"),
        GridColumn::new("status", "Status"),
        GridColumn::new("notes", "Notes").hidden(true),
    ];
    store.reset_to_default(&users, &originals).unwrap();

    let config = store.configuration("users").unwrap();
    assert!(!config.column("name").unwrap().hidden);
    assert!(!config.column("status").unwrap().hidden);
    assert!(config.column("notes").unwrap().hidden);
}

#[test]
fn forget_removes_entry_without_rehydrating() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    store.initialize_default_columns(&grid("users"), &defaults()).unwrap();
    store.initialize_default_columns(&grid("roles"), &defaults()).unwrap();

    assert!(store.forget(&grid("users")).unwrap());

    assert!(store.configuration("users").is_none());
    assert_eq!(store.grid_names(), vec!["roles".to_string()]);
    assert!(!store.forget(&grid("users")).unwrap());
}

// ===== toggle_column / toggle_all_columns =====

#[test]
fn toggle_column_flips_and_persists() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::with_default_key(backend.clone());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();

    assert!(store.toggle_column(&users, "status").unwrap());
    assert!(stored_layouts(&backend)[0].column("status").unwrap().hidden);

    assert!(store.toggle_column(&users, "status").unwrap());
    assert!(!stored_layouts(&backend)[0].column("status").unwrap().hidden);
}

#[test]
fn toggle_unknown_column_is_noop() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();

    assert!(!store.toggle_column(&users, "missing").unwrap());
    assert!(!store.toggle_column(&grid("other"), "status").unwrap());
}

#[test]
fn toggle_all_respects_suppress_toggle() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    let users = grid("users");
    store.initialize_default_columns(&users, &defaults()).unwrap();

    assert!(store.toggle_all_columns(&users, true).unwrap());

    let config = store.configuration("users").unwrap();
    assert!(!config.column("name").unwrap().hidden);
    assert!(config.column("status").unwrap().hidden);
}

#[test]
fn toggle_all_on_unknown_grid_is_noop() {
    let mut store = ColumnConfigStore::with_default_key(MemoryStore::new());
    assert!(!store.toggle_all_columns(&grid("nope"), true).unwrap());
}

// ===== Lookup =====

#[test]
fn configuration_falls_back_to_durable_store() {
    let backend = MemoryStore::new();
    let mut writer = ColumnConfigStore::with_default_key(backend.clone());
    writer
        .set_columns(&GridConfiguration::new(grid("users"), defaults()))
        .unwrap();

    let reader = ColumnConfigStore::with_default_key(backend);

    assert!(reader.snapshot().is_empty());
    assert!(reader.configuration("users").is_some());
    assert_eq!(reader.grid_names(), vec!["users".to_string()]);
}

#[test]
fn custom_storage_key_is_used() {
    let backend = MemoryStore::new();
    let mut store = ColumnConfigStore::new(backend.clone(), "tables");
    store
        .set_columns(&GridConfiguration::new(grid("users"), defaults()))
        .unwrap();

    assert!(backend.raw("tables").is_some());
    assert!(backend.raw(DEFAULT_STORAGE_KEY).is_none());
}
