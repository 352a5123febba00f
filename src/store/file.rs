//! File-backed key-value store: one `<key>.json` file per key in a directory.

use super::KeyValueStore;
use crate::model::StoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory of JSON documents keyed by file stem.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Keys must be a single plain path component.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Readers only ever see a complete document.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_store(name: &str) -> FileStore {
        let dir = std::env::temp_dir().join(format!("gridcfg_file_store_{name}"));
        let _ = fs::remove_dir_all(&dir);
        FileStore::new(dir)
    }

    #[test]
    fn get_missing_key_returns_none() {
        let store = temp_store("missing");
        assert_eq!(store.get("layouts").unwrap(), None);
    }

    #[test]
    fn set_creates_directory_and_round_trips() {
        let mut store = temp_store("roundtrip");
        store.set("layouts", "[]").unwrap();

        assert!(store.dir().join("layouts.json").exists());
        assert_eq!(store.get("layouts").unwrap(), Some("[]".to_string()));

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let mut store = temp_store("remove_missing");
        assert!(store.remove("layouts").is_ok());
    }

    #[test]
    fn remove_deletes_file() {
        let mut store = temp_store("remove");
        store.set("layouts", "[]").unwrap();
        store.remove("layouts").unwrap();
        assert_eq!(store.get("layouts").unwrap(), None);

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn path_for_rejects_traversal_keys() {
        let store = temp_store("keys");
        for key in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(store.path_for(key), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
