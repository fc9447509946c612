//! Durable key-value storage for persisted mixer settings.
//!
//! The mixer writes through on every change and reads once at construction.
//! Hosts plug in whatever they already persist preferences with; two stores
//! ship here: [`MemoryStore`] and, with the `serde` feature, a JSON file.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub trait KeyValueStore {
    fn set_float(&mut self, key: &str, value: f32);
    fn get_float(&self, key: &str) -> Option<f32>;
    fn set_int(&mut self, key: &str, value: i32);
    fn get_int(&self, key: &str) -> Option<i32>;
    fn has_key(&self, key: &str) -> bool;

    /// Flush pending writes to durable storage.
    fn save(&mut self) -> Result<(), StoreError>;
}

/// A stored scalar. Ints are tried first so whole-number JSON stays an int.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoredValue {
    Int(i32),
    Float(f32),
}

impl StoredValue {
    fn as_float(self) -> f32 {
        match self {
            StoredValue::Int(v) => v as f32,
            StoredValue::Float(v) => v,
        }
    }
}

/// In-process store. `save` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn set_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), StoredValue::Float(value));
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get(key).map(|v| v.as_float())
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key) {
            Some(StoredValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }
}

#[cfg(feature = "serde")]
pub use json::JsonFileStore;

#[cfg(feature = "serde")]
mod json {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use super::{KeyValueStore, StoredValue};
    use crate::error::StoreError;

    /// Flat JSON object on disk, rewritten in full on every `save`.
    #[derive(Debug, Clone)]
    pub struct JsonFileStore {
        path: PathBuf,
        values: BTreeMap<String, StoredValue>,
    }

    impl JsonFileStore {
        /// Open the store at `path`. A missing file starts an empty store.
        pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
            let path = path.into();
            let values = match fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?,
                Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
                Err(source) => return Err(StoreError::Io { path, source }),
            };
            debug!(path = %path.display(), keys = values.len(), "opened settings store");
            Ok(Self { path, values })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl KeyValueStore for JsonFileStore {
        fn set_float(&mut self, key: &str, value: f32) {
            self.values.insert(key.to_string(), StoredValue::Float(value));
        }

        fn get_float(&self, key: &str) -> Option<f32> {
            self.values.get(key).map(|v| v.as_float())
        }

        fn set_int(&mut self, key: &str, value: i32) {
            self.values.insert(key.to_string(), StoredValue::Int(value));
        }

        fn get_int(&self, key: &str) -> Option<i32> {
            match self.values.get(key) {
                Some(StoredValue::Int(v)) => Some(*v),
                _ => None,
            }
        }

        fn has_key(&self, key: &str) -> bool {
            self.values.contains_key(key)
        }

        fn save(&mut self) -> Result<(), StoreError> {
            let io_err = |source| StoreError::Io {
                path: self.path.clone(),
                source,
            };

            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            let text = serde_json::to_string_pretty(&self.values).map_err(|source| {
                StoreError::Json {
                    path: self.path.clone(),
                    source,
                }
            })?;
            fs::write(&self.path, text).map_err(io_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_scalars() {
        let mut store = MemoryStore::new();
        store.set_float("audio_volume_Music", 0.25);
        store.set_int("audio_mute_Music", 1);

        assert_eq!(store.get_float("audio_volume_Music"), Some(0.25));
        assert_eq!(store.get_int("audio_mute_Music"), Some(1));
        assert!(store.has_key("audio_mute_Music"));
        assert!(!store.has_key("audio_volume_SFX"));
    }

    #[test]
    fn int_values_read_as_floats_but_not_vice_versa() {
        let mut store = MemoryStore::new();
        store.set_int("whole", 1);
        store.set_float("fraction", 0.5);

        assert_eq!(store.get_float("whole"), Some(1.0));
        assert_eq!(store.get_int("fraction"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("saavy_mixer_store_{}", std::process::id()));
        let path = dir.join("prefs.json");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!store.has_key("audio_volume_SFX"));
        store.set_float("audio_volume_SFX", 0.75);
        store.set_int("audio_mute_SFX", 0);
        store.save().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_float("audio_volume_SFX"), Some(0.75));
        assert_eq!(reopened.get_int("audio_mute_SFX"), Some(0));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_store_rejects_malformed_file() {
        let dir = std::env::temp_dir().join(format!("saavy_mixer_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
