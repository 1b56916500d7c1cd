//! Key-value preferences that survive across sessions
//!
//! Only two keys are kept: the interface language and the one-time
//! "welcome seen" flag.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::error::Result;

/// Selected interface language code
pub const LANGUAGE_KEY: &str = "uofg_lang";

/// Set to "1" once the user dismissed the welcome dialog for good
pub const WELCOME_KEY: &str = "uofg_accessible_routing_welcome_v1";

/// String key-value store
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a JSON object on disk
///
/// The file is read once on open and rewritten on every `set`. A missing
/// file is an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, data)?;
        debug!("Saved preference {key} to {}", self.path.display());
        Ok(())
    }
}

/// Whether the first-visit welcome dialog should open
pub fn welcome_should_show(store: &dyn PreferenceStore) -> bool {
    store.get(WELCOME_KEY).as_deref() != Some("1")
}

/// Close the welcome dialog; remember it only if "don't show again" is checked
pub fn dismiss_welcome(store: &mut dyn PreferenceStore, dont_show_again: bool) -> Result<()> {
    if dont_show_again {
        store.set(WELCOME_KEY, "1")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trips_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("campus-route.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(LANGUAGE_KEY), None);
        store.set(LANGUAGE_KEY, "zh").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(LANGUAGE_KEY).as_deref(), Some("zh"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn test_welcome_gate() {
        let mut store = MemoryStore::default();
        assert!(welcome_should_show(&store));

        dismiss_welcome(&mut store, false).unwrap();
        assert!(welcome_should_show(&store), "closing without the checkbox");

        dismiss_welcome(&mut store, true).unwrap();
        assert!(!welcome_should_show(&store));
    }
}
