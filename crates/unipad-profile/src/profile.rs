use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use unipad_device::EmulatorButton;

use crate::error::ProfileError;
use crate::store::KeyValueStore;
use crate::Result;

/// Store key holding the whole profile collection.
pub const PROFILES_KEY: &str = "controller-profiles";

/// User mapping overrides for one controller vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerProfile {
    pub name: String,
    pub vendor_name: String,
    /// Physical control name -> emulator button.
    #[serde(default)]
    pub mappings: BTreeMap<String, EmulatorButton>,
}

impl ControllerProfile {
    pub fn new(name: impl Into<String>, vendor_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor_name: vendor_name.into(),
            mappings: BTreeMap::new(),
        }
    }

    pub fn with_mapping(mut self, physical: impl Into<String>, button: EmulatorButton) -> Self {
        self.mappings.insert(physical.into(), button);
        self
    }
}

/// Profiles keyed by vendor name.
pub type ProfileMap = BTreeMap<String, ControllerProfile>;

/// Controller profiles persisted as one snapshot.
///
/// The collection is loaded once on open and kept in memory. Every save
/// rewrites the full collection.
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
    profiles: Mutex<ProfileMap>,
}

impl ProfileStore {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let profiles = load_profiles(store.as_ref());
        Self { store, profiles: Mutex::new(profiles) }
    }

    /// Current collection.
    pub fn load(&self) -> ProfileMap {
        self.profiles
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, vendor_name: &str) -> Option<ControllerProfile> {
        self.profiles
            .lock()
            .ok()
            .and_then(|p| p.get(vendor_name).cloned())
    }

    /// Creates or replaces the profile for its vendor and writes the whole
    /// collection.
    pub fn save(&self, profile: ControllerProfile) -> Result<()> {
        let snapshot = match self.profiles.lock() {
            Ok(mut profiles) => {
                profiles.insert(profile.vendor_name.clone(), profile);
                profiles.clone()
            }
            Err(_) => return Err(ProfileError::Poisoned),
        };
        let blob = serde_json::to_vec(&snapshot)?;
        self.store.put(PROFILES_KEY, &blob)?;
        Ok(())
    }
}

fn load_profiles(store: &dyn KeyValueStore) -> ProfileMap {
    let blob = match store.get(PROFILES_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return ProfileMap::new(),
        Err(e) => {
            log::warn!("failed to read controller profiles: {e}");
            return ProfileMap::new();
        }
    };
    match serde_json::from_slice(&blob) {
        Ok(profiles) => profiles,
        Err(e) => {
            log::warn!("discarding unreadable controller profiles: {e}");
            ProfileMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};

    #[test]
    fn missing_blob_loads_empty() {
        let profiles = ProfileStore::open(Arc::new(MemoryStore::new()));
        assert!(profiles.load().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put(PROFILES_KEY, b"{not json").unwrap();
        let profiles = ProfileStore::open(store);
        assert!(profiles.load().is_empty());
    }

    #[test]
    fn resave_overwrites_by_vendor_name() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let profiles = ProfileStore::open(store.clone());

        profiles
            .save(ControllerProfile::new("mine", "Pro Controller").with_mapping("A", EmulatorButton::B))
            .unwrap();
        profiles
            .save(ControllerProfile::new("other", "DualSense").with_mapping("ButtonA", EmulatorButton::A))
            .unwrap();
        profiles
            .save(ControllerProfile::new("mine v2", "Pro Controller").with_mapping("B", EmulatorButton::A))
            .unwrap();

        let reopened = ProfileStore::open(store).load();
        assert_eq!(reopened.len(), 2);
        let pro = &reopened["Pro Controller"];
        assert_eq!(pro.name, "mine v2");
        assert_eq!(pro.mappings.get("B"), Some(&EmulatorButton::A));
        assert!(!pro.mappings.contains_key("A"));
    }

    #[test]
    fn save_after_poisoned_cache_reports_error() {
        let store = Arc::new(MemoryStore::new());
        let profiles = Arc::new(ProfileStore::open(store.clone()));
        let poisoner = profiles.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.profiles.lock().unwrap();
            panic!("poison the cache");
        })
        .join();

        let result = profiles.save(ControllerProfile::new("mine", "Pro Controller"));
        assert!(matches!(result, Err(ProfileError::Poisoned)));
        assert!(store.get(PROFILES_KEY).unwrap().is_none());
    }
}
