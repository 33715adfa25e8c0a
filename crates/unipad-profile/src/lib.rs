//! Persistence of controller profiles and keyboard bindings.
//!
//! Both collections are stored as whole-collection JSON snapshots under a
//! single key each. A missing or unreadable snapshot loads as empty.

mod error;
mod keymap;
mod profile;
mod store;
mod worker;

pub use error::{BindingConflict, ProfileError, StoreError};
pub use keymap::{KeyMapping, KeyMappingStore, KeyboardMappings, KEY_MAPPINGS_KEY};
pub use profile::{ControllerProfile, ProfileMap, ProfileStore, PROFILES_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use worker::PersistenceWorker;

/// Convenient result alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
