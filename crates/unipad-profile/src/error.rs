use thiserror::Error;
use unipad_device::EmulatorButton;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile cache lock poisoned")]
    Poisoned,
}

/// A scan code is already bound to another button of the same player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scan code {scan_code:#04x} is already bound to {bound_to:?}, cannot bind {requested:?}")]
pub struct BindingConflict {
    pub scan_code: u16,
    pub bound_to: EmulatorButton,
    pub requested: EmulatorButton,
}
