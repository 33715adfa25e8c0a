use thiserror::Error;
use unipad_device::{HapticError, PlayerSlot};

use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Error type for subsystem operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("haptic error: {0}")]
    Haptic(#[from] HapticError),
    #[error("no controller assigned to player {0}")]
    NoController(PlayerSlot),
}

/// Convenient result alias for subsystem operations.
pub type Result<T> = std::result::Result<T, Error>;
