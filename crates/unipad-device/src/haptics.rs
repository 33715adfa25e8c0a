use std::time::Duration;

use thiserror::Error;

use crate::types::DeviceId;

#[derive(Debug, Error)]
pub enum HapticError {
    /// The device has no usable haptic engine.
    #[error("haptics unsupported on {0}")]
    Unsupported(DeviceId),
    /// The engine exists but refused to start or play.
    #[error("haptic engine error: {0}")]
    Engine(String),
}

/// Best-effort rumble support provided by a device backend.
pub trait HapticBackend: Send + Sync {
    /// Prepare the haptic engine of a freshly connected device.
    fn start_engine(&self, id: DeviceId) -> Result<(), HapticError>;

    /// Play a rumble; `strength` is normalized to [0.0, 1.0].
    fn rumble(
        &self,
        id: DeviceId,
        strength: f32,
        duration: Duration,
    ) -> Result<(), HapticError>;
}

/// Backend for hosts without any haptic support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticBackend for NoHaptics {
    fn start_engine(&self, id: DeviceId) -> Result<(), HapticError> {
        Err(HapticError::Unsupported(id))
    }

    fn rumble(&self, id: DeviceId, _: f32, _: Duration) -> Result<(), HapticError> {
        Err(HapticError::Unsupported(id))
    }
}
