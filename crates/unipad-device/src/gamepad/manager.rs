use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ahash::AHashSet;
use crossbeam_channel::{unbounded, Sender};
use thiserror::Error;

use crate::channel::EventSender;
use crate::haptics::{HapticBackend, HapticError};
use crate::types::DeviceId;

use super::command::Command;
use super::runtime::start_runtime_thread;

#[derive(Debug, Error)]
pub enum GamepadError {
    /// Failed to initialize SDL or one of its subsystems.
    #[error("backend init failed: {0}")]
    BackendInit(String),
    /// The runtime thread is gone.
    #[error("runtime stopped")]
    Stopped,
}

/// Shared state of the manager and its runtime thread.
pub(crate) struct Inner {
    pub(crate) cmd_tx: Sender<Command>,
    pub(crate) rumble: RwLock<AHashSet<DeviceId>>,
}

/// Owns the SDL runtime thread that discovers gamepads and feeds their
/// input into the ingress channel.
pub struct GamepadManager {
    inner: Arc<Inner>,
}

impl GamepadManager {
    /// Starts the runtime thread and waits for the initial enumeration
    /// (up to one second).
    pub fn new(events: EventSender) -> Result<Self, GamepadError> {
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let inner = Arc::new(Inner {
            cmd_tx,
            rumble: RwLock::new(AHashSet::new()),
        });

        let (ready_tx, ready_rx) = mpsc::channel();
        start_runtime_thread(inner.clone(), events, cmd_rx, ready_tx);

        match ready_rx.recv_timeout(Duration::from_secs(1)) {
            Ok(Err(e)) => Err(GamepadError::BackendInit(e)),
            Ok(Ok(())) | Err(_) => Ok(Self { inner }),
        }
    }

    pub fn supports_rumble(&self, id: DeviceId) -> bool {
        self.inner
            .rumble
            .read()
            .map(|set| set.contains(&id))
            .unwrap_or(false)
    }

    pub fn stop_rumble(&self, id: DeviceId) -> Result<(), GamepadError> {
        self.inner
            .cmd_tx
            .send(Command::StopRumble { id })
            .map_err(|_| GamepadError::Stopped)
    }
}

impl HapticBackend for GamepadManager {
    fn start_engine(&self, id: DeviceId) -> Result<(), HapticError> {
        if self.supports_rumble(id) {
            Ok(())
        } else {
            Err(HapticError::Unsupported(id))
        }
    }

    fn rumble(
        &self,
        id: DeviceId,
        strength: f32,
        duration: Duration,
    ) -> Result<(), HapticError> {
        let level = (strength.clamp(0.0, 1.0) * 65535.0).round() as u16;
        let ms = duration.as_millis().min(u128::from(u32::MAX)) as u32;
        self.inner
            .cmd_tx
            .send(Command::Rumble { id, low: level, high: level, ms })
            .map_err(|e| HapticError::Engine(e.to_string()))
    }
}
