//! Test doubles for hosts that drive the subsystem.

use std::sync::{Arc, Mutex};

use unipad_device::{AnalogStick, EmulatorButton, PlayerSlot, Trigger};

use crate::consumer::InputConsumer;

/// One call received by a [`RecordingConsumer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsumerCall {
    Button { player: PlayerSlot, button: EmulatorButton, pressed: bool },
    Analog { player: PlayerSlot, stick: AnalogStick, x: f32, y: f32 },
    Trigger { player: PlayerSlot, trigger: Trigger, value: f32 },
}

/// Shared view of the calls recorded by a consumer that has been handed
/// over to the router.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<ConsumerCall>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<ConsumerCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the recorded calls and clears the log.
    pub fn take(&self) -> Vec<ConsumerCall> {
        self.calls
            .lock()
            .map(|mut c| std::mem::take(&mut *c))
            .unwrap_or_default()
    }

    fn push(&self, call: ConsumerCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// Consumer that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingConsumer {
    log: CallLog,
}

impl RecordingConsumer {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl InputConsumer for RecordingConsumer {
    fn set_button_state(&mut self, player: PlayerSlot, button: EmulatorButton, pressed: bool) {
        self.log.push(ConsumerCall::Button { player, button, pressed });
    }

    fn set_analog_state(&mut self, player: PlayerSlot, stick: AnalogStick, x: f32, y: f32) {
        self.log.push(ConsumerCall::Analog { player, stick, x, y });
    }

    fn set_trigger_state(&mut self, player: PlayerSlot, trigger: Trigger, value: f32) {
        self.log.push(ConsumerCall::Trigger { player, trigger, value });
    }
}
