mod channel;
mod haptics;
mod ir;
mod source;
mod types;

pub mod gamepad;
pub mod hid;
pub mod keyboard;

pub use crate::channel::{channel, Delivery, EventReceiver, EventSender, SourceEvent};
pub use crate::haptics::{HapticBackend, HapticError, NoHaptics};
pub use crate::ir::{ControlCode, DeviceInputEvent, EventBatch, InputKind};
pub use crate::source::InputSource;
pub use crate::types::{
    AnalogStick, Capability, ControllerClass, DeviceId, DeviceInfo, DeviceKind,
    EmulatorButton, PlayerSlot, StickAxis, Trigger,
};

pub use unipad_bit_mask::Bitmask;
