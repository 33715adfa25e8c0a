use smallvec::SmallVec;

use crate::types::DeviceId;

/// Broad shape of a control, which decides how its value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Digital control; value is 0.0 or 1.0.
    Button,
    /// Signed axis or half-axis; value is in [-1.0, 1.0].
    Axis,
    /// Unsigned analog trigger; value is in [0.0, 1.0].
    Trigger,
}

/// Source-native identifier of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCode {
    /// Vendor or framework control name, e.g. `"ButtonA"` or `"ZL"`.
    Name(&'static str),
    /// Keyboard scan code (USB HID keyboard usage id).
    Scan(u16),
}

impl ControlCode {
    pub fn name(&self) -> Option<&'static str> {
        match self {
            ControlCode::Name(name) => Some(name),
            ControlCode::Scan(_) => None,
        }
    }
}

/// Adapter-neutral input event produced by every source before mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceInputEvent {
    pub device_id: DeviceId,
    pub kind: InputKind,
    pub code: ControlCode,
    pub value: f32,
}

impl DeviceInputEvent {
    pub fn button(device_id: DeviceId, name: &'static str, pressed: bool) -> Self {
        Self {
            device_id,
            kind: InputKind::Button,
            code: ControlCode::Name(name),
            value: if pressed { 1.0 } else { 0.0 },
        }
    }

    pub fn axis(device_id: DeviceId, name: &'static str, value: f32) -> Self {
        Self {
            device_id,
            kind: InputKind::Axis,
            code: ControlCode::Name(name),
            value: value.clamp(-1.0, 1.0),
        }
    }

    pub fn trigger(device_id: DeviceId, name: &'static str, value: f32) -> Self {
        Self {
            device_id,
            kind: InputKind::Trigger,
            code: ControlCode::Name(name),
            value: value.clamp(0.0, 1.0),
        }
    }

    pub fn key(device_id: DeviceId, scan_code: u16, pressed: bool) -> Self {
        Self {
            device_id,
            kind: InputKind::Button,
            code: ControlCode::Scan(scan_code),
            value: if pressed { 1.0 } else { 0.0 },
        }
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.value > 0.5
    }
}

/// Events produced by one raw callback, kept inline for the common case.
pub type EventBatch = SmallVec<[DeviceInputEvent; 8]>;
