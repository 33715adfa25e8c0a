use unipad_bit_mask::Bitmask;

use crate::ir::{DeviceInputEvent, EventBatch};
use crate::source::InputSource;
use crate::types::{DeviceId, DeviceInfo, DeviceKind};

/// Key-down or key-up delivered by the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// USB HID keyboard usage id.
    pub scan_code: u16,
    pub pressed: bool,
    /// Set by the host for auto-repeated key-downs.
    pub repeat: bool,
}

impl KeyEvent {
    pub const fn down(scan_code: u16) -> Self {
        Self { scan_code, pressed: true, repeat: false }
    }

    pub const fn up(scan_code: u16) -> Self {
        Self { scan_code, pressed: false, repeat: false }
    }
}

/// Forwards scan codes as IR. Binding scan codes to buttons happens per
/// player downstream, so this adapter does no lookup of its own.
pub struct KeyboardAdapter {
    info: DeviceInfo,
}

impl KeyboardAdapter {
    pub fn new(index: u32) -> Self {
        Self {
            info: DeviceInfo {
                id: DeviceId::keyboard(index),
                vendor_name: "Keyboard".into(),
                vendor_id: 0,
                product_id: 0,
                kind: DeviceKind::Keyboard,
                capabilities: Bitmask::empty(),
            },
        }
    }
}

impl Default for KeyboardAdapter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl InputSource for KeyboardAdapter {
    type Raw = KeyEvent;

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn translate(&self, raw: &KeyEvent, out: &mut EventBatch) {
        if raw.repeat {
            return;
        }
        out.push(DeviceInputEvent::key(self.info.id, raw.scan_code, raw.pressed));
    }
}
