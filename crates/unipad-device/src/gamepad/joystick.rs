use crate::ir::{DeviceInputEvent, EventBatch};
use crate::source::InputSource;
use crate::types::DeviceInfo;

pub const MAX_JOYSTICK_AXES: usize = 4;
pub const MAX_JOYSTICK_BUTTONS: usize = 12;

static HALF_AXES: [(&str, &str); MAX_JOYSTICK_AXES] = [
    ("Axis0-", "Axis0+"),
    ("Axis1-", "Axis1+"),
    ("Axis2-", "Axis2+"),
    ("Axis3-", "Axis3+"),
];

static BUTTONS: [&str; MAX_JOYSTICK_BUTTONS] = [
    "Button0", "Button1", "Button2", "Button3", "Button4", "Button5", "Button6",
    "Button7", "Button8", "Button9", "Button10", "Button11",
];

/// Raw joystick notification addressed by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoystickChange {
    /// Signed axis value in [-1.0, 1.0], up/right positive.
    Axis { index: u8, value: f32 },
    Button { index: u8, pressed: bool },
}

/// Adapter for devices without a framework profile.
///
/// Each axis is split into a negative and a positive half so that mapping
/// tables can bind either edge independently.
pub struct JoystickAdapter {
    info: DeviceInfo,
}

impl JoystickAdapter {
    pub fn new(info: DeviceInfo) -> Self {
        Self { info }
    }
}

impl InputSource for JoystickAdapter {
    type Raw = JoystickChange;

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn translate(&self, raw: &JoystickChange, out: &mut EventBatch) {
        let id = self.info.id;
        match *raw {
            JoystickChange::Axis { index, value } => {
                let Some(&(neg, pos)) = HALF_AXES.get(index as usize) else {
                    return;
                };
                let value = value.clamp(-1.0, 1.0);
                out.push(DeviceInputEvent::axis(id, neg, (-value).max(0.0)));
                out.push(DeviceInputEvent::axis(id, pos, value.max(0.0)));
            }
            JoystickChange::Button { index, pressed } => {
                if let Some(&name) = BUTTONS.get(index as usize) {
                    out.push(DeviceInputEvent::button(id, name, pressed));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceId, DeviceKind};
    use unipad_bit_mask::Bitmask;

    fn adapter() -> JoystickAdapter {
        JoystickAdapter::new(DeviceInfo {
            id: DeviceId::gamepad(9),
            vendor_name: "Arcade Stick".into(),
            vendor_id: 0,
            product_id: 0,
            kind: DeviceKind::Joystick,
            capabilities: Bitmask::empty(),
        })
    }

    #[test]
    fn axis_splits_into_half_axes() {
        let mut out = EventBatch::new();
        adapter().translate(&JoystickChange::Axis { index: 1, value: -0.6 }, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].code.name(), Some("Axis1-"));
        assert!((out[0].value - 0.6).abs() < 1e-6);
        assert_eq!(out[1].code.name(), Some("Axis1+"));
        assert!(out[1].value.abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut out = EventBatch::new();
        let a = adapter();
        a.translate(&JoystickChange::Axis { index: 9, value: 1.0 }, &mut out);
        a.translate(&JoystickChange::Button { index: 40, pressed: true }, &mut out);
        assert!(out.is_empty());
        a.translate(&JoystickChange::Button { index: 3, pressed: true }, &mut out);
        assert_eq!(out[0].code.name(), Some("Button3"));
    }
}
