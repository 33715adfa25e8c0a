use crate::ir::{DeviceInputEvent, EventBatch, InputKind};
use crate::source::InputSource;
use crate::types::DeviceInfo;

use super::element::{GamepadElement, GamepadLayout};

/// One value-changed notification from the gamepad framework.
///
/// Buttons report pressure in [0.0, 1.0]; stick axes are up/right positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadChange {
    pub element: GamepadElement,
    pub value: f32,
}

/// Turns framework notifications for one controller into IR.
pub struct GamepadAdapter {
    info: DeviceInfo,
    layout: GamepadLayout,
}

impl GamepadAdapter {
    pub fn new(info: DeviceInfo, layout: GamepadLayout) -> Self {
        Self { info, layout }
    }

    pub fn layout(&self) -> GamepadLayout {
        self.layout
    }
}

impl InputSource for GamepadAdapter {
    type Raw = GamepadChange;

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn translate(&self, raw: &GamepadChange, out: &mut EventBatch) {
        if !self.layout.has(raw.element) {
            return;
        }
        let id = self.info.id;
        let name = raw.element.name();
        out.push(match raw.element.kind() {
            InputKind::Button => DeviceInputEvent::button(id, name, raw.value > 0.5),
            InputKind::Axis => DeviceInputEvent::axis(id, name, raw.value),
            InputKind::Trigger => DeviceInputEvent::trigger(id, name, raw.value),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceId, DeviceKind};

    fn adapter(layout: GamepadLayout) -> GamepadAdapter {
        GamepadAdapter::new(
            DeviceInfo {
                id: DeviceId::gamepad(0),
                vendor_name: "Xbox Wireless Controller".into(),
                vendor_id: 0x045e,
                product_id: 0x0b13,
                kind: DeviceKind::Gamepad,
                capabilities: layout.capabilities(false),
            },
            layout,
        )
    }

    fn translate(a: &GamepadAdapter, element: GamepadElement, value: f32) -> EventBatch {
        let mut out = EventBatch::new();
        a.translate(&GamepadChange { element, value }, &mut out);
        out
    }

    #[test]
    fn buttons_use_pressure_threshold() {
        let a = adapter(GamepadLayout::Extended);
        let out = translate(&a, GamepadElement::ButtonA, 0.7);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InputKind::Button);
        assert!(out[0].is_pressed());
        assert!(!translate(&a, GamepadElement::ButtonA, 0.2)[0].is_pressed());
    }

    #[test]
    fn axes_and_triggers_are_clamped() {
        let a = adapter(GamepadLayout::Extended);
        let out = translate(&a, GamepadElement::LeftThumbstickX, -1.7);
        assert_eq!(out[0].kind, InputKind::Axis);
        assert!((out[0].value + 1.0).abs() < f32::EPSILON);
        let out = translate(&a, GamepadElement::RightTrigger, 1.3);
        assert_eq!(out[0].kind, InputKind::Trigger);
        assert!((out[0].value - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn micro_layout_ignores_extended_elements() {
        let a = adapter(GamepadLayout::Micro);
        assert!(translate(&a, GamepadElement::LeftShoulder, 1.0).is_empty());
        assert!(translate(&a, GamepadElement::LeftThumbstickX, 0.5).is_empty());
        assert_eq!(translate(&a, GamepadElement::DpadLeft, 1.0).len(), 1);
        assert_eq!(translate(&a, GamepadElement::ButtonX, 1.0).len(), 1);
    }
}
