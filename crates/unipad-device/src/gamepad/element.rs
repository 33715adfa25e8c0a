use crate::ir::InputKind;
use crate::types::Capability;
use unipad_bit_mask::Bitmask;

/// Controls reported by the platform gamepad framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadElement {
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    ButtonMenu,
    ButtonOptions,
    ButtonHome,
    ButtonShare,
    Touchpad,
    LeftThumbstickButton,
    RightThumbstickButton,
    LeftThumbstickX,
    LeftThumbstickY,
    RightThumbstickX,
    RightThumbstickY,
}

impl GamepadElement {
    pub fn name(self) -> &'static str {
        match self {
            GamepadElement::ButtonA => "ButtonA",
            GamepadElement::ButtonB => "ButtonB",
            GamepadElement::ButtonX => "ButtonX",
            GamepadElement::ButtonY => "ButtonY",
            GamepadElement::LeftShoulder => "LeftShoulder",
            GamepadElement::RightShoulder => "RightShoulder",
            GamepadElement::LeftTrigger => "LeftTrigger",
            GamepadElement::RightTrigger => "RightTrigger",
            GamepadElement::DpadUp => "DpadUp",
            GamepadElement::DpadDown => "DpadDown",
            GamepadElement::DpadLeft => "DpadLeft",
            GamepadElement::DpadRight => "DpadRight",
            GamepadElement::ButtonMenu => "ButtonMenu",
            GamepadElement::ButtonOptions => "ButtonOptions",
            GamepadElement::ButtonHome => "ButtonHome",
            GamepadElement::ButtonShare => "ButtonShare",
            GamepadElement::Touchpad => "Touchpad",
            GamepadElement::LeftThumbstickButton => "LeftThumbstickButton",
            GamepadElement::RightThumbstickButton => "RightThumbstickButton",
            GamepadElement::LeftThumbstickX => "LeftThumbstickX",
            GamepadElement::LeftThumbstickY => "LeftThumbstickY",
            GamepadElement::RightThumbstickX => "RightThumbstickX",
            GamepadElement::RightThumbstickY => "RightThumbstickY",
        }
    }

    pub fn kind(self) -> InputKind {
        match self {
            GamepadElement::LeftTrigger | GamepadElement::RightTrigger => {
                InputKind::Trigger
            }
            GamepadElement::LeftThumbstickX
            | GamepadElement::LeftThumbstickY
            | GamepadElement::RightThumbstickX
            | GamepadElement::RightThumbstickY => InputKind::Axis,
            _ => InputKind::Button,
        }
    }
}

/// Profile exposed by the framework for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamepadLayout {
    /// Full layout: two sticks, two triggers, shoulders, D-pad.
    #[default]
    Extended,
    /// Remote-style layout: D-pad, A, X and menu only.
    Micro,
}

impl GamepadLayout {
    pub fn has(self, element: GamepadElement) -> bool {
        match self {
            GamepadLayout::Extended => true,
            GamepadLayout::Micro => matches!(
                element,
                GamepadElement::DpadUp
                    | GamepadElement::DpadDown
                    | GamepadElement::DpadLeft
                    | GamepadElement::DpadRight
                    | GamepadElement::ButtonA
                    | GamepadElement::ButtonX
                    | GamepadElement::ButtonMenu
            ),
        }
    }

    pub fn capabilities(self, haptics: bool) -> Bitmask<Capability> {
        let mut caps = match self {
            GamepadLayout::Extended => Bitmask::new(&[
                Capability::ExtendedButtons,
                Capability::Dpad,
                Capability::TwoAnalogSticks,
                Capability::TwoTriggers,
            ]),
            GamepadLayout::Micro => Bitmask::new(&[Capability::Dpad]),
        };
        caps.set(Capability::Haptics, haptics);
        caps
    }
}
