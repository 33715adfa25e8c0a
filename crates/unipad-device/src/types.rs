use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unipad_bit_derive::Bit;
use unipad_bit_mask::Bitmask;

/// Canonical buttons understood by emulation cores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Bit, Serialize, Deserialize,
)]
pub enum EmulatorButton {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    L,
    R,
    ZL,
    ZR,
    Start,
    Select,
    Home,
    Capture,
    CUp,
    CDown,
    CLeft,
    CRight,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalogStick {
    Left,
    Right,
}

/// One component of an analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickAxis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    Left,
    Right,
}

impl Trigger {
    /// The digital button a fully pulled trigger also asserts.
    pub fn digital(self) -> EmulatorButton {
        match self {
            Trigger::Left => EmulatorButton::ZL,
            Trigger::Right => EmulatorButton::ZR,
        }
    }
}

/// Control classes a physical device may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Capability {
    ExtendedButtons,
    Dpad,
    TwoAnalogSticks,
    TwoTriggers,
    Haptics,
}

#[derive(Debug, Error)]
#[error("player slot out of range: {0}")]
pub struct InvalidPlayerSlot(pub u8);

/// Logical input destination, 0 through 3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerSlot(u8);

impl PlayerSlot {
    pub const COUNT: usize = 4;
    pub const ALL: [PlayerSlot; Self::COUNT] =
        [PlayerSlot(0), PlayerSlot(1), PlayerSlot(2), PlayerSlot(3)];

    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = InvalidPlayerSlot;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidPlayerSlot(value))
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const GAMEPAD_TAG: u64 = 1 << 32;
const HID_TAG: u64 = 2 << 32;
const KEYBOARD_TAG: u64 = 3 << 32;

/// Stable identifier of a physical device.
///
/// The upper half namespaces the source so that an SDL instance id and a
/// Bluetooth location id never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    pub const fn gamepad(instance: u32) -> Self {
        Self(GAMEPAD_TAG | instance as u64)
    }

    pub const fn hid(location: u32) -> Self {
        Self(HID_TAG | location as u64)
    }

    pub const fn keyboard(index: u32) -> Self {
        Self(KEYBOARD_TAG | index as u64)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_keyboard(self) -> bool {
        self.0 & !(u32::MAX as u64) == KEYBOARD_TAG
    }

    /// The source-local part of the id (SDL instance, HID location, ...).
    pub const fn local(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.0 >> 32 {
            1 => "gamepad",
            2 => "hid",
            3 => "keyboard",
            _ => "device",
        };
        write!(f, "{source}:{:#x}", self.local())
    }
}

/// How a device delivers its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Gamepad,
    Joystick,
    Hid,
    Keyboard,
}

/// Named mapping-table scope shared by all devices of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerClass {
    Xbox,
    PlayStation,
    Switch,
    Generic,
}

const VENDOR_MICROSOFT: u16 = 0x045e;
const VENDOR_SONY: u16 = 0x054c;
const VENDOR_NINTENDO: u16 = 0x057e;

impl ControllerClass {
    pub const ALL: [ControllerClass; 4] = [
        ControllerClass::Xbox,
        ControllerClass::PlayStation,
        ControllerClass::Switch,
        ControllerClass::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControllerClass::Xbox => "Xbox",
            ControllerClass::PlayStation => "PlayStation",
            ControllerClass::Switch => "Switch",
            ControllerClass::Generic => "Generic",
        }
    }

    /// Pick a class by USB vendor id, falling back to the vendor name.
    pub fn classify(vendor_id: u16, vendor_name: &str) -> Self {
        match vendor_id {
            VENDOR_MICROSOFT => return ControllerClass::Xbox,
            VENDOR_SONY => return ControllerClass::PlayStation,
            VENDOR_NINTENDO => return ControllerClass::Switch,
            _ => {}
        }
        let name = vendor_name.to_lowercase();
        if name.contains("xbox") || name.contains("xinput") {
            ControllerClass::Xbox
        } else if ["playstation", "dualshock", "dualsense", "ps4", "ps5"]
            .iter()
            .any(|k| name.contains(k))
        {
            ControllerClass::PlayStation
        } else if ["pro controller", "joy-con", "nintendo", "switch"]
            .iter()
            .any(|k| name.contains(k))
        {
            ControllerClass::Switch
        } else {
            ControllerClass::Generic
        }
    }
}

impl fmt::Display for ControllerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device meta information that remains stable while it is connected.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub vendor_name: Box<str>,
    pub vendor_id: u16,
    pub product_id: u16,
    pub kind: DeviceKind,
    pub capabilities: Bitmask<Capability>,
}

impl DeviceInfo {
    pub fn class(&self) -> ControllerClass {
        ControllerClass::classify(self.vendor_id, &self.vendor_name)
    }
}
