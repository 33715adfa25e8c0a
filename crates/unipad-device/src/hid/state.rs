use unipad_bit_mask::Bitmask;

use super::layout::{HidAxis, HidButton};

const AXIS_CENTER: u8 = 128;

/// Snapshot of one decoded input report.
///
/// Replaced wholesale on every report, never patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub buttons: Bitmask<HidButton>,
    /// Raw stick bytes in [`HidAxis`] order, centered at 128.
    pub sticks: [u8; 4],
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Stick positions in emulator space: x right-positive, y up-positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedSticks {
    pub left: (f32, f32),
    pub right: (f32, f32),
}

/// Map a raw stick byte to [-1.0, 1.0).
#[inline]
pub fn normalize_axis(raw: u8) -> f32 {
    (f32::from(raw) - f32::from(AXIS_CENTER)) / 128.0
}

impl ButtonState {
    /// Nothing pressed, both sticks centered.
    pub const fn neutral() -> Self {
        Self {
            buttons: Bitmask::empty(),
            sticks: [AXIS_CENTER; 4],
        }
    }

    #[inline]
    pub fn pressed(&self, button: HidButton) -> bool {
        self.buttons.contains(button)
    }

    /// Normalized value of one axis; vertical axes are inverted so that
    /// pushing the stick up yields a positive value.
    pub fn axis(&self, axis: HidAxis) -> f32 {
        let value = normalize_axis(self.sticks[axis.index()]);
        if axis.is_vertical() {
            -value
        } else {
            value
        }
    }

    pub fn normalized(&self) -> NormalizedSticks {
        NormalizedSticks {
            left: (self.axis(HidAxis::LeftX), self.axis(HidAxis::LeftY)),
            right: (self.axis(HidAxis::RightX), self.axis(HidAxis::RightY)),
        }
    }
}
