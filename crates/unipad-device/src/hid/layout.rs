use unipad_bit_derive::Bit;

use super::state::ButtonState;

/// Report id of the standard input report.
pub const REPORT_STANDARD: u8 = 0x30;
/// Report id of the full report with trailing motion data.
pub const REPORT_FULL: u8 = 0x21;

pub const STANDARD_REPORT_LEN: usize = 12;
pub const FULL_REPORT_LEN: usize = 49;

/// The 18 boolean controls carried by an input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum HidButton {
    Y,
    X,
    B,
    A,
    R,
    ZR,
    Minus,
    Plus,
    RightStickClick,
    LeftStickClick,
    Home,
    Capture,
    L,
    ZL,
    Up,
    Down,
    Left,
    Right,
}

impl HidButton {
    /// Control name used in IR and mapping tables.
    pub fn name(self) -> &'static str {
        match self {
            HidButton::Y => "Y",
            HidButton::X => "X",
            HidButton::B => "B",
            HidButton::A => "A",
            HidButton::R => "R",
            HidButton::ZR => "ZR",
            HidButton::Minus => "Minus",
            HidButton::Plus => "Plus",
            HidButton::RightStickClick => "RightStickClick",
            HidButton::LeftStickClick => "LeftStickClick",
            HidButton::Home => "Home",
            HidButton::Capture => "Capture",
            HidButton::L => "L",
            HidButton::ZL => "ZL",
            HidButton::Up => "Up",
            HidButton::Down => "Down",
            HidButton::Left => "Left",
            HidButton::Right => "Right",
        }
    }
}

/// Stick axes in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HidAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl HidAxis {
    pub const ALL: [HidAxis; 4] =
        [HidAxis::LeftX, HidAxis::LeftY, HidAxis::RightX, HidAxis::RightY];

    pub fn name(self) -> &'static str {
        match self {
            HidAxis::LeftX => "LeftStickX",
            HidAxis::LeftY => "LeftStickY",
            HidAxis::RightX => "RightStickX",
            HidAxis::RightY => "RightStickY",
        }
    }

    /// Byte offset of the axis inside a report.
    pub(crate) fn offset(self) -> usize {
        match self {
            HidAxis::LeftX => 6,
            HidAxis::LeftY => 7,
            HidAxis::RightX => 9,
            HidAxis::RightY => 10,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn is_vertical(self) -> bool {
        matches!(self, HidAxis::LeftY | HidAxis::RightY)
    }
}

struct BitField {
    byte: usize,
    bit: u8,
    button: HidButton,
}

const fn field(byte: usize, bit: u8, button: HidButton) -> BitField {
    BitField { byte, bit, button }
}

const BUTTON_FIELDS: [BitField; 14] = [
    field(3, 0, HidButton::Y),
    field(3, 1, HidButton::X),
    field(3, 2, HidButton::B),
    field(3, 3, HidButton::A),
    field(3, 6, HidButton::R),
    field(3, 7, HidButton::ZR),
    field(4, 0, HidButton::Minus),
    field(4, 1, HidButton::Plus),
    field(4, 2, HidButton::RightStickClick),
    field(4, 3, HidButton::LeftStickClick),
    field(4, 4, HidButton::Home),
    field(4, 5, HidButton::Capture),
    field(4, 6, HidButton::L),
    field(4, 7, HidButton::ZL),
];

const DPAD_BYTE: usize = 5;

/// Clock-position values asserting each direction. Diagonals appear in two
/// sets; values 8..=15 assert nothing.
const DPAD_DIRECTIONS: [(HidButton, [u8; 3]); 4] = [
    (HidButton::Up, [0, 1, 7]),
    (HidButton::Right, [1, 2, 3]),
    (HidButton::Down, [3, 4, 5]),
    (HidButton::Left, [5, 6, 7]),
];

fn min_len(report_id: u8) -> Option<usize> {
    match report_id {
        REPORT_STANDARD => Some(STANDARD_REPORT_LEN),
        REPORT_FULL => Some(FULL_REPORT_LEN),
        _ => None,
    }
}

/// Decode one input report.
///
/// Returns `None` for unknown report ids and for reports shorter than the
/// minimum length of their id. Full reports share the standard layout; the
/// trailing motion bytes are ignored.
pub fn decode(report: &[u8]) -> Option<ButtonState> {
    let report_id = *report.first()?;
    let min = min_len(report_id)?;
    if report.len() < min {
        return None;
    }

    let mut state = ButtonState::neutral();
    for f in &BUTTON_FIELDS {
        state.buttons.set(f.button, report[f.byte] & (1 << f.bit) != 0);
    }

    let dpad = report[DPAD_BYTE] & 0x0f;
    for (button, values) in &DPAD_DIRECTIONS {
        state.buttons.set(*button, values.contains(&dpad));
    }

    for axis in HidAxis::ALL {
        state.sticks[axis.index()] = report[axis.offset()];
    }

    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(b3: u8, b4: u8, b5: u8) -> [u8; STANDARD_REPORT_LEN] {
        [REPORT_STANDARD, 0, 0, b3, b4, b5, 128, 128, 0, 128, 128, 0]
    }

    fn dpad(value: u8) -> [bool; 4] {
        let state = decode(&standard(0, 0, value)).expect("valid report");
        [
            state.pressed(HidButton::Up),
            state.pressed(HidButton::Right),
            state.pressed(HidButton::Down),
            state.pressed(HidButton::Left),
        ]
    }

    #[test]
    fn right_cluster_bits() {
        let state = decode(&standard(0x08, 0, 0x08)).unwrap();
        assert!(state.pressed(HidButton::A));
        assert_eq!(state.buttons.count(), 1);

        let state = decode(&standard(0b1100_0111, 0, 0x08)).unwrap();
        for b in [HidButton::Y, HidButton::X, HidButton::B, HidButton::R, HidButton::ZR] {
            assert!(state.pressed(b), "{b:?}");
        }
        assert!(!state.pressed(HidButton::A));
    }

    #[test]
    fn left_cluster_and_system_bits() {
        let expected = [
            HidButton::Minus,
            HidButton::Plus,
            HidButton::RightStickClick,
            HidButton::LeftStickClick,
            HidButton::Home,
            HidButton::Capture,
            HidButton::L,
            HidButton::ZL,
        ];
        for (bit, button) in expected.iter().enumerate() {
            let state = decode(&standard(0, 1 << bit, 0x08)).unwrap();
            assert!(state.pressed(*button), "{button:?}");
            assert_eq!(state.buttons.count(), 1);
        }
    }

    #[test]
    fn dpad_clock_positions() {
        // [up, right, down, left]
        assert_eq!(dpad(0), [true, false, false, false]);
        assert_eq!(dpad(1), [true, true, false, false]);
        assert_eq!(dpad(2), [false, true, false, false]);
        assert_eq!(dpad(3), [false, true, true, false]);
        assert_eq!(dpad(4), [false, false, true, false]);
        assert_eq!(dpad(5), [false, false, true, true]);
        assert_eq!(dpad(6), [false, false, false, true]);
        assert_eq!(dpad(7), [true, false, false, true]);
        assert_eq!(dpad(8), [false; 4]);
        assert_eq!(dpad(15), [false; 4]);
    }

    #[test]
    fn dpad_ignores_high_nibble() {
        assert_eq!(dpad(0xf2), dpad(0x02));
    }

    #[test]
    fn diagonals_assert_exactly_two_directions() {
        for value in [1, 3, 5, 7] {
            assert_eq!(dpad(value).iter().filter(|d| **d).count(), 2, "{value}");
        }
    }

    #[test]
    fn sticks_are_read_from_their_offsets() {
        let mut report = standard(0, 0, 8);
        report[6] = 10;
        report[7] = 20;
        report[8] = 99;
        report[9] = 30;
        report[10] = 40;
        report[11] = 99;
        let state = decode(&report).unwrap();
        assert_eq!(state.sticks, [10, 20, 30, 40]);
    }

    #[test]
    fn short_reports_are_dropped() {
        assert!(decode(&[]).is_none());
        assert!(decode(&standard(0x08, 0, 8)[..11]).is_none());
        let mut full = [0u8; FULL_REPORT_LEN];
        full[0] = REPORT_FULL;
        assert!(decode(&full[..48]).is_none());
        assert!(decode(&full[..12]).is_none());
    }

    #[test]
    fn unknown_report_ids_are_ignored() {
        let mut report = standard(0x08, 0, 8);
        report[0] = 0x3f;
        assert!(decode(&report).is_none());
    }

    #[test]
    fn full_report_decodes_like_standard() {
        let standard = standard(0x08, 0x40, 0x01);
        let mut full = [0xaau8; 64];
        full[..STANDARD_REPORT_LEN].copy_from_slice(&standard);
        full[0] = REPORT_FULL;
        assert_eq!(decode(&full), decode(&standard));
    }

    #[test]
    fn decoding_is_deterministic() {
        let report = standard(0x5a, 0xa5, 0x03);
        assert_eq!(decode(&report), decode(&report));
    }
}
