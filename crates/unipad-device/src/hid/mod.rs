//! Bluetooth HID decoding for the Nintendo Switch Pro Controller.
//!
//! Reports are decoded by table into a [`ButtonState`] snapshot, which is
//! then diffed against the previous one and forwarded as IR.

mod device;
mod layout;
mod state;

pub use device::HidDevice;
pub use layout::{decode, HidAxis, HidButton, REPORT_FULL, REPORT_STANDARD};
pub use layout::{FULL_REPORT_LEN, STANDARD_REPORT_LEN};
pub use state::{normalize_axis, ButtonState, NormalizedSticks};
