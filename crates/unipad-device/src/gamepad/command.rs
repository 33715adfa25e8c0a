use crate::types::DeviceId;

/// Internal commands sent to the runtime thread.
pub(crate) enum Command {
    Rumble { id: DeviceId, low: u16, high: u16, ms: u32 },
    StopRumble { id: DeviceId },
}
