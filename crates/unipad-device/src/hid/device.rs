use std::sync::Mutex;

use unipad_bit_mask::Bitmask;

use crate::channel::{Delivery, EventSender};
use crate::ir::{DeviceInputEvent, EventBatch};
use crate::source::InputSource;
use crate::types::{Capability, DeviceId, DeviceInfo, DeviceKind};

use super::layout::{decode, HidAxis};
use super::state::ButtonState;

const NINTENDO_VENDOR_ID: u16 = 0x057e;
const PRO_CONTROLLER_PRODUCT_ID: u16 = 0x2009;

struct Shared {
    current: ButtonState,
    open: bool,
}

/// A Bluetooth HID gamepad fed by raw input reports.
///
/// Reports arrive on the Bluetooth run-loop thread. Decoding, diffing and
/// forwarding of one report happen under a single lock, so the snapshot is
/// never observed half-written and per-device ordering is kept.
pub struct HidDevice {
    info: DeviceInfo,
    shared: Mutex<Shared>,
}

impl HidDevice {
    /// A Switch Pro Controller at the given Bluetooth location id.
    pub fn pro_controller(location: u32) -> Self {
        Self::new(DeviceInfo {
            id: DeviceId::hid(location),
            vendor_name: "Pro Controller".into(),
            vendor_id: NINTENDO_VENDOR_ID,
            product_id: PRO_CONTROLLER_PRODUCT_ID,
            kind: DeviceKind::Hid,
            capabilities: Bitmask::new(&[
                Capability::ExtendedButtons,
                Capability::Dpad,
                Capability::TwoAnalogSticks,
                Capability::TwoTriggers,
            ]),
        })
    }

    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            shared: Mutex::new(Shared {
                current: ButtonState::neutral(),
                open: true,
            }),
        }
    }

    /// Last state forwarded to the ingress channel.
    pub fn snapshot(&self) -> ButtonState {
        self.shared
            .lock()
            .map(|s| s.current)
            .unwrap_or_default()
    }

    /// Decode a report and forward what changed. Malformed reports are
    /// dropped silently.
    pub fn on_report(&self, report: &[u8], tx: &EventSender) {
        self.feed(report, tx);
    }
}

fn diff(id: DeviceId, prev: &ButtonState, next: &ButtonState, out: &mut EventBatch) {
    for button in prev.buttons.changed(&next.buttons) {
        out.push(DeviceInputEvent::button(id, button.name(), next.pressed(button)));
    }
    for axis in HidAxis::ALL {
        if prev.sticks[axis.index()] != next.sticks[axis.index()] {
            out.push(DeviceInputEvent::axis(id, axis.name(), next.axis(axis)));
        }
    }
}

/// Forwards the changes from `current` to `next`, moving `current` forward
/// only for controls whose event was queued. A change dropped on a full
/// channel is sent again with the next report.
fn forward(id: DeviceId, current: &mut ButtonState, next: &ButtonState, tx: &EventSender) {
    for button in current.buttons.changed(&next.buttons) {
        let pressed = next.pressed(button);
        match tx.offer(DeviceInputEvent::button(id, button.name(), pressed)) {
            Delivery::Queued => current.buttons.set(button, pressed),
            Delivery::Dropped => {}
            Delivery::Closed => return,
        }
    }
    for axis in HidAxis::ALL {
        let i = axis.index();
        if current.sticks[i] == next.sticks[i] {
            continue;
        }
        match tx.offer(DeviceInputEvent::axis(id, axis.name(), next.axis(axis))) {
            Delivery::Queued => current.sticks[i] = next.sticks[i],
            Delivery::Dropped => {}
            Delivery::Closed => return,
        }
    }
}

impl InputSource for HidDevice {
    type Raw = [u8];

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn translate(&self, raw: &[u8], out: &mut EventBatch) {
        let Ok(mut shared) = self.shared.lock() else {
            return;
        };
        if !shared.open {
            return;
        }
        if let Some(next) = decode(raw) {
            let prev = std::mem::replace(&mut shared.current, next);
            diff(self.info.id, &prev, &next, out);
        }
    }

    fn feed(&self, raw: &[u8], tx: &EventSender) {
        let Ok(mut shared) = self.shared.lock() else {
            return;
        };
        if !shared.open {
            return;
        }
        if let Some(next) = decode(raw) {
            forward(self.info.id, &mut shared.current, &next, tx);
        }
    }

    fn detach(&self, tx: &EventSender) {
        // Waits for an in-flight report, so nothing follows the disconnect.
        match self.shared.lock() {
            Ok(mut shared) => shared.open = false,
            Err(_) => return,
        }
        tx.disconnected(self.info.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{channel, SourceEvent};
    use crate::ir::InputKind;
    use crate::hid::layout::{HidButton, REPORT_STANDARD};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn report(b3: u8, b5: u8, sticks: [u8; 4]) -> Vec<u8> {
        vec![
            REPORT_STANDARD, 0, 0, b3, 0, b5, sticks[0], sticks[1], 0, sticks[2],
            sticks[3], 0,
        ]
    }

    fn inputs(rx: &crate::EventReceiver) -> Vec<DeviceInputEvent> {
        rx.try_iter()
            .filter_map(|e| match e {
                SourceEvent::Input(ev) => Some(ev),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn forwards_only_changes() {
        let (tx, rx) = channel(64);
        let device = HidDevice::pro_controller(7);

        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code.name(), Some("A"));
        assert!(events[0].is_pressed());

        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);
        assert!(inputs(&rx).is_empty());

        device.on_report(&report(0x00, 0x08, [128; 4]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_pressed());
    }

    #[test]
    fn stick_changes_are_normalized() {
        let (tx, rx) = channel(64);
        let device = HidDevice::pro_controller(1);
        device.on_report(&report(0, 0x08, [255, 0, 128, 128]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == InputKind::Axis));
        assert_eq!(events[0].code.name(), Some("LeftStickX"));
        assert!(events[0].value > 0.99);
        assert_eq!(events[1].code.name(), Some("LeftStickY"));
        assert!((events[1].value - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_reports_keep_previous_snapshot() {
        let (tx, rx) = channel(64);
        let device = HidDevice::pro_controller(1);
        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);
        let before = device.snapshot();
        device.on_report(&[REPORT_STANDARD, 0, 0, 0xff], &tx);
        device.on_report(&[0x99; 12], &tx);
        device.on_report(&[], &tx);
        assert_eq!(device.snapshot(), before);
        assert_eq!(inputs(&rx).len(), 1);
    }

    #[test]
    fn nothing_is_forwarded_after_detach() {
        let (tx, rx) = channel(64);
        let device = HidDevice::pro_controller(3);
        device.attach(&tx);
        device.detach(&tx);
        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SourceEvent::Connected(_)));
        assert!(matches!(events[1], SourceEvent::Disconnected(_)));
    }

    #[test]
    fn release_dropped_on_full_channel_is_resent() {
        let (tx, rx) = channel(1);
        let device = HidDevice::pro_controller(2);

        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);
        device.on_report(&report(0x00, 0x08, [128; 4]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_pressed());
        assert!(device.snapshot().pressed(HidButton::A));

        device.on_report(&report(0x00, 0x08, [128; 4]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code.name(), Some("A"));
        assert!(!events[0].is_pressed());
        assert!(!device.snapshot().pressed(HidButton::A));

        device.on_report(&report(0x00, 0x08, [128; 4]), &tx);
        assert!(inputs(&rx).is_empty());
    }

    #[test]
    fn dropped_stick_motion_is_resent() {
        let (tx, rx) = channel(1);
        let device = HidDevice::pro_controller(2);

        device.on_report(&report(0x08, 0x08, [255, 128, 128, 128]), &tx);
        assert_eq!(inputs(&rx).len(), 1);
        assert_eq!(device.snapshot().sticks[0], 128);

        device.on_report(&report(0x08, 0x08, [255, 128, 128, 128]), &tx);
        let events = inputs(&rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code.name(), Some("LeftStickX"));
    }

    #[test]
    fn detach_does_not_block_on_a_full_channel() {
        let (tx, rx) = channel(1);
        let device = Arc::new(HidDevice::pro_controller(4));
        device.attach(&tx);
        device.on_report(&report(0x08, 0x08, [128; 4]), &tx);

        let (done_tx, done_rx) = mpsc::channel();
        let detaching = device.clone();
        let sender = tx.clone();
        let handle = thread::spawn(move || {
            detaching.detach(&sender);
            let _ = done_tx.send(());
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(1)).is_ok());
        assert!(device.snapshot().pressed(HidButton::A));
        let _ = handle.join();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SourceEvent::Connected(_)));
        assert!(matches!(events[1], SourceEvent::Disconnected(_)));
        assert!(matches!(events[2], SourceEvent::Input(_)));
    }

    #[test]
    fn reports_from_another_thread_arrive_in_order() {
        let (tx, rx) = channel(256);
        let device = Arc::new(HidDevice::pro_controller(5));
        let feeder = device.clone();
        let handle = thread::spawn(move || {
            for i in 0..50u8 {
                let b3 = if i % 2 == 0 { 0x08 } else { 0x00 };
                feeder.on_report(&report(b3, 0x08, [128; 4]), &tx);
            }
        });
        let _ = handle.join();

        let pressed: Vec<bool> = inputs(&rx).iter().map(DeviceInputEvent::is_pressed).collect();
        assert_eq!(pressed.len(), 50);
        assert!(pressed.iter().enumerate().all(|(i, p)| *p == (i % 2 == 0)));
    }
}
