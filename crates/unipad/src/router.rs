use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use unipad_device::{AnalogStick, EmulatorButton, PlayerSlot, Trigger};

use crate::consumer::InputConsumer;

/// Axis magnitude above which a stick direction counts as pressed.
pub const STICK_THRESHOLD: f32 = 0.5;
/// Trigger value above which the companion digital button counts as pressed.
pub const TRIGGER_THRESHOLD: f32 = 0.5;

/// Mapped input addressed to a player slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutedEvent {
    Button { button: EmulatorButton, pressed: bool },
    Analog { stick: AnalogStick, x: f32, y: f32 },
    Trigger { trigger: Trigger, value: f32 },
}

/// Digital state of the positive direction of an axis.
#[inline]
pub fn digital_positive(value: f32) -> bool {
    value > STICK_THRESHOLD
}

/// Digital state of the negative direction of an axis. Never true together
/// with [`digital_positive`] for the same value.
#[inline]
pub fn digital_negative(value: f32) -> bool {
    value < -STICK_THRESHOLD
}

#[inline]
pub fn trigger_pressed(value: f32) -> bool {
    value > TRIGGER_THRESHOLD
}

type Sink = Option<Box<dyn InputConsumer>>;

struct Slot {
    sink: Mutex<Sink>,
    digital_emulation: AtomicBool,
}

/// Delivers mapped events to the sink registered for each player slot.
///
/// Shared between the subsystem loop and [`VirtualInput`] handles. Events
/// for a slot without a sink are dropped.
pub struct Router {
    slots: [Slot; PlayerSlot::COUNT],
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot {
                sink: Mutex::new(None),
                digital_emulation: AtomicBool::new(false),
            }),
        }
    }

    /// Registers or clears the sink of a slot and returns the previous one.
    /// Events dropped while no sink was registered are not replayed.
    pub fn set_sink(&self, player: PlayerSlot, sink: Sink) -> Sink {
        match self.slots[player.index()].sink.lock() {
            Ok(mut current) => std::mem::replace(&mut *current, sink),
            Err(_) => None,
        }
    }

    pub fn has_sink(&self, player: PlayerSlot) -> bool {
        self.slots[player.index()]
            .sink
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false)
    }

    /// When enabled, left stick motion on this slot also drives the digital
    /// D-pad.
    pub fn set_digital_emulation(&self, player: PlayerSlot, enabled: bool) {
        self.slots[player.index()]
            .digital_emulation
            .store(enabled, Ordering::Relaxed);
    }

    pub fn digital_emulation(&self, player: PlayerSlot) -> bool {
        self.slots[player.index()].digital_emulation.load(Ordering::Relaxed)
    }

    /// Delivers one event. Returns false if it was dropped.
    pub fn route(&self, player: PlayerSlot, event: RoutedEvent) -> bool {
        let slot = &self.slots[player.index()];
        let Ok(mut guard) = slot.sink.lock() else {
            return false;
        };
        let Some(sink) = guard.as_mut() else {
            return false;
        };
        match event {
            RoutedEvent::Button { button, pressed } => {
                sink.set_button_state(player, button, pressed);
            }
            RoutedEvent::Analog { stick, x, y } => {
                sink.set_analog_state(player, stick, x, y);
                if stick == AnalogStick::Left
                    && slot.digital_emulation.load(Ordering::Relaxed)
                {
                    sink.set_button_state(player, EmulatorButton::Right, digital_positive(x));
                    sink.set_button_state(player, EmulatorButton::Left, digital_negative(x));
                    sink.set_button_state(player, EmulatorButton::Up, digital_positive(y));
                    sink.set_button_state(player, EmulatorButton::Down, digital_negative(y));
                }
            }
            RoutedEvent::Trigger { trigger, value } => {
                sink.set_trigger_state(player, trigger, value);
                sink.set_button_state(player, trigger.digital(), trigger_pressed(value));
            }
        }
        true
    }
}

/// Programmatic input for a player slot, indistinguishable from physical
/// input at the consumer. Bypasses mapping and controller assignment.
#[derive(Clone)]
pub struct VirtualInput {
    router: Arc<Router>,
}

impl VirtualInput {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn inject_button(&self, player: PlayerSlot, button: EmulatorButton, pressed: bool) -> bool {
        self.router.route(player, RoutedEvent::Button { button, pressed })
    }

    pub fn inject_analog(&self, player: PlayerSlot, stick: AnalogStick, x: f32, y: f32) -> bool {
        let (x, y) = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        self.router.route(player, RoutedEvent::Analog { stick, x, y })
    }

    pub fn inject_trigger(&self, player: PlayerSlot, trigger: Trigger, value: f32) -> bool {
        let value = value.clamp(0.0, 1.0);
        self.router.route(player, RoutedEvent::Trigger { trigger, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ConsumerCall, RecordingConsumer};

    fn slot(index: u8) -> PlayerSlot {
        PlayerSlot::new(index).unwrap()
    }

    #[test]
    fn events_without_sink_are_dropped() {
        let router = Router::new();
        assert!(!router.route(slot(1), RoutedEvent::Button { button: EmulatorButton::A, pressed: true }));

        let (sink, log) = RecordingConsumer::new();
        assert!(router.set_sink(slot(1), Some(Box::new(sink))).is_none());
        assert!(log.calls().is_empty());
    }

    #[test]
    fn directions_are_mutually_exclusive() {
        let mut v = -1.0f32;
        while v <= 1.0 {
            assert!(!(digital_negative(v) && digital_positive(v)), "both asserted at {v}");
            v += 0.01;
        }
        assert!(!digital_positive(0.5));
        assert!(digital_positive(0.51));
        assert!(digital_negative(-0.51));
    }

    #[test]
    fn trigger_delivers_analog_then_digital_companion() {
        let router = Router::new();
        let (sink, log) = RecordingConsumer::new();
        router.set_sink(slot(0), Some(Box::new(sink)));

        router.route(slot(0), RoutedEvent::Trigger { trigger: Trigger::Right, value: 0.8 });
        router.route(slot(0), RoutedEvent::Trigger { trigger: Trigger::Right, value: 0.3 });

        assert_eq!(
            log.take(),
            vec![
                ConsumerCall::Trigger { player: slot(0), trigger: Trigger::Right, value: 0.8 },
                ConsumerCall::Button { player: slot(0), button: EmulatorButton::ZR, pressed: true },
                ConsumerCall::Trigger { player: slot(0), trigger: Trigger::Right, value: 0.3 },
                ConsumerCall::Button { player: slot(0), button: EmulatorButton::ZR, pressed: false },
            ]
        );
    }

    #[test]
    fn digital_emulation_is_opt_in_per_slot() {
        let router = Router::new();
        let (sink, log) = RecordingConsumer::new();
        router.set_sink(slot(3), Some(Box::new(sink)));

        let event = RoutedEvent::Analog { stick: AnalogStick::Left, x: 0.9, y: -0.7 };
        router.route(slot(3), event);
        assert_eq!(log.take().len(), 1);

        router.set_digital_emulation(slot(3), true);
        router.route(slot(3), event);
        let calls = log.take();
        assert_eq!(calls.len(), 5);
        assert!(calls.contains(&ConsumerCall::Button { player: slot(3), button: EmulatorButton::Right, pressed: true }));
        assert!(calls.contains(&ConsumerCall::Button { player: slot(3), button: EmulatorButton::Left, pressed: false }));
        assert!(calls.contains(&ConsumerCall::Button { player: slot(3), button: EmulatorButton::Down, pressed: true }));

        router.route(slot(3), RoutedEvent::Analog { stick: AnalogStick::Right, x: 1.0, y: 1.0 });
        assert_eq!(log.take().len(), 1);
    }

    #[test]
    fn replacing_a_sink_does_not_replay() {
        let router = Router::new();
        let (first, first_log) = RecordingConsumer::new();
        let (second, second_log) = RecordingConsumer::new();

        router.set_sink(slot(0), Some(Box::new(first)));
        router.route(slot(0), RoutedEvent::Button { button: EmulatorButton::B, pressed: true });
        assert!(router.set_sink(slot(0), Some(Box::new(second))).is_some());
        router.route(slot(0), RoutedEvent::Button { button: EmulatorButton::B, pressed: false });

        assert_eq!(first_log.calls().len(), 1);
        assert_eq!(
            second_log.calls(),
            vec![ConsumerCall::Button { player: slot(0), button: EmulatorButton::B, pressed: false }]
        );
    }

    #[test]
    fn virtual_injection_reaches_the_slot_sink() {
        let router = Arc::new(Router::new());
        let (sink, log) = RecordingConsumer::new();
        router.set_sink(slot(2), Some(Box::new(sink)));
        let agent = VirtualInput::new(router);

        assert!(agent.inject_button(slot(2), EmulatorButton::A, true));
        assert!(agent.inject_analog(slot(2), AnalogStick::Right, 2.0, -0.25));
        assert!(!agent.inject_trigger(slot(1), Trigger::Left, 1.0));

        assert_eq!(
            log.take(),
            vec![
                ConsumerCall::Button { player: slot(2), button: EmulatorButton::A, pressed: true },
                ConsumerCall::Analog { player: slot(2), stick: AnalogStick::Right, x: 1.0, y: -0.25 },
            ]
        );
    }
}
