use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::ir::{DeviceInputEvent, EventBatch};
use crate::types::{DeviceId, DeviceInfo};

/// Everything an input source can tell the subsystem.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A device has been connected and enumerated.
    Connected(DeviceInfo),
    /// A previously connected device is gone.
    Disconnected(DeviceId),
    /// The platform designated this device as the current one.
    BecameCurrent(DeviceId),
    /// Input from a connected device.
    Input(DeviceInputEvent),
}

/// Outcome of offering one input event to the ingress channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The channel was full and the event was dropped.
    Dropped,
    /// The receiving side is gone.
    Closed,
}

/// Thread-safe ingress handle shared by all input sources.
///
/// Input goes through a bounded lane with `try_send`: when it is full the
/// event is dropped, since stale input has no value. Lifecycle events go
/// through an unbounded control lane, so they are never dropped and never
/// block the sending thread.
#[derive(Debug, Clone)]
pub struct EventSender {
    input: Sender<SourceEvent>,
    control: Sender<SourceEvent>,
}

/// Receiving end of the ingress channel.
///
/// Pending lifecycle events are always handed out before input, so a
/// device is known before its first input is processed.
#[derive(Debug, Clone)]
pub struct EventReceiver {
    input: Receiver<SourceEvent>,
    control: Receiver<SourceEvent>,
}

/// Creates the ingress channel with an input lane of `capacity`.
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (input_tx, input_rx) = bounded(capacity.max(1));
    let (control_tx, control_rx) = unbounded();
    (
        EventSender { input: input_tx, control: control_tx },
        EventReceiver { input: input_rx, control: control_rx },
    )
}

impl EventSender {
    pub fn offer(&self, event: DeviceInputEvent) -> Delivery {
        match self.input.try_send(SourceEvent::Input(event)) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                log::trace!("ingress full, dropping input from {}", event.device_id);
                Delivery::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Delivery::Closed,
        }
    }

    /// Returns false once the receiving side has been dropped.
    pub fn send_input(&self, event: DeviceInputEvent) -> bool {
        self.offer(event) != Delivery::Closed
    }

    pub fn send_batch(&self, batch: EventBatch) -> bool {
        for event in batch {
            if !self.send_input(event) {
                return false;
            }
        }
        true
    }

    pub fn connected(&self, info: DeviceInfo) -> bool {
        self.control.send(SourceEvent::Connected(info)).is_ok()
    }

    pub fn disconnected(&self, id: DeviceId) -> bool {
        self.control.send(SourceEvent::Disconnected(id)).is_ok()
    }

    pub fn became_current(&self, id: DeviceId) -> bool {
        self.control.send(SourceEvent::BecameCurrent(id)).is_ok()
    }
}

impl EventReceiver {
    /// Next pending event, lifecycle first.
    pub fn try_recv(&self) -> Result<SourceEvent, TryRecvError> {
        match self.control.try_recv() {
            Ok(event) => Ok(event),
            Err(_) => self.input.try_recv(),
        }
    }

    pub fn try_iter(&self) -> impl Iterator<Item = SourceEvent> + '_ {
        std::iter::from_fn(move || self.try_recv().ok())
    }

    /// Input lane, for use in `select!`.
    pub fn input(&self) -> &Receiver<SourceEvent> {
        &self.input
    }

    /// Lifecycle lane, for use in `select!`.
    pub fn control(&self) -> &Receiver<SourceEvent> {
        &self.control
    }

    pub fn len(&self) -> usize {
        self.input.len() + self.control.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.control.is_empty()
    }
}
