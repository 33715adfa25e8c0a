use std::sync::Arc;

use ahash::AHashMap;
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;
use unipad_device::{
    Capability, ControllerClass, DeviceId, DeviceInfo, HapticBackend, PlayerSlot,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("controller not found: {0}")]
    NotFound(DeviceId),
    #[error("controller already connected: {0}")]
    AlreadyConnected(DeviceId),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Slot policy applied when a controller connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAssign {
    /// Take the lowest free slot, if any.
    #[default]
    LowestFree,
    /// Take slot 0, only while no slot is occupied.
    FirstOnly,
    /// Leave new controllers unassigned.
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// A connected physical device as tracked by the registry.
#[derive(Debug, Clone)]
pub struct Controller {
    pub info: DeviceInfo,
    /// Mapping table scope, resolved once on connect.
    pub class: ControllerClass,
    pub slot: Option<PlayerSlot>,
    pub state: ConnectionState,
}

impl Controller {
    pub fn id(&self) -> DeviceId {
        self.info.id
    }
}

/// Change notifications produced by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Connected(DeviceId),
    Disconnected(DeviceId),
    Assigned { id: DeviceId, slot: PlayerSlot },
    Unassigned { id: DeviceId, slot: PlayerSlot },
    PrimaryChanged(Option<DeviceId>),
}

/// Events of one mutation, in the order they happened.
pub type RegistryEvents = SmallVec<[RegistryEvent; 4]>;

/// Authoritative list of connected controllers and their player slots.
///
/// Every mutating call applies all of its changes before returning the
/// resulting events, so observers never see a half-applied reassignment.
pub struct Registry {
    controllers: AHashMap<DeviceId, Controller>,
    order: Vec<DeviceId>,
    slots: [Option<DeviceId>; PlayerSlot::COUNT],
    primary: Option<DeviceId>,
    policy: AutoAssign,
    haptics: Arc<dyn HapticBackend>,
}

impl Registry {
    pub fn new(policy: AutoAssign, haptics: Arc<dyn HapticBackend>) -> Self {
        Self {
            controllers: AHashMap::new(),
            order: Vec::new(),
            slots: [None; PlayerSlot::COUNT],
            primary: None,
            policy,
            haptics,
        }
    }

    pub fn on_connect(&mut self, mut info: DeviceInfo) -> Result<RegistryEvents> {
        let id = info.id;
        if self.controllers.contains_key(&id) {
            return Err(RegistryError::AlreadyConnected(id));
        }

        if info.capabilities.contains(Capability::Haptics) {
            if let Err(e) = self.haptics.start_engine(id) {
                log::warn!("haptics unavailable for {id}: {e}");
                info.capabilities.remove(Capability::Haptics);
            }
        }

        let slot = match self.policy {
            AutoAssign::LowestFree => self.lowest_free(),
            AutoAssign::FirstOnly if self.slots.iter().all(Option::is_none) => {
                Some(PlayerSlot::ALL[0])
            }
            AutoAssign::FirstOnly | AutoAssign::Off => None,
        };

        let mut events = RegistryEvents::new();
        self.controllers.insert(
            id,
            Controller {
                class: info.class(),
                info,
                slot,
                state: ConnectionState::Connected,
            },
        );
        self.order.push(id);
        events.push(RegistryEvent::Connected(id));
        if let Some(slot) = slot {
            self.slots[slot.index()] = Some(id);
            events.push(RegistryEvent::Assigned { id, slot });
        }
        if self.primary.is_none() {
            self.primary = Some(id);
            events.push(RegistryEvent::PrimaryChanged(Some(id)));
        }
        Ok(events)
    }

    /// Removes the controller. Its slot is freed and left empty.
    pub fn on_disconnect(&mut self, id: DeviceId) -> Result<RegistryEvents> {
        let Some(controller) = self.controllers.remove(&id) else {
            return Err(RegistryError::NotFound(id));
        };
        self.order.retain(|known| *known != id);

        let mut events = RegistryEvents::new();
        if let Some(slot) = controller.slot {
            self.slots[slot.index()] = None;
            events.push(RegistryEvent::Unassigned { id, slot });
        }
        if self.primary == Some(id) {
            self.primary = None;
            events.push(RegistryEvent::PrimaryChanged(None));
        }
        events.push(RegistryEvent::Disconnected(id));
        Ok(events)
    }

    /// The platform designated `id` as its current controller.
    pub fn became_current(&mut self, id: DeviceId) -> Result<RegistryEvents> {
        if !self.controllers.contains_key(&id) {
            return Err(RegistryError::NotFound(id));
        }
        let mut events = RegistryEvents::new();
        if self.primary != Some(id) {
            self.primary = Some(id);
            events.push(RegistryEvent::PrimaryChanged(Some(id)));
        }
        Ok(events)
    }

    /// Moves `id` to `slot`, evicting the slot's previous occupant.
    pub fn assign(&mut self, id: DeviceId, slot: PlayerSlot) -> Result<RegistryEvents> {
        let previous = match self.controllers.get(&id) {
            Some(controller) => controller.slot,
            None => return Err(RegistryError::NotFound(id)),
        };
        let mut events = RegistryEvents::new();
        if previous == Some(slot) {
            return Ok(events);
        }

        if let Some(occupant) = self.slots[slot.index()].take() {
            if let Some(other) = self.controllers.get_mut(&occupant) {
                other.slot = None;
            }
            events.push(RegistryEvent::Unassigned { id: occupant, slot });
        }
        if let Some(old) = previous {
            self.slots[old.index()] = None;
            events.push(RegistryEvent::Unassigned { id, slot: old });
        }
        self.slots[slot.index()] = Some(id);
        if let Some(controller) = self.controllers.get_mut(&id) {
            controller.slot = Some(slot);
        }
        events.push(RegistryEvent::Assigned { id, slot });
        Ok(events)
    }

    pub fn unassign(&mut self, id: DeviceId) -> Result<RegistryEvents> {
        let Some(controller) = self.controllers.get_mut(&id) else {
            return Err(RegistryError::NotFound(id));
        };
        let mut events = RegistryEvents::new();
        if let Some(slot) = controller.slot.take() {
            self.slots[slot.index()] = None;
            events.push(RegistryEvent::Unassigned { id, slot });
        }
        Ok(events)
    }

    pub fn get(&self, id: DeviceId) -> Option<&Controller> {
        self.controllers.get(&id)
    }

    pub fn slot_of(&self, id: DeviceId) -> Option<PlayerSlot> {
        self.controllers.get(&id).and_then(|c| c.slot)
    }

    pub fn controller_in(&self, slot: PlayerSlot) -> Option<&Controller> {
        self.slots[slot.index()].and_then(|id| self.controllers.get(&id))
    }

    pub fn primary(&self) -> Option<DeviceId> {
        self.primary
    }

    /// Connected controllers in connection order.
    pub fn controllers(&self) -> Vec<Controller> {
        self.order
            .iter()
            .filter_map(|id| self.controllers.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    fn lowest_free(&self) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()].is_none())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use unipad_device::{Bitmask, DeviceKind, HapticError, NoHaptics};

    fn pad(n: u32) -> DeviceInfo {
        DeviceInfo {
            id: DeviceId::gamepad(n),
            vendor_name: "Xbox Wireless Controller".into(),
            vendor_id: 0x045e,
            product_id: 0x0b13,
            kind: DeviceKind::Gamepad,
            capabilities: Bitmask::new(&[Capability::ExtendedButtons, Capability::Haptics]),
        }
    }

    fn slot(index: u8) -> PlayerSlot {
        PlayerSlot::new(index).unwrap()
    }

    fn registry(policy: AutoAssign) -> Registry {
        Registry::new(policy, Arc::new(NoHaptics))
    }

    fn assert_unique_slots(registry: &Registry) {
        let mut taken: Vec<PlayerSlot> =
            registry.controllers().iter().filter_map(|c| c.slot).collect();
        let total = taken.len();
        taken.sort();
        taken.dedup();
        assert_eq!(taken.len(), total, "two controllers share a slot");
        for c in registry.controllers() {
            if let Some(s) = c.slot {
                assert_eq!(registry.controller_in(s).map(Controller::id), Some(c.id()));
            }
        }
    }

    #[test]
    fn connect_assigns_lowest_free_slot() {
        let mut r = registry(AutoAssign::LowestFree);
        for n in 0..5 {
            r.on_connect(pad(n)).unwrap();
        }
        assert_eq!(r.slot_of(DeviceId::gamepad(0)), Some(slot(0)));
        assert_eq!(r.slot_of(DeviceId::gamepad(3)), Some(slot(3)));
        assert_eq!(r.slot_of(DeviceId::gamepad(4)), None);

        r.on_disconnect(DeviceId::gamepad(1)).unwrap();
        r.on_connect(pad(9)).unwrap();
        assert_eq!(r.slot_of(DeviceId::gamepad(9)), Some(slot(1)));
        assert_unique_slots(&r);
    }

    #[test]
    fn first_only_assigns_while_all_slots_are_empty() {
        let mut r = registry(AutoAssign::FirstOnly);
        r.on_connect(pad(0)).unwrap();
        r.on_connect(pad(1)).unwrap();
        assert_eq!(r.slot_of(DeviceId::gamepad(0)), Some(slot(0)));
        assert_eq!(r.slot_of(DeviceId::gamepad(1)), None);

        let mut off = registry(AutoAssign::Off);
        off.on_connect(pad(0)).unwrap();
        assert_eq!(off.slot_of(DeviceId::gamepad(0)), None);
    }

    #[test]
    fn disconnect_frees_slot_without_reassigning() {
        let mut r = registry(AutoAssign::LowestFree);
        for n in 0..5 {
            r.on_connect(pad(n)).unwrap();
        }
        let events = r.on_disconnect(DeviceId::gamepad(0)).unwrap();
        assert!(events.contains(&RegistryEvent::Unassigned { id: DeviceId::gamepad(0), slot: slot(0) }));
        assert!(r.controller_in(slot(0)).is_none());
        assert_eq!(r.slot_of(DeviceId::gamepad(4)), None);
        assert!(r.get(DeviceId::gamepad(0)).is_none());
        assert_eq!(
            r.on_disconnect(DeviceId::gamepad(0)).unwrap_err(),
            RegistryError::NotFound(DeviceId::gamepad(0))
        );
    }

    #[test]
    fn assign_evicts_occupant_before_reporting() {
        let mut r = registry(AutoAssign::LowestFree);
        r.on_connect(pad(0)).unwrap();
        r.on_connect(pad(1)).unwrap();

        let events = r.assign(DeviceId::gamepad(1), slot(0)).unwrap();
        assert_eq!(
            events.as_slice(),
            &[
                RegistryEvent::Unassigned { id: DeviceId::gamepad(0), slot: slot(0) },
                RegistryEvent::Unassigned { id: DeviceId::gamepad(1), slot: slot(1) },
                RegistryEvent::Assigned { id: DeviceId::gamepad(1), slot: slot(0) },
            ]
        );
        assert_eq!(r.slot_of(DeviceId::gamepad(0)), None);
        assert!(r.assign(DeviceId::gamepad(1), slot(0)).unwrap().is_empty());
        assert!(r.assign(DeviceId::gamepad(7), slot(0)).is_err());
    }

    #[test]
    fn assignment_sequences_keep_slots_unique() {
        let mut r = registry(AutoAssign::Off);
        for n in 0..6 {
            r.on_connect(pad(n)).unwrap();
        }
        // Deterministic pseudo-random walk over (controller, slot) pairs
        let mut seed = 7u32;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = DeviceId::gamepad((seed >> 8) % 6);
            let target = slot(((seed >> 16) % 4) as u8);
            if (seed >> 4) % 5 == 0 {
                r.unassign(id).unwrap();
            } else {
                r.assign(id, target).unwrap();
            }
            assert_unique_slots(&r);
        }
    }

    #[test]
    fn primary_follows_connection_and_current_signal() {
        let mut r = registry(AutoAssign::LowestFree);
        r.on_connect(pad(0)).unwrap();
        r.on_connect(pad(1)).unwrap();
        assert_eq!(r.primary(), Some(DeviceId::gamepad(0)));

        let events = r.on_disconnect(DeviceId::gamepad(0)).unwrap();
        assert!(events.contains(&RegistryEvent::PrimaryChanged(None)));
        assert_eq!(r.primary(), None);

        r.became_current(DeviceId::gamepad(1)).unwrap();
        assert_eq!(r.primary(), Some(DeviceId::gamepad(1)));
        assert!(r.became_current(DeviceId::gamepad(1)).unwrap().is_empty());
    }

    struct BrokenEngine;

    impl HapticBackend for BrokenEngine {
        fn start_engine(&self, _id: DeviceId) -> std::result::Result<(), HapticError> {
            Err(HapticError::Engine("no actuator".into()))
        }

        fn rumble(&self, id: DeviceId, _s: f32, _d: Duration) -> std::result::Result<(), HapticError> {
            Err(HapticError::Unsupported(id))
        }
    }

    #[test]
    fn haptic_failure_drops_capability_only() {
        let mut r = Registry::new(AutoAssign::LowestFree, Arc::new(BrokenEngine));
        r.on_connect(pad(0)).unwrap();
        let controller = r.get(DeviceId::gamepad(0)).unwrap();
        assert!(!controller.info.capabilities.contains(Capability::Haptics));
        assert!(controller.info.capabilities.contains(Capability::ExtendedButtons));
        assert_eq!(controller.slot, Some(slot(0)));
        assert_eq!(controller.state, ConnectionState::Connected);
    }
}
