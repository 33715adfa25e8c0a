use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unipad_device::{EmulatorButton, PlayerSlot};

use crate::error::BindingConflict;
use crate::store::KeyValueStore;
use crate::Result;

/// Store key holding the keyboard bindings of all players.
pub const KEY_MAPPINGS_KEY: &str = "keyboard-mappings";

/// One player's keyboard bindings: at most one scan code per button, and a
/// scan code bound to at most one button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMapping {
    bindings: BTreeMap<EmulatorButton, u16>,
}

impl KeyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings seeded for player 0 on first start (USB HID usage ids).
    pub fn player_one_defaults() -> Self {
        let bindings = [
            (EmulatorButton::Up, 0x52),
            (EmulatorButton::Down, 0x51),
            (EmulatorButton::Left, 0x50),
            (EmulatorButton::Right, 0x4F),
            (EmulatorButton::A, 0x1B),
            (EmulatorButton::B, 0x1D),
            (EmulatorButton::X, 0x16),
            (EmulatorButton::Y, 0x04),
            (EmulatorButton::L, 0x14),
            (EmulatorButton::R, 0x1A),
            (EmulatorButton::Start, 0x28),
            (EmulatorButton::Select, 0xE5),
        ];
        Self { bindings: bindings.into_iter().collect() }
    }

    /// Binds `scan_code` to `button`, replacing the button's previous key.
    ///
    /// Fails if the scan code already drives a different button; the prior
    /// binding is kept in that case.
    pub fn bind(
        &mut self,
        button: EmulatorButton,
        scan_code: u16,
    ) -> std::result::Result<Option<u16>, BindingConflict> {
        if let Some(bound_to) = self.button_for(scan_code) {
            if bound_to != button {
                return Err(BindingConflict { scan_code, bound_to, requested: button });
            }
        }
        Ok(self.bindings.insert(button, scan_code))
    }

    pub fn unbind(&mut self, button: EmulatorButton) -> Option<u16> {
        self.bindings.remove(&button)
    }

    pub fn scan_code(&self, button: EmulatorButton) -> Option<u16> {
        self.bindings.get(&button).copied()
    }

    pub fn button_for(&self, scan_code: u16) -> Option<EmulatorButton> {
        self.bindings
            .iter()
            .find_map(|(button, code)| (*code == scan_code).then_some(*button))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmulatorButton, u16)> + '_ {
        self.bindings.iter().map(|(b, c)| (*b, *c))
    }
}

/// Keyboard bindings of every player, keyed by player index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyboardMappings {
    players: BTreeMap<u8, KeyMapping>,
}

impl KeyboardMappings {
    /// Player 0 bound to the default keys, everyone else unbound.
    pub fn with_defaults() -> Self {
        let mut mappings = Self::default();
        mappings.players.insert(0, KeyMapping::player_one_defaults());
        mappings
    }

    pub fn get(&self, player: PlayerSlot) -> Option<&KeyMapping> {
        self.players.get(&u8::from(player))
    }

    pub fn bind(
        &mut self,
        player: PlayerSlot,
        button: EmulatorButton,
        scan_code: u16,
    ) -> std::result::Result<Option<u16>, BindingConflict> {
        self.players
            .entry(u8::from(player))
            .or_default()
            .bind(button, scan_code)
    }

    pub fn unbind(&mut self, player: PlayerSlot, button: EmulatorButton) -> Option<u16> {
        self.players
            .get_mut(&u8::from(player))
            .and_then(|m| m.unbind(button))
    }

    /// Every player that binds `scan_code`, with the button it drives.
    pub fn resolve(&self, scan_code: u16) -> impl Iterator<Item = (PlayerSlot, EmulatorButton)> + '_ {
        self.players.iter().filter_map(move |(index, mapping)| {
            let player = PlayerSlot::new(*index)?;
            mapping.button_for(scan_code).map(|button| (player, button))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.players.values().all(KeyMapping::is_empty)
    }
}

/// Keyboard bindings persisted as one snapshot.
pub struct KeyMappingStore {
    store: Arc<dyn KeyValueStore>,
}

impl KeyMappingStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored bindings, or empty when absent or unreadable.
    pub fn load(&self) -> KeyboardMappings {
        let blob = match self.store.get(KEY_MAPPINGS_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return KeyboardMappings::default(),
            Err(e) => {
                log::warn!("failed to read keyboard mappings: {e}");
                return KeyboardMappings::default();
            }
        };
        match serde_json::from_slice(&blob) {
            Ok(mappings) => mappings,
            Err(e) => {
                log::warn!("discarding unreadable keyboard mappings: {e}");
                KeyboardMappings::default()
            }
        }
    }

    pub fn save(&self, mappings: &KeyboardMappings) -> Result<()> {
        let blob = serde_json::to_vec(mappings)?;
        self.store.put(KEY_MAPPINGS_KEY, &blob)?;
        Ok(())
    }
}
