use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use ahash::AHashMap;
use crossbeam_channel::Receiver;
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::joystick::Joystick;
use sdl2::{GameControllerSubsystem, JoystickSubsystem};
use unipad_bit_mask::Bitmask;

use crate::channel::EventSender;
use crate::source::InputSource;
use crate::types::{DeviceId, DeviceInfo, DeviceKind};

use super::adapter::{GamepadAdapter, GamepadChange};
use super::command::Command;
use super::element::{GamepadElement, GamepadLayout};
use super::joystick::{JoystickAdapter, JoystickChange};
use super::manager::Inner;

struct Runtime {
    inner: Arc<Inner>,
    events: EventSender,
    controllers: AHashMap<DeviceId, (GameController, GamepadAdapter)>,
    joysticks: AHashMap<DeviceId, (Joystick, JoystickAdapter)>,
}

/// Starts the SDL2-backed runtime thread that drives device discovery and events.
pub(crate) fn start_runtime_thread(
    inner: Arc<Inner>,
    events: EventSender,
    cmd_rx: Receiver<Command>,
    ready_tx: mpsc::Sender<Result<(), String>>,
) {
    thread::spawn(move || {
        // SDL must live entirely within this thread
        let sdl_ctx = match sdl2::init() {
            Ok(ctx) => ctx,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let subsystems = sdl_ctx
            .game_controller()
            .and_then(|c| sdl_ctx.joystick().map(|j| (c, j)))
            .and_then(|s| sdl_ctx.event_pump().map(|p| (s, p)));
        let ((controller_subsystem, joystick_subsystem), mut event_pump) =
            match subsystems {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

        let mut rt = Runtime {
            inner,
            events,
            controllers: AHashMap::new(),
            joysticks: AHashMap::new(),
        };

        // Initial enumeration
        if let Ok(count) = joystick_subsystem.num_joysticks() {
            for index in 0..count {
                rt.open(&controller_subsystem, &joystick_subsystem, index);
            }
        }
        let _ = ready_tx.send(Ok(()));

        loop {
            // Wait for an SDL event or timeout to reduce idle CPU usage
            if let Some(event) = event_pump.wait_event_timeout(10) {
                if !rt.handle(&controller_subsystem, &joystick_subsystem, event) {
                    return;
                }
                // Drain any additional queued events quickly
                for event in event_pump.poll_iter() {
                    if !rt.handle(&controller_subsystem, &joystick_subsystem, event)
                    {
                        return;
                    }
                }
            }

            while let Ok(cmd) = cmd_rx.try_recv() {
                rt.command(cmd);
            }
        }
    });
}

impl Runtime {
    fn open(
        &mut self,
        controllers: &GameControllerSubsystem,
        joysticks: &JoystickSubsystem,
        index: u32,
    ) {
        if controllers.is_game_controller(index) {
            let Ok(controller) = controllers.open(index) else {
                return;
            };
            let id = DeviceId::gamepad(controller.instance_id());
            if self.controllers.contains_key(&id) {
                return;
            }
            let rumble = controller.has_rumble();
            let layout = GamepadLayout::Extended;
            let info = DeviceInfo {
                id,
                vendor_name: controller.name().into(),
                vendor_id: controller.vendor_id().unwrap_or(0),
                product_id: controller.product_id().unwrap_or(0),
                kind: DeviceKind::Gamepad,
                capabilities: layout.capabilities(rumble),
            };
            self.set_rumble(id, rumble);
            let adapter = GamepadAdapter::new(info, layout);
            adapter.attach(&self.events);
            self.controllers.insert(id, (controller, adapter));
        } else if let Ok(joystick) = joysticks.open(index) {
            let id = DeviceId::gamepad(joystick.instance_id());
            if self.joysticks.contains_key(&id) {
                return;
            }
            let rumble = joystick.has_rumble();
            let mut capabilities = Bitmask::empty();
            capabilities.set(crate::types::Capability::Haptics, rumble);
            let info = DeviceInfo {
                id,
                vendor_name: joystick.name().into(),
                vendor_id: 0,
                product_id: 0,
                kind: DeviceKind::Joystick,
                capabilities,
            };
            self.set_rumble(id, rumble);
            let adapter = JoystickAdapter::new(info);
            adapter.attach(&self.events);
            self.joysticks.insert(id, (joystick, adapter));
        }
    }

    fn close(&mut self, id: DeviceId) {
        let removed = if let Some((_, adapter)) = self.controllers.remove(&id) {
            adapter.detach(&self.events);
            true
        } else if let Some((_, adapter)) = self.joysticks.remove(&id) {
            adapter.detach(&self.events);
            true
        } else {
            false
        };
        if removed {
            self.set_rumble(id, false);
        }
    }

    fn set_rumble(&self, id: DeviceId, on: bool) {
        if let Ok(mut set) = self.inner.rumble.write() {
            if on {
                set.insert(id);
            } else {
                set.remove(&id);
            }
        }
    }

    fn gamepad(&self, which: u32, element: GamepadElement, value: f32) {
        if let Some((_, adapter)) = self.controllers.get(&DeviceId::gamepad(which)) {
            adapter.feed(&GamepadChange { element, value }, &self.events);
        }
    }

    fn joystick(&self, which: u32, change: JoystickChange) {
        if let Some((_, adapter)) = self.joysticks.get(&DeviceId::gamepad(which)) {
            adapter.feed(&change, &self.events);
        }
    }

    /// Returns false once nobody listens to the ingress channel anymore.
    fn handle(
        &mut self,
        controllers: &GameControllerSubsystem,
        joysticks: &JoystickSubsystem,
        event: Event,
    ) -> bool {
        match event {
            Event::ControllerDeviceAdded { which, .. }
            | Event::JoyDeviceAdded { which, .. } => {
                self.open(controllers, joysticks, which);
            }
            Event::ControllerDeviceRemoved { which, .. }
            | Event::JoyDeviceRemoved { which, .. } => {
                self.close(DeviceId::gamepad(which));
            }
            Event::ControllerButtonDown { which, button, .. } => {
                if let Some(element) = map_sdl_button(button) {
                    self.gamepad(which, element, 1.0);
                }
            }
            Event::ControllerButtonUp { which, button, .. } => {
                if let Some(element) = map_sdl_button(button) {
                    self.gamepad(which, element, 0.0);
                }
            }
            Event::ControllerAxisMotion { which, axis, value, .. } => {
                let (element, value) = map_sdl_axis(axis, value);
                self.gamepad(which, element, value);
            }
            Event::JoyAxisMotion { which, axis_idx, value, .. } => {
                let value = normalize_i16(value);
                // SDL reports odd axes down-positive
                let value = if axis_idx % 2 == 1 { -value } else { value };
                self.joystick(which, JoystickChange::Axis { index: axis_idx, value });
            }
            Event::JoyButtonDown { which, button_idx, .. } => {
                self.joystick(
                    which,
                    JoystickChange::Button { index: button_idx, pressed: true },
                );
            }
            Event::JoyButtonUp { which, button_idx, .. } => {
                self.joystick(
                    which,
                    JoystickChange::Button { index: button_idx, pressed: false },
                );
            }
            Event::Quit { .. } => return false,
            _ => {}
        }
        true
    }

    fn command(&mut self, cmd: Command) {
        match cmd {
            Command::Rumble { id, low, high, ms } => {
                if let Some((ctrl, _)) = self.controllers.get_mut(&id) {
                    if let Err(e) = ctrl.set_rumble(low, high, ms) {
                        log::warn!("failed to set rumble on {id}: {e}");
                    }
                } else if let Some((js, _)) = self.joysticks.get_mut(&id) {
                    if let Err(e) = js.set_rumble(low, high, ms) {
                        log::warn!("failed to set rumble on {id}: {e}");
                    }
                }
            }
            Command::StopRumble { id } => {
                if let Some((ctrl, _)) = self.controllers.get_mut(&id) {
                    if let Err(e) = ctrl.set_rumble(0, 0, 0) {
                        log::warn!("failed to stop rumble on {id}: {e}");
                    }
                } else if let Some((js, _)) = self.joysticks.get_mut(&id) {
                    if let Err(e) = js.set_rumble(0, 0, 0) {
                        log::warn!("failed to stop rumble on {id}: {e}");
                    }
                }
            }
        }
    }
}

fn normalize_i16(value: i16) -> f32 {
    (f32::from(value) / f32::from(i16::MAX)).clamp(-1.0, 1.0)
}

fn map_sdl_button(button: SdlButton) -> Option<GamepadElement> {
    Some(match button {
        SdlButton::A => GamepadElement::ButtonA,
        SdlButton::B => GamepadElement::ButtonB,
        SdlButton::X => GamepadElement::ButtonX,
        SdlButton::Y => GamepadElement::ButtonY,
        SdlButton::Back => GamepadElement::ButtonOptions,
        SdlButton::Guide => GamepadElement::ButtonHome,
        SdlButton::Start => GamepadElement::ButtonMenu,
        SdlButton::Misc1 => GamepadElement::ButtonShare,
        SdlButton::Touchpad => GamepadElement::Touchpad,
        SdlButton::LeftStick => GamepadElement::LeftThumbstickButton,
        SdlButton::RightStick => GamepadElement::RightThumbstickButton,
        SdlButton::LeftShoulder => GamepadElement::LeftShoulder,
        SdlButton::RightShoulder => GamepadElement::RightShoulder,
        SdlButton::DPadUp => GamepadElement::DpadUp,
        SdlButton::DPadDown => GamepadElement::DpadDown,
        SdlButton::DPadLeft => GamepadElement::DpadLeft,
        SdlButton::DPadRight => GamepadElement::DpadRight,
        _ => return None,
    })
}

/// SDL sticks are down-positive; the framework convention is up-positive.
fn map_sdl_axis(axis: SdlAxis, value: i16) -> (GamepadElement, f32) {
    let value = normalize_i16(value);
    match axis {
        SdlAxis::LeftX => (GamepadElement::LeftThumbstickX, value),
        SdlAxis::LeftY => (GamepadElement::LeftThumbstickY, -value),
        SdlAxis::RightX => (GamepadElement::RightThumbstickX, value),
        SdlAxis::RightY => (GamepadElement::RightThumbstickY, -value),
        SdlAxis::TriggerLeft => (GamepadElement::LeftTrigger, value.max(0.0)),
        SdlAxis::TriggerRight => (GamepadElement::RightTrigger, value.max(0.0)),
    }
}
