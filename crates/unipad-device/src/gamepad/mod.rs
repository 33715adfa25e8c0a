//! Adapter for gamepad-framework controllers and plain joysticks.

mod adapter;
mod element;
mod joystick;

#[cfg(feature = "sdl2-backend")]
mod command;
#[cfg(feature = "sdl2-backend")]
mod manager;
#[cfg(feature = "sdl2-backend")]
mod runtime;

pub use adapter::{GamepadAdapter, GamepadChange};
pub use element::{GamepadElement, GamepadLayout};
pub use joystick::{JoystickAdapter, JoystickChange, MAX_JOYSTICK_AXES, MAX_JOYSTICK_BUTTONS};

#[cfg(feature = "sdl2-backend")]
pub use manager::{GamepadError, GamepadManager};
