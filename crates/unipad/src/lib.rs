//! Unified controller input: gamepads, a Bluetooth HID pad and the
//! keyboard, normalized into per-player emulator input.

pub mod config;
pub mod logging;
pub mod mapper;
pub mod registry;
pub mod router;

mod consumer;
mod error;
mod sticks;
mod subsystem;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use config::{ConfigError, SubsystemConfig};
pub use consumer::InputConsumer;
pub use error::{Error, Result};
pub use mapper::{AxisBinding, AxisEdge, InputMapper};
pub use registry::{AutoAssign, ConnectionState, Controller, RegistryError, RegistryEvent};
pub use router::{RoutedEvent, Router, VirtualInput};
pub use subsystem::InputSubsystem;

pub use unipad_device as device;
pub use unipad_profile as profile;
