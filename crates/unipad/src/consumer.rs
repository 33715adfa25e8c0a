use unipad_device::{AnalogStick, EmulatorButton, PlayerSlot, Trigger};

/// Receiver of normalized per-player input, implemented by an emulation
/// core or an automated agent.
///
/// Calls may arrive from any thread, one at a time per player.
pub trait InputConsumer: Send {
    fn set_button_state(&mut self, player: PlayerSlot, button: EmulatorButton, pressed: bool);

    /// `x` and `y` are in [-1.0, 1.0], up/right positive.
    fn set_analog_state(&mut self, player: PlayerSlot, stick: AnalogStick, x: f32, y: f32);

    /// `value` is in [0.0, 1.0].
    fn set_trigger_state(&mut self, player: PlayerSlot, trigger: Trigger, value: f32);
}
