use ahash::AHashMap;
use unipad_device::{AnalogStick, DeviceId, StickAxis};

use crate::mapper::{AxisBinding, AxisEdge};

#[derive(Debug, Default, Clone, Copy)]
struct Halves {
    x_neg: f32,
    x_pos: f32,
    y_neg: f32,
    y_pos: f32,
}

impl Halves {
    fn apply(&mut self, axis: StickAxis, edge: AxisEdge, value: f32) {
        let (neg, pos) = match axis {
            StickAxis::X => (&mut self.x_neg, &mut self.x_pos),
            StickAxis::Y => (&mut self.y_neg, &mut self.y_pos),
        };
        match edge {
            AxisEdge::Full => {
                let value = value.clamp(-1.0, 1.0);
                *pos = value.max(0.0);
                *neg = (-value).max(0.0);
            }
            AxisEdge::Negative => *neg = value.abs().min(1.0),
            AxisEdge::Positive => *pos = value.abs().min(1.0),
        }
    }

    fn position(&self) -> (f32, f32) {
        (
            (self.x_pos - self.x_neg).clamp(-1.0, 1.0),
            (self.y_pos - self.y_neg).clamp(-1.0, 1.0),
        )
    }
}

/// Last known position of every stick, assembled from per-component and
/// half-axis updates.
#[derive(Debug, Default)]
pub(crate) struct StickAccumulator {
    sticks: AHashMap<(DeviceId, AnalogStick), Halves>,
}

impl StickAccumulator {
    /// Applies one axis update and returns the full `(x, y)` of the stick.
    pub(crate) fn update(&mut self, id: DeviceId, binding: AxisBinding, value: f32) -> (f32, f32) {
        let halves = self.sticks.entry((id, binding.stick)).or_default();
        halves.apply(binding.axis, binding.edge, value);
        halves.position()
    }

    pub(crate) fn forget(&mut self, id: DeviceId) {
        self.sticks.retain(|(owner, _), _| *owner != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(axis: StickAxis, edge: AxisEdge) -> AxisBinding {
        AxisBinding { stick: AnalogStick::Left, axis, edge }
    }

    #[test]
    fn full_axes_keep_the_other_component() {
        let mut acc = StickAccumulator::default();
        let id = DeviceId::gamepad(1);
        assert_eq!(acc.update(id, binding(StickAxis::X, AxisEdge::Full), 0.5), (0.5, 0.0));
        assert_eq!(acc.update(id, binding(StickAxis::Y, AxisEdge::Full), -0.25), (0.5, -0.25));
        assert_eq!(acc.update(id, binding(StickAxis::X, AxisEdge::Full), -1.0), (-1.0, -0.25));
    }

    #[test]
    fn half_axes_combine_into_a_component() {
        let mut acc = StickAccumulator::default();
        let id = DeviceId::gamepad(2);
        assert_eq!(acc.update(id, binding(StickAxis::X, AxisEdge::Negative), 0.75), (-0.75, 0.0));
        assert_eq!(acc.update(id, binding(StickAxis::X, AxisEdge::Positive), 0.0), (-0.75, 0.0));
        assert_eq!(acc.update(id, binding(StickAxis::X, AxisEdge::Negative), 0.0), (0.0, 0.0));
        assert_eq!(acc.update(id, binding(StickAxis::Y, AxisEdge::Positive), 1.0), (0.0, 1.0));
    }

    #[test]
    fn forget_resets_only_that_device() {
        let mut acc = StickAccumulator::default();
        let (a, b) = (DeviceId::gamepad(1), DeviceId::hid(1));
        acc.update(a, binding(StickAxis::X, AxisEdge::Full), 1.0);
        acc.update(b, binding(StickAxis::X, AxisEdge::Full), 1.0);
        acc.forget(a);
        assert_eq!(acc.update(a, binding(StickAxis::Y, AxisEdge::Full), 0.0), (0.0, 0.0));
        assert_eq!(acc.update(b, binding(StickAxis::Y, AxisEdge::Full), 0.0), (1.0, 0.0));
    }
}
