use ahash::AHashMap;
use unipad_device::{AnalogStick, ControllerClass, EmulatorButton, StickAxis, Trigger};

use EmulatorButton as B;

/// Which part of a stick component a physical axis drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisEdge {
    /// A signed axis covering the whole component.
    Full,
    /// A half-axis whose magnitude is the negative direction.
    Negative,
    /// A half-axis whose magnitude is the positive direction.
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisBinding {
    pub stick: AnalogStick,
    pub axis: StickAxis,
    pub edge: AxisEdge,
}

const fn full(stick: AnalogStick, axis: StickAxis) -> AxisBinding {
    AxisBinding { stick, axis, edge: AxisEdge::Full }
}

const fn half(stick: AnalogStick, axis: StickAxis, edge: AxisEdge) -> AxisBinding {
    AxisBinding { stick, axis, edge }
}

static FRAMEWORK_BUTTONS: &[(&str, EmulatorButton)] = &[
    ("ButtonA", B::A),
    ("ButtonB", B::B),
    ("ButtonX", B::X),
    ("ButtonY", B::Y),
    ("LeftShoulder", B::L),
    ("RightShoulder", B::R),
    ("ButtonMenu", B::Start),
    ("ButtonOptions", B::Select),
    ("ButtonHome", B::Home),
    ("DpadUp", B::Up),
    ("DpadDown", B::Down),
    ("DpadLeft", B::Left),
    ("DpadRight", B::Right),
];

static PLAYSTATION_EXTRA: &[(&str, EmulatorButton)] =
    &[("ButtonShare", B::Capture), ("Touchpad", B::Capture)];

// Nintendo labels sit in mirrored positions, so framework names are
// swapped to keep the physical layout.
static SWITCH_FRAMEWORK: &[(&str, EmulatorButton)] = &[
    ("ButtonA", B::B),
    ("ButtonB", B::A),
    ("ButtonX", B::Y),
    ("ButtonY", B::X),
    ("ButtonShare", B::Capture),
];

static SWITCH_HID: &[(&str, EmulatorButton)] = &[
    ("A", B::A),
    ("B", B::B),
    ("X", B::X),
    ("Y", B::Y),
    ("L", B::L),
    ("R", B::R),
    ("ZL", B::ZL),
    ("ZR", B::ZR),
    ("Plus", B::Start),
    ("Minus", B::Select),
    ("Home", B::Home),
    ("Capture", B::Capture),
    ("Up", B::Up),
    ("Down", B::Down),
    ("Left", B::Left),
    ("Right", B::Right),
];

static GENERIC_BUTTONS: &[(&str, EmulatorButton)] = &[
    ("Button0", B::A),
    ("Button1", B::B),
    ("Button2", B::X),
    ("Button3", B::Y),
    ("Button4", B::L),
    ("Button5", B::R),
    ("Button6", B::Select),
    ("Button7", B::Start),
];

static FRAMEWORK_AXES: &[(&str, AxisBinding)] = &[
    ("LeftThumbstickX", full(AnalogStick::Left, StickAxis::X)),
    ("LeftThumbstickY", full(AnalogStick::Left, StickAxis::Y)),
    ("RightThumbstickX", full(AnalogStick::Right, StickAxis::X)),
    ("RightThumbstickY", full(AnalogStick::Right, StickAxis::Y)),
];

static HID_AXES: &[(&str, AxisBinding)] = &[
    ("LeftStickX", full(AnalogStick::Left, StickAxis::X)),
    ("LeftStickY", full(AnalogStick::Left, StickAxis::Y)),
    ("RightStickX", full(AnalogStick::Right, StickAxis::X)),
    ("RightStickY", full(AnalogStick::Right, StickAxis::Y)),
];

static GENERIC_AXES: &[(&str, AxisBinding)] = &[
    ("Axis0-", half(AnalogStick::Left, StickAxis::X, AxisEdge::Negative)),
    ("Axis0+", half(AnalogStick::Left, StickAxis::X, AxisEdge::Positive)),
    ("Axis1-", half(AnalogStick::Left, StickAxis::Y, AxisEdge::Negative)),
    ("Axis1+", half(AnalogStick::Left, StickAxis::Y, AxisEdge::Positive)),
    ("Axis2-", half(AnalogStick::Right, StickAxis::X, AxisEdge::Negative)),
    ("Axis2+", half(AnalogStick::Right, StickAxis::X, AxisEdge::Positive)),
    ("Axis3-", half(AnalogStick::Right, StickAxis::Y, AxisEdge::Negative)),
    ("Axis3+", half(AnalogStick::Right, StickAxis::Y, AxisEdge::Positive)),
];

static FRAMEWORK_TRIGGERS: &[(&str, Trigger)] =
    &[("LeftTrigger", Trigger::Left), ("RightTrigger", Trigger::Right)];

#[derive(Debug, Default)]
struct ClassTable {
    buttons: AHashMap<&'static str, EmulatorButton>,
    axes: AHashMap<&'static str, AxisBinding>,
    triggers: AHashMap<&'static str, Trigger>,
}

impl ClassTable {
    fn buttons(mut self, entries: &[(&'static str, EmulatorButton)]) -> Self {
        self.buttons.extend(entries.iter().copied());
        self
    }

    fn axes(mut self, entries: &[(&'static str, AxisBinding)]) -> Self {
        self.axes.extend(entries.iter().copied());
        self
    }

    fn triggers(mut self, entries: &[(&'static str, Trigger)]) -> Self {
        self.triggers.extend(entries.iter().copied());
        self
    }

    fn seed(class: ControllerClass) -> Self {
        let table = ClassTable::default();
        match class {
            ControllerClass::Xbox => table
                .buttons(FRAMEWORK_BUTTONS)
                .axes(FRAMEWORK_AXES)
                .triggers(FRAMEWORK_TRIGGERS),
            ControllerClass::PlayStation => table
                .buttons(FRAMEWORK_BUTTONS)
                .buttons(PLAYSTATION_EXTRA)
                .axes(FRAMEWORK_AXES)
                .triggers(FRAMEWORK_TRIGGERS),
            ControllerClass::Switch => table
                .buttons(FRAMEWORK_BUTTONS)
                .buttons(SWITCH_FRAMEWORK)
                .buttons(SWITCH_HID)
                .axes(FRAMEWORK_AXES)
                .axes(HID_AXES)
                .triggers(FRAMEWORK_TRIGGERS),
            ControllerClass::Generic => table
                .buttons(FRAMEWORK_BUTTONS)
                .buttons(GENERIC_BUTTONS)
                .axes(FRAMEWORK_AXES)
                .axes(GENERIC_AXES)
                .triggers(FRAMEWORK_TRIGGERS),
        }
    }
}

type Overrides = AHashMap<Box<str>, EmulatorButton>;

/// Translates physical control names into the emulator vocabulary.
///
/// Button lookups go vendor overrides, then class overrides, then the
/// class defaults. Sticks and triggers only use the class defaults.
#[derive(Debug)]
pub struct InputMapper {
    defaults: AHashMap<ControllerClass, ClassTable>,
    class_overrides: AHashMap<ControllerClass, Overrides>,
    vendor_overrides: AHashMap<Box<str>, Overrides>,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMapper {
    /// Mapper seeded with the default table of every class.
    pub fn new() -> Self {
        Self {
            defaults: ControllerClass::ALL
                .iter()
                .map(|class| (*class, ClassTable::seed(*class)))
                .collect(),
            class_overrides: AHashMap::new(),
            vendor_overrides: AHashMap::new(),
        }
    }

    /// Pure lookup. `None` means the control is inert.
    pub fn map_button(&self, physical: &str, class: ControllerClass) -> Option<EmulatorButton> {
        self.class_overrides
            .get(&class)
            .and_then(|o| o.get(physical))
            .or_else(|| self.defaults.get(&class).and_then(|t| t.buttons.get(physical)))
            .copied()
    }

    /// Like [`map_button`](Self::map_button), consulting the overrides saved
    /// for `vendor_name` first.
    pub fn map_device_button(
        &self,
        physical: &str,
        vendor_name: &str,
        class: ControllerClass,
    ) -> Option<EmulatorButton> {
        self.vendor_overrides
            .get(vendor_name)
            .and_then(|o| o.get(physical).copied())
            .or_else(|| self.map_button(physical, class))
    }

    /// Upserts a class override. Other classes are unaffected.
    pub fn set_mapping(&mut self, physical: &str, button: EmulatorButton, class: ControllerClass) {
        self.class_overrides
            .entry(class)
            .or_default()
            .insert(physical.into(), button);
    }

    /// Replaces every override scoped to `vendor_name`.
    pub fn set_vendor_mappings<'a, I>(&mut self, vendor_name: &str, mappings: I)
    where
        I: IntoIterator<Item = (&'a str, EmulatorButton)>,
    {
        let table: Overrides = mappings
            .into_iter()
            .map(|(physical, button)| (physical.into(), button))
            .collect();
        self.vendor_overrides.insert(vendor_name.into(), table);
    }

    pub fn map_axis(&self, physical: &str, class: ControllerClass) -> Option<AxisBinding> {
        self.defaults.get(&class)?.axes.get(physical).copied()
    }

    pub fn map_trigger(&self, physical: &str, class: ControllerClass) -> Option<Trigger> {
        self.defaults.get(&class)?.triggers.get(physical).copied()
    }
}
