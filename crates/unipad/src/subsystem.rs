use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use unipad_device::{
    channel, Capability, ControlCode, ControllerClass, DeviceId, DeviceInputEvent, DeviceKind,
    EmulatorButton, EventReceiver, EventSender, HapticBackend, HapticError, InputKind,
    NoHaptics, PlayerSlot, SourceEvent,
};
use unipad_profile::{
    BindingConflict, ControllerProfile, FileStore, KeyMappingStore, KeyValueStore,
    KeyboardMappings, MemoryStore, PersistenceWorker, ProfileStore,
};

use crate::config::SubsystemConfig;
use crate::consumer::InputConsumer;
use crate::error::{Error, Result};
use crate::mapper::InputMapper;
use crate::registry::{Controller, Registry, RegistryEvent, RegistryEvents};
use crate::router::{RoutedEvent, Router, VirtualInput};
use crate::sticks::StickAccumulator;
use crate::{print_debug, print_info, print_warning};

/// The controller input subsystem of one emulation session.
///
/// Sources push into the ingress channel from any thread; a single owner
/// drains it with [`process`](Self::process), [`drain`](Self::drain) or
/// [`run`](Self::run), which maps events and hands them to the router.
pub struct InputSubsystem {
    tx: EventSender,
    rx: EventReceiver,
    router: Arc<Router>,
    registry: Registry,
    mapper: InputMapper,
    sticks: StickAccumulator,
    key_mappings: KeyboardMappings,
    profiles: Arc<ProfileStore>,
    worker: PersistenceWorker,
    haptics: Arc<dyn HapticBackend>,
    subscribers: Vec<Sender<RegistryEvent>>,
}

impl InputSubsystem {
    pub fn new(config: SubsystemConfig) -> Self {
        Self::with_haptics(config, Arc::new(NoHaptics))
    }

    /// Builds the subsystem. Storage problems are logged and degrade to an
    /// in-memory store, so construction always succeeds.
    pub fn with_haptics(config: SubsystemConfig, haptics: Arc<dyn HapticBackend>) -> Self {
        let store = open_store(&config);
        let profiles = Arc::new(ProfileStore::open(store.clone()));
        let key_store = Arc::new(KeyMappingStore::new(store));
        let worker = PersistenceWorker::start(profiles.clone(), key_store.clone());

        let mut key_mappings = key_store.load();
        if key_mappings.is_empty() {
            key_mappings = KeyboardMappings::with_defaults();
            worker.save_key_mappings(key_mappings.clone());
        }

        let mut mapper = InputMapper::new();
        for (class, overrides) in &config.class_overrides {
            for (physical, button) in overrides {
                mapper.set_mapping(physical, *button, *class);
            }
        }
        for profile in profiles.load().values() {
            apply_profile(&mut mapper, profile);
        }

        let router = Arc::new(Router::new());
        for slot in &config.digital_emulation {
            router.set_digital_emulation(*slot, true);
        }

        let (tx, rx) = channel(config.channel_capacity);
        print_debug!(
            "input subsystem ready (capacity {}, {:?})",
            config.channel_capacity,
            config.auto_assign
        );

        Self {
            tx,
            rx,
            router,
            registry: Registry::new(config.auto_assign, haptics.clone()),
            mapper,
            sticks: StickAccumulator::default(),
            key_mappings,
            profiles,
            worker,
            haptics,
            subscribers: Vec::new(),
        }
    }

    /// Ingress handle for input sources.
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// Handle for programmatic input, usable from any thread.
    pub fn virtual_input(&self) -> VirtualInput {
        VirtualInput::new(self.router.clone())
    }

    /// Registers or clears the consumer of a player slot.
    pub fn set_input_delegate(&self, sink: Option<Box<dyn InputConsumer>>, player: PlayerSlot) {
        self.router.set_sink(player, sink);
    }

    /// Subscribes to registry changes. Dropped subscribers are cleaned automatically.
    pub fn subscribe(&mut self) -> Receiver<RegistryEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Handles every pending ingress event without blocking.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.process(event);
            handled += 1;
        }
        handled
    }

    /// Handles ingress events until `stop` fires or disconnects.
    pub fn run(&mut self, stop: &Receiver<()>) {
        let rx = self.rx.clone();
        print_info!("input subsystem started");
        loop {
            select! {
                recv(stop) -> _ => break,
                recv(rx.control()) -> msg => match msg {
                    Ok(event) => self.process(event),
                    Err(_) => break,
                },
                recv(rx.input()) -> msg => match msg {
                    Ok(event) => {
                        // A device must be known before its input is mapped
                        while let Ok(control) = rx.control().try_recv() {
                            self.process(control);
                        }
                        self.process(event);
                    }
                    Err(_) => break,
                },
            }
        }
        print_info!("input subsystem stopped");
    }

    pub fn process(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Input(input) => self.handle_input(input),
            SourceEvent::Connected(info) => {
                if info.kind == DeviceKind::Keyboard {
                    print_debug!("keyboard {} attached", info.id);
                    return;
                }
                print_info!("controller connected: {} ({})", info.vendor_name, info.id);
                let result = self.registry.on_connect(info);
                self.settle(result);
            }
            SourceEvent::Disconnected(id) => {
                self.sticks.forget(id);
                if id.is_keyboard() {
                    return;
                }
                print_info!("controller disconnected: {id}");
                let result = self.registry.on_disconnect(id);
                self.settle(result);
            }
            SourceEvent::BecameCurrent(id) => {
                let result = self.registry.became_current(id);
                self.settle(result);
            }
        }
    }

    fn handle_input(&mut self, event: DeviceInputEvent) {
        let name = match event.code {
            ControlCode::Scan(scan_code) => {
                let pressed = event.is_pressed();
                for (player, button) in self.key_mappings.resolve(scan_code) {
                    self.router.route(player, RoutedEvent::Button { button, pressed });
                }
                return;
            }
            ControlCode::Name(name) => name,
        };

        let Some(controller) = self.registry.get(event.device_id) else {
            return;
        };
        let Some(player) = controller.slot else {
            return;
        };
        let class = controller.class;

        let routed = match event.kind {
            InputKind::Button => self
                .mapper
                .map_device_button(name, &controller.info.vendor_name, class)
                .map(|button| RoutedEvent::Button { button, pressed: event.is_pressed() }),
            InputKind::Axis => self.mapper.map_axis(name, class).map(|binding| {
                let (x, y) = self.sticks.update(event.device_id, binding, event.value);
                RoutedEvent::Analog { stick: binding.stick, x, y }
            }),
            InputKind::Trigger => self
                .mapper
                .map_trigger(name, class)
                .map(|trigger| RoutedEvent::Trigger { trigger, value: event.value }),
        };
        if let Some(routed) = routed {
            self.router.route(player, routed);
        }
    }

    /// Source notifications may repeat or race a disconnect; those are
    /// ignored.
    fn settle(&mut self, result: crate::registry::Result<RegistryEvents>) {
        match result {
            Ok(events) => self.emit(events),
            Err(e) => print_debug!("ignoring registry update: {e}"),
        }
    }

    fn emit(&mut self, events: RegistryEvents) {
        for event in events {
            match &event {
                RegistryEvent::Assigned { id, slot } => {
                    print_info!("{id} assigned to player {slot}");
                }
                RegistryEvent::Unassigned { id, slot } => {
                    print_info!("{id} removed from player {slot}");
                }
                RegistryEvent::PrimaryChanged(Some(id)) => {
                    print_debug!("primary controller is now {id}");
                }
                RegistryEvent::PrimaryChanged(None) => {
                    print_debug!("no primary controller");
                }
                RegistryEvent::Connected(_) | RegistryEvent::Disconnected(_) => {}
            }
            self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Explicitly moves a controller to a player slot.
    pub fn assign(&mut self, id: DeviceId, slot: PlayerSlot) -> Result<()> {
        let events = self.registry.assign(id, slot)?;
        self.emit(events);
        Ok(())
    }

    pub fn unassign(&mut self, id: DeviceId) -> Result<()> {
        let events = self.registry.unassign(id)?;
        self.emit(events);
        Ok(())
    }

    /// Connected controllers in connection order.
    pub fn controllers(&self) -> Vec<Controller> {
        self.registry.controllers()
    }

    pub fn controller(&self, id: DeviceId) -> Option<&Controller> {
        self.registry.get(id)
    }

    pub fn primary_controller(&self) -> Option<DeviceId> {
        self.registry.primary()
    }

    pub fn mapper(&self) -> &InputMapper {
        &self.mapper
    }

    /// Upserts a mapping override for a whole controller class.
    pub fn set_mapping(&mut self, physical: &str, button: EmulatorButton, class: ControllerClass) {
        self.mapper.set_mapping(physical, button, class);
    }

    /// Applies a vendor profile now and persists it in the background.
    pub fn save_profile(&mut self, profile: ControllerProfile) {
        apply_profile(&mut self.mapper, &profile);
        self.worker.save_profile(profile);
    }

    /// Stored profile for a vendor, as of the last completed write.
    pub fn profile(&self, vendor_name: &str) -> Option<ControllerProfile> {
        self.profiles.get(vendor_name)
    }

    pub fn key_mappings(&self) -> &KeyboardMappings {
        &self.key_mappings
    }

    /// Binds a key for one player. A key already driving another button of
    /// the same player is rejected and nothing changes.
    pub fn bind_key(
        &mut self,
        player: PlayerSlot,
        button: EmulatorButton,
        scan_code: u16,
    ) -> std::result::Result<(), BindingConflict> {
        if let Err(conflict) = self.key_mappings.bind(player, button, scan_code) {
            print_debug!("binding rejected for player {player}: {conflict}");
            return Err(conflict);
        }
        self.worker.save_key_mappings(self.key_mappings.clone());
        Ok(())
    }

    pub fn unbind_key(&mut self, player: PlayerSlot, button: EmulatorButton) {
        if self.key_mappings.unbind(player, button).is_some() {
            self.worker.save_key_mappings(self.key_mappings.clone());
        }
    }

    /// Blocks until queued profile and binding writes are done.
    pub fn flush_persistence(&self) {
        self.worker.flush();
    }

    /// Best-effort rumble on the controller assigned to `player`.
    pub fn rumble(&self, player: PlayerSlot, strength: f32, duration: Duration) -> Result<()> {
        let Some(controller) = self.registry.controller_in(player) else {
            return Err(Error::NoController(player));
        };
        let id = controller.id();
        if !controller.info.capabilities.contains(Capability::Haptics) {
            return Err(HapticError::Unsupported(id).into());
        }
        self.haptics.rumble(id, strength, duration).map_err(|e| {
            print_warning!("rumble failed on {id}: {e}");
            e.into()
        })
    }
}

/// Persistence problems never stop the subsystem; it falls back to memory.
fn open_store(config: &SubsystemConfig) -> Arc<dyn KeyValueStore> {
    let Some(dir) = &config.profile_dir else {
        return Arc::new(MemoryStore::new());
    };
    match FileStore::open(dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            print_warning!(
                "cannot use profile dir {}: {e}, settings will not be saved",
                dir.display()
            );
            Arc::new(MemoryStore::new())
        }
    }
}

fn apply_profile(mapper: &mut InputMapper, profile: &ControllerProfile) {
    mapper.set_vendor_mappings(
        &profile.vendor_name,
        profile.mappings.iter().map(|(physical, button)| (physical.as_str(), *button)),
    );
}
