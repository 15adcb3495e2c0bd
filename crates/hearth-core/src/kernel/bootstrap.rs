use std::fmt;
use std::sync::Arc;

use semver::Version;

use crate::config::HostConfig;
use crate::entity::{AddressableEntity, EntityDirectory, EntityId, Player, SessionReceiver};
use crate::event::{
    DispatchReport, Event, EventRegistry, HandlerError, PlayerChatEvent, PlayerJoinEvent,
    PlayerQuitEvent, RecordingSink,
};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::{PhaseReport, PluginContext, PluginDescriptor, PluginRegistry, PluginState};

/// Coarse position of the host in its startup/shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPhase {
    Idle,
    Loaded,
    SetUp,
    Started,
    Stopped,
}

/// Owns the plugins, the event registry and the entity directory, and drives
/// the plugin lifecycle in a deterministic order.
///
/// Phases take `&mut self` and must be called in sequence:
/// [`load_all`](Host::load_all) (any number of times), then
/// [`run_setup_phase`](Host::run_setup_phase), then
/// [`run_start_phase`](Host::run_start_phase). [`shutdown_all`](Host::shutdown_all)
/// may be called once from any phase. Players can connect and events can be
/// published only while the host is started.
pub struct Host {
    config: HostConfig,
    events: Arc<EventRegistry>,
    entities: Arc<EntityDirectory>,
    plugins: PluginRegistry,
    diagnostics: Arc<RecordingSink>,
    phase: HostPhase,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("phase", &self.phase)
            .field("plugins", &self.plugins)
            .field("events", &self.events)
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

impl Host {
    /// Creates a host with the default configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(HostConfig::default())
    }

    pub fn from_config(config: HostConfig) -> Result<Self> {
        config.validate()?;
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let api_version = Version::parse(constants::API_VERSION)
            .map_err(|e| Error::Other(format!("Internal API version parse error: {}", e)))?;
        let diagnostics = Arc::new(RecordingSink::new());
        let events = Arc::new(EventRegistry::with_sink(diagnostics.clone()));
        // plugins may subscribe during setup but nothing is dispatched before start
        events.hold_dispatch();
        let entities = Arc::new(EntityDirectory::new(config.max_message_bytes));

        Ok(Self {
            config,
            events,
            entities,
            plugins: PluginRegistry::new(api_version),
            diagnostics,
            phase: HostPhase::Idle,
        })
    }

    /// Construct one plugin instance per descriptor, all or nothing.
    pub fn load_all(&mut self, descriptors: Vec<PluginDescriptor>) -> Result<usize> {
        if !matches!(self.phase, HostPhase::Idle | HostPhase::Loaded) {
            return Err(self.out_of_order(KernelLifecyclePhase::Load));
        }
        log::info!("Loading {} plugin(s)...", descriptors.len());

        let events = self.events.clone();
        let entities = self.entities.clone();
        let loaded = self.plugins.load_all(descriptors, |id, settings| {
            PluginContext::new(id, events.clone(), entities.clone(), settings)
        })?;

        self.phase = HostPhase::Loaded;
        Ok(loaded)
    }

    /// Run every plugin's setup hook in load order.
    ///
    /// A failing plugin is marked failed and skipped from then on; the phase
    /// itself still succeeds.
    pub async fn run_setup_phase(&mut self) -> Result<PhaseReport> {
        if !matches!(self.phase, HostPhase::Idle | HostPhase::Loaded) {
            return Err(self.out_of_order(KernelLifecyclePhase::Setup));
        }
        log::info!("Running plugin setup phase...");
        let report = self.plugins.setup_all().await;
        Self::log_phase("Setup", &report);
        self.phase = HostPhase::SetUp;
        Ok(report)
    }

    /// Open event dispatch, run every set-up plugin's start hook, then announce
    /// [`Event::HostStarted`].
    pub async fn run_start_phase(&mut self) -> Result<PhaseReport> {
        if self.phase != HostPhase::SetUp {
            return Err(self.out_of_order(KernelLifecyclePhase::Start));
        }
        log::info!("Running plugin start phase...");
        self.events.open_dispatch();
        let report = self.plugins.start_all().await;
        Self::log_phase("Start", &report);
        self.phase = HostPhase::Started;

        let plugins = self.plugins.count_in(PluginState::Started);
        self.events.publish(&Event::HostStarted { plugins }).await?;
        log::info!("{} started with {} plugin(s)", constants::APP_NAME, plugins);
        Ok(report)
    }

    /// Stop the host.
    ///
    /// Announces [`Event::HostStopping`], shuts plugins down in reverse load
    /// order revoking each one's subscriptions right after its hook, disconnects
    /// every remaining entity and finally tears down the event registry.
    pub async fn shutdown_all(&mut self) -> Result<PhaseReport> {
        if self.phase == HostPhase::Stopped {
            return Err(self.out_of_order(KernelLifecyclePhase::Shutdown));
        }
        log::info!("Shutting down {}...", constants::APP_NAME);

        if self.phase == HostPhase::Started {
            if let Err(e) = self.events.publish(&Event::HostStopping).await {
                log::warn!("Could not announce host shutdown: {}", e);
            }
        }
        let report = self.plugins.shutdown_all().await;
        Self::log_phase("Shutdown", &report);

        let dropped = self.entities.disconnect_all();
        if dropped > 0 {
            log::info!("Disconnected {} remaining entit(y/ies)", dropped);
        }
        self.events.teardown();
        self.phase = HostPhase::Stopped;
        Ok(report)
    }

    /// Join a new player and announce it with [`Event::PlayerJoin`].
    pub async fn connect(&self, name: &str) -> Result<(Arc<Player>, SessionReceiver)> {
        self.ensure_started()?;
        let (player, receiver) = self.entities.join(name)?;
        let event = PlayerJoinEvent {
            entity_id: player.id(),
            name: player.name().to_string(),
        };
        self.events.publish(&event.into()).await?;
        Ok((player, receiver))
    }

    /// Announce [`Event::PlayerQuit`] and then remove the entity.
    ///
    /// Handlers of the quit event can still message the leaving entity.
    pub async fn disconnect(&self, id: EntityId) -> Result<()> {
        self.ensure_started()?;
        let player = self.entities.lookup(id)?;
        let event = PlayerQuitEvent {
            entity_id: id,
            name: player.name().to_string(),
        };
        self.events.publish(&event.into()).await?;
        self.entities.disconnect(id)?;
        Ok(())
    }

    /// Publish a chat line spoken by `id`
    pub async fn chat(&self, id: EntityId, message: &str) -> Result<DispatchReport> {
        self.ensure_started()?;
        self.entities.lookup(id)?;
        let event = PlayerChatEvent {
            entity_id: id,
            message: message.to_string(),
        };
        Ok(self.events.publish(&event.into()).await?)
    }

    pub async fn publish(&self, event: &Event) -> Result<DispatchReport> {
        self.ensure_started()?;
        Ok(self.events.publish(event).await?)
    }

    pub fn lookup_entity(&self, id: EntityId) -> Result<Arc<Player>> {
        Ok(self.entities.lookup(id)?)
    }

    pub fn plugin_state(&self, id: &str) -> Option<PluginState> {
        self.plugins.state(id)
    }

    /// Plugin identifiers in load order
    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins.ids()
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn events(&self) -> &Arc<EventRegistry> {
        &self.events
    }

    pub fn entities(&self) -> &Arc<EntityDirectory> {
        &self.entities
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    /// Every handler failure reported since the host was created
    pub fn handler_failures(&self) -> Vec<HandlerError> {
        self.diagnostics.failures()
    }

    /// Events only flow between the start phase and shutdown.
    fn ensure_started(&self) -> Result<()> {
        let (phase, message) = match self.phase {
            HostPhase::Started => return Ok(()),
            HostPhase::Stopped => (KernelLifecyclePhase::Shutdown, "host has been shut down"),
            _ => (KernelLifecyclePhase::Start, "host has not been started"),
        };
        Err(Error::KernelLifecycleError {
            phase,
            message: message.to_string(),
        })
    }

    fn out_of_order(&self, phase: KernelLifecyclePhase) -> Error {
        let message = format!("cannot run {} while host is {:?}", phase, self.phase);
        log::error!("{}", message);
        Error::KernelLifecycleError { phase, message }
    }

    fn log_phase(name: &str, report: &PhaseReport) {
        if report.is_clean() {
            log::info!("{} phase complete ({} plugin(s))", name, report.succeeded.len());
        } else {
            log::warn!(
                "{} phase complete: {} succeeded, {} failed ({})",
                name,
                report.succeeded.len(),
                report.failed.len(),
                report.failed_ids().join(", ")
            );
        }
    }
}
