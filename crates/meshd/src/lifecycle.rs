//! Network start-up and teardown.
//!
//! [`NetworkLifecycle::start`] runs a strict sequence over a [`DaemonState`]:
//! registries, ping timeout, device, local node, up script, outgoing
//! connections. [`NetworkLifecycle::stop`] undoes whatever the state holds,
//! in reverse, and always runs to the end.
//! [`DaemonState::run_due_events`] handles the timed work a running network
//! owns: key rotation and ping checks.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use mesh_config::defaults::{DEFAULT_PING_TIMEOUT, FALLBACK_PING_TIMEOUT};
use mesh_config::{ConfPaths, ConfigError, ConfigStore, NodeConfig, Scope, is_valid_name};
use strum::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bootstrap::{BootstrapError, Bootstrapped, NodeBootstrap, node_name};
use crate::device::{Device, DeviceError, DeviceStats};
use crate::health::HealthReporter;
use crate::identity::LocalIdentity;
use crate::listener::ListenerSet;
use crate::outgoing::OutgoingConnector;
use crate::registry::{
    Connection, ConnectionRegistry, EventKind, RegistryKind, Registries, Terminated,
};
use crate::script::{DOWN_SCRIPT, ScriptEnvironment, ScriptRunner, UP_SCRIPT};
use crate::suite::{SuiteError, schedule_expiry};

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Start-up steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StartupStep {
    /// Registries created.
    Registries,
    /// `PingTimeout` resolved.
    PingTimeout,
    /// Device opened.
    Device,
    /// Local node configured, registered and listening.
    Bootstrap,
    /// Up script run.
    UpScript,
    /// Outgoing connections attempted.
    Outgoing,
}

/// Errors that abort start-up.
#[derive(Debug, Error)]
pub enum StartError {
    /// `PingTimeout` was not an integer.
    #[error("failed to read PingTimeout: {0}")]
    PingTimeout(#[source] ConfigError),
    /// The device could not be opened.
    #[error("failed to open device: {0}")]
    Device(#[from] DeviceError),
    /// The local node could not be set up.
    #[error("failed to set up local node: {0}")]
    Bootstrap(#[from] BootstrapError),
}

impl StartError {
    /// Step that failed.
    #[must_use]
    pub fn step(&self) -> StartupStep {
        match self {
            Self::PingTimeout(_) => StartupStep::PingTimeout,
            Self::Device(_) => StartupStep::Device,
            Self::Bootstrap(_) => StartupStep::Bootstrap,
        }
    }
}

/// What [`NetworkLifecycle::stop`] released.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// Peer connections closed and outgoing records freed.
    pub connections: Terminated,
    /// Whether the node's own connection was closed.
    pub own_connection: bool,
    /// Listening endpoints closed.
    pub listeners: usize,
    /// Registries released, in release order.
    pub registries: Vec<RegistryKind>,
    /// Whether the down script ran and succeeded.
    pub down_script: Option<bool>,
    /// Whether the device was closed.
    pub device_closed: bool,
    /// Device counters at close.
    pub device_stats: Option<DeviceStats>,
}

/// Everything a running network owns.
pub struct DaemonState {
    config: NodeConfig,
    device: Box<dyn Device>,
    device_open: bool,
    registries: Registries,
    node_name: Option<String>,
    identity: Option<LocalIdentity>,
    own_connection: Option<Connection>,
    listeners: ListenerSet,
    ping_timeout: Duration,
    running: bool,
}

impl DaemonState {
    /// State for a network that has not started.
    #[must_use]
    pub fn new(config: NodeConfig, device: Box<dyn Device>) -> Self {
        Self {
            config,
            device,
            device_open: false,
            registries: Registries::default(),
            node_name: None,
            identity: None,
            own_connection: None,
            listeners: ListenerSet::default(),
            ping_timeout: Duration::from_secs(DEFAULT_PING_TIMEOUT.unsigned_abs()),
            running: false,
        }
    }

    /// Configuration, including the node's host settings once read.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Registries.
    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// The local node, once bootstrapped.
    #[must_use]
    pub fn identity(&self) -> Option<&LocalIdentity> {
        self.identity.as_ref()
    }

    /// Mutable access to the local node, for key rotation.
    pub fn identity_mut(&mut self) -> Option<&mut LocalIdentity> {
        self.identity.as_mut()
    }

    /// The node's own control connection.
    #[must_use]
    pub fn own_connection(&self) -> Option<&Connection> {
        self.own_connection.as_ref()
    }

    /// Listening endpoints.
    #[must_use]
    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    /// Resolved ping timeout.
    #[must_use]
    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    /// Whether the device is open.
    #[must_use]
    pub fn device_open(&self) -> bool {
        self.device_open
    }

    /// Validated node name; kept even when bootstrap fails later on.
    #[must_use]
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    /// Runs every timed event due at `now` and returns the kinds handled, in
    /// firing order.
    ///
    /// A key expiry rotates the data-channel key and schedules the next
    /// rotation. A ping check re-arms itself one ping timeout later.
    pub fn run_due_events(&mut self, now: SystemTime) -> Result<Vec<EventKind>, SuiteError> {
        let Some(events) = self.registries.events.as_mut() else {
            return Ok(Vec::new());
        };
        let due = events.due(now);
        let mut handled = Vec::with_capacity(due.len());
        for event in due {
            match event.kind {
                EventKind::KeyExpiry => {
                    if let Some(identity) = self.identity.as_mut() {
                        if identity.rotate_key_if_expired(now)? {
                            info!(
                                target: LIFECYCLE_TARGET,
                                node = identity.name(),
                                "data-channel key rotated"
                            );
                        }
                        events.schedule(EventKind::KeyExpiry, identity.key().expires_at());
                    }
                }
                EventKind::PingCheck => {
                    let connections = self
                        .registries
                        .connections
                        .as_ref()
                        .map_or(0, ConnectionRegistry::len);
                    debug!(
                        target: LIFECYCLE_TARGET,
                        connections,
                        "checking connections for ping timeouts"
                    );
                    events.schedule(
                        EventKind::PingCheck,
                        schedule_expiry(now, self.ping_timeout),
                    );
                }
            }
            handled.push(event.kind);
        }
        Ok(handled)
    }
}

/// Sequences start-up and teardown of a network.
pub struct NetworkLifecycle<'a> {
    paths: &'a ConfPaths,
    bootstrap: NodeBootstrap<'a>,
    scripts: &'a dyn ScriptRunner,
    outgoing: &'a dyn OutgoingConnector,
    reporter: Arc<dyn HealthReporter>,
}

impl<'a> NetworkLifecycle<'a> {
    /// Builds a lifecycle over the supplied collaborators.
    #[must_use]
    pub fn new(
        paths: &'a ConfPaths,
        bootstrap: NodeBootstrap<'a>,
        scripts: &'a dyn ScriptRunner,
        outgoing: &'a dyn OutgoingConnector,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            paths,
            bootstrap,
            scripts,
            outgoing,
            reporter,
        }
    }

    /// Brings the network up.
    ///
    /// On error the state keeps whatever was acquired; pass it to
    /// [`stop`](Self::stop) to release it.
    pub fn start(&self, state: &mut DaemonState) -> Result<(), StartError> {
        self.reporter.startup_starting(self.paths);
        state.running = true;
        self.run_startup(state).inspect_err(|error| {
            self.reporter.startup_failed(error);
        })
    }

    fn run_startup(&self, state: &mut DaemonState) -> Result<(), StartError> {
        state.registries.init();
        self.reporter.step_completed(StartupStep::Registries);

        state.ping_timeout = ping_timeout(&state.config).map_err(StartError::PingTimeout)?;
        if let Some(events) = state.registries.events.as_mut() {
            events.schedule(
                EventKind::PingCheck,
                schedule_expiry(SystemTime::now(), state.ping_timeout),
            );
        }
        self.reporter.step_completed(StartupStep::PingTimeout);

        state.device.open()?;
        state.device_open = true;
        self.reporter.step_completed(StartupStep::Device);

        state.node_name = Some(node_name(&state.config)?);
        let Bootstrapped {
            identity,
            listeners,
        } = self.bootstrap.bootstrap(
            &mut state.config,
            &mut state.registries,
            SystemTime::now(),
        )?;
        state.own_connection = Some(Connection::new(identity.name()));
        state.listeners = listeners;
        state.identity = Some(identity);
        self.reporter.step_completed(StartupStep::Bootstrap);

        if let Err(error) = self.scripts.run(UP_SCRIPT, &self.environment(state)) {
            self.reporter.script_failed(&error);
        }
        self.reporter.step_completed(StartupStep::UpScript);

        let peers = connect_to_peers(&state.config);
        if let Some(connections) = state.registries.connections.as_mut() {
            self.outgoing.try_outgoing(&peers, connections);
        }
        self.reporter.step_completed(StartupStep::Outgoing);

        if let Some(identity) = &state.identity {
            self.reporter
                .startup_succeeded(identity, state.listeners.len());
        }
        Ok(())
    }

    /// Tears the network down. Absent resources are skipped and every step
    /// runs regardless of earlier ones; calling it again does nothing.
    pub fn stop(&self, state: &mut DaemonState) -> TeardownReport {
        let mut report = TeardownReport::default();

        if let Some(connections) = state.registries.connections.as_mut() {
            report.connections = connections.terminate_all();
        }
        if let Some(mut own) = state.own_connection.take() {
            own.terminate();
            report.own_connection = true;
        }
        report.listeners = state.listeners.close_all();
        report.registries = state.registries.teardown();

        if state.running {
            let outcome = self.scripts.run(DOWN_SCRIPT, &self.environment(state));
            if let Err(error) = &outcome {
                self.reporter.script_failed(error);
            }
            report.down_script = Some(outcome.is_ok());
        }

        if state.device_open {
            state.device.close();
            state.device_open = false;
            report.device_closed = true;
            report.device_stats = Some(state.device.stats());
        }

        state.identity = None;
        state.node_name = None;
        if state.running {
            state.running = false;
            self.reporter.shutdown_completed(&report);
        }
        report
    }

    fn environment(&self, state: &DaemonState) -> ScriptEnvironment {
        ScriptEnvironment {
            netname: self.paths.netname().unwrap_or_default().to_owned(),
            device: state.device.device_name().to_owned(),
            interface: state.device.interface().to_owned(),
            name: state.node_name.clone().unwrap_or_default(),
        }
    }
}

/// Resolves `PingTimeout`; values below one second select a day.
pub fn ping_timeout(config: &dyn ConfigStore) -> Result<Duration, ConfigError> {
    let seconds = config
        .lookup_int(Scope::Global, "PingTimeout")?
        .unwrap_or(DEFAULT_PING_TIMEOUT);
    let seconds = if seconds < 1 {
        FALLBACK_PING_TIMEOUT
    } else {
        seconds
    };
    Ok(Duration::from_secs(seconds.unsigned_abs()))
}

fn connect_to_peers(config: &dyn ConfigStore) -> Vec<String> {
    config
        .entries(Scope::Global, "ConnectTo")
        .into_iter()
        .filter_map(|entry| {
            if is_valid_name(entry.value()) {
                Some(entry.value().to_owned())
            } else {
                warn!(
                    target: LIFECYCLE_TARGET,
                    peer = entry.value(),
                    origin = %entry.origin(),
                    "ignoring ConnectTo with invalid node name"
                );
                None
            }
        })
        .inspect(|peer| info!(target: LIFECYCLE_TARGET, peer = %peer, "connecting to peer"))
        .collect()
}
