//! Bootstrap and lifecycle core of a mesh VPN daemon.
//!
//! A network starts by loading its configuration, resolving the local node's
//! identity (name, key pair, cipher suite, timeouts) and opening one TCP and
//! one UDP socket per bind address. [`NetworkLifecycle`] sequences that
//! start-up against a [`DaemonState`] and tears everything down in reverse on
//! shutdown, even when start-up stopped part way.
//!
//! Routing, the meta protocol and packet forwarding live elsewhere; the
//! [`TopologyEngine`] and [`OutgoingConnector`] traits are the seams through
//! which they plug in.

mod bootstrap;
pub mod credentials;
mod device;
mod health;
mod identity;
mod lifecycle;
pub mod listener;
mod outgoing;
mod placeholder;
mod process;
pub mod registry;
mod script;
pub mod suite;
mod telemetry;
mod topology;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, NodeBootstrap, StaticConfigLoader,
    SystemConfigLoader,
};
pub use device::{DUMMY_DEVICE_NAME, Device, DeviceError, DeviceStats, DummyDevice};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use identity::{IdentitySettings, LocalIdentity, NodeOptions, NodeTimeouts};
pub use lifecycle::{
    DaemonState, NetworkLifecycle, StartError, StartupStep, TeardownReport, ping_timeout,
};
pub use outgoing::OutgoingConnector;
pub use placeholder::{NoopTopology, PendingOutgoing};
pub use process::{LaunchError, LaunchMode, run_daemon};
pub use script::{
    DOWN_SCRIPT, ScriptEnvironment, ScriptError, ScriptRunner, SystemScriptRunner, UP_SCRIPT,
};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use topology::TopologyEngine;

#[cfg(test)]
mod tests;
