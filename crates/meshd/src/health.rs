//! Structured health reporting for network lifecycle events.

use std::sync::Arc;

use mesh_config::ConfPaths;

use crate::identity::LocalIdentity;
use crate::lifecycle::{StartError, StartupStep, TeardownReport};
use crate::script::ScriptError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before any start-up step runs.
    fn startup_starting(&self, paths: &ConfPaths);

    /// Invoked after each start-up step completes.
    fn step_completed(&self, step: StartupStep);

    /// Invoked once the network is up.
    fn startup_succeeded(&self, identity: &LocalIdentity, listeners: usize);

    /// Invoked when start-up aborts.
    fn startup_failed(&self, error: &StartError);

    /// Invoked when a hook script fails; never fatal.
    fn script_failed(&self, error: &ScriptError);

    /// Invoked after teardown has run every step.
    fn shutdown_completed(&self, report: &TeardownReport);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn startup_starting(&self, paths: &ConfPaths) {
        (**self).startup_starting(paths);
    }

    fn step_completed(&self, step: StartupStep) {
        (**self).step_completed(step);
    }

    fn startup_succeeded(&self, identity: &LocalIdentity, listeners: usize) {
        (**self).startup_succeeded(identity, listeners);
    }

    fn startup_failed(&self, error: &StartError) {
        (**self).startup_failed(error);
    }

    fn script_failed(&self, error: &ScriptError) {
        (**self).script_failed(error);
    }

    fn shutdown_completed(&self, report: &TeardownReport) {
        (**self).shutdown_completed(report);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn startup_starting(&self, paths: &ConfPaths) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_starting",
            confbase = %paths.confbase(),
            netname = paths.netname().unwrap_or_default(),
            "starting network"
        );
    }

    fn step_completed(&self, step: StartupStep) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "step_completed",
            step = %step,
            "start-up step completed"
        );
    }

    fn startup_succeeded(&self, identity: &LocalIdentity, listeners: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_succeeded",
            node = identity.name(),
            mode = %identity.mode(),
            port = identity.port(),
            listeners,
            "network started"
        );
    }

    fn startup_failed(&self, error: &StartError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "startup_failed",
            step = %error.step(),
            error = %error,
            "network start-up failed"
        );
    }

    fn script_failed(&self, error: &ScriptError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "script_failed",
            error = %error,
            "hook script failed"
        );
    }

    fn shutdown_completed(&self, report: &TeardownReport) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            connections = report.connections.connections,
            outgoing = report.connections.outgoing,
            listeners = report.listeners,
            registries = report.registries.len(),
            device_closed = report.device_closed,
            "network stopped"
        );
    }
}
