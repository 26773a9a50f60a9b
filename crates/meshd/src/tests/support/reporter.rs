//! Test double for [`HealthReporter`] that records structured events for
//! assertions.

use std::sync::Mutex;

use mesh_config::ConfPaths;

use crate::health::HealthReporter;
use crate::identity::LocalIdentity;
use crate::lifecycle::{StartError, StartupStep, TeardownReport};
use crate::script::ScriptError;

/// Health events observed during a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Start-up began.
    Starting,
    /// A start-up step finished.
    Step(StartupStep),
    /// The network came up.
    Succeeded {
        /// Local node name.
        node: String,
        /// Open endpoints.
        listeners: usize,
    },
    /// Start-up aborted at `step`.
    Failed {
        /// Step that failed.
        step: StartupStep,
        /// Rendered error.
        message: String,
    },
    /// A hook script failed.
    ScriptFailed(String),
    /// Teardown finished.
    Stopped(TeardownReport),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Completed start-up steps, in order.
    pub fn steps(&self) -> Vec<StartupStep> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::Step(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn startup_starting(&self, _paths: &ConfPaths) {
        self.record(HealthEvent::Starting);
    }

    fn step_completed(&self, step: StartupStep) {
        self.record(HealthEvent::Step(step));
    }

    fn startup_succeeded(&self, identity: &LocalIdentity, listeners: usize) {
        self.record(HealthEvent::Succeeded {
            node: identity.name().to_owned(),
            listeners,
        });
    }

    fn startup_failed(&self, error: &StartError) {
        self.record(HealthEvent::Failed {
            step: error.step(),
            message: error.to_string(),
        });
    }

    fn script_failed(&self, error: &ScriptError) {
        self.record(HealthEvent::ScriptFailed(error.to_string()));
    }

    fn shutdown_completed(&self, report: &TeardownReport) {
        self.record(HealthEvent::Stopped(report.clone()));
    }
}
