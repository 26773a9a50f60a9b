//! Launch sequencing: process artefacts around the network lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use mesh_config::{ConfPaths, DaemonOptions};
use tracing::{info, warn};

use crate::bootstrap::{ConfigLoader, NodeBootstrap, SystemConfigLoader};
use crate::device::DummyDevice;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::lifecycle::{DaemonState, NetworkLifecycle};
use crate::placeholder::PendingOutgoing;
use crate::script::SystemScriptRunner;

use super::daemonizer::{Daemonizer, SystemDaemonizer};
use super::errors::LaunchError;
use super::guard::{HealthState, ProcessGuard};
use super::paths::ProcessPaths;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Launch mode for the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Fork into the background and detach from the controlling terminal.
    Background,
    /// Remain attached to the terminal.
    Foreground,
}

impl LaunchMode {
    fn from_options(options: &DaemonOptions) -> Self {
        if options.foreground {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// Process-level collaborators.
pub(crate) struct ProcessControl<D, S> {
    pub(crate) mode: LaunchMode,
    pub(crate) daemonizer: D,
    pub(crate) shutdown: S,
    pub(crate) runtime_dir: Option<PathBuf>,
}

/// Network-level collaborators.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) paths: ConfPaths,
}

/// Everything needed to run one network to completion.
pub(crate) struct LaunchPlan<L, D, S> {
    pub(crate) process: ProcessControl<D, S>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the daemon for `options` until a termination signal arrives.
pub fn run_daemon(options: &DaemonOptions) -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            mode: LaunchMode::from_options(options),
            daemonizer: SystemDaemonizer,
            shutdown: SystemShutdownSignal::new(SHUTDOWN_TIMEOUT),
            runtime_dir: options.runtime_dir.clone().map(PathBuf::from),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
            paths: options.conf_paths()?,
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
///
/// Teardown runs whenever start-up was attempted, whether start-up failed,
/// the shutdown wait failed, or a signal arrived.
pub(crate) fn run_daemon_with<L, D, S>(plan: LaunchPlan<L, D, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    D: Daemonizer,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        mode,
        daemonizer,
        shutdown,
        runtime_dir,
    } = process;
    let ServiceDeps {
        loader,
        reporter,
        paths,
    } = services;

    info!(
        target: PROCESS_TARGET,
        ?mode,
        confbase = %paths.confbase(),
        "starting daemon"
    );
    let config = loader.load(&paths)?;
    let process_paths = ProcessPaths::derive(runtime_dir.as_deref(), paths.netname())?;
    let mut guard = ProcessGuard::acquire(process_paths)?;
    if matches!(mode, LaunchMode::Background) {
        daemonizer.daemonize(guard.paths())?;
    }
    guard.write_pid(std::process::id())?;
    guard.write_health(HealthState::Starting)?;

    let device = DummyDevice::from_config(&config);
    let mut state = DaemonState::new(config, Box::new(device));
    let scripts = SystemScriptRunner::new(paths.confbase());
    let outgoing = PendingOutgoing;
    let lifecycle = NetworkLifecycle::new(
        &paths,
        NodeBootstrap::new(&paths),
        &scripts,
        &outgoing,
        reporter,
    );

    if let Err(error) = lifecycle.start(&mut state) {
        lifecycle.stop(&mut state);
        return Err(error.into());
    }

    let waited = guard
        .write_health(HealthState::Ready)
        .and_then(|()| shutdown.wait().map_err(LaunchError::from));
    if let Err(error) = &waited {
        warn!(
            target: PROCESS_TARGET,
            error = %error,
            "supervision failed; stopping network"
        );
    }
    let stopping = guard.write_health(HealthState::Stopping);
    lifecycle.stop(&mut state);
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    waited.and(stopping)
}
