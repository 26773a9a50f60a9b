//! Up and down hook scripts.

use std::io;
use std::process::{Command, ExitStatus};

use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::{debug, info};

const SCRIPT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::script");

/// Script run after the network comes up.
pub const UP_SCRIPT: &str = "mesh-up";
/// Script run while the network goes down.
pub const DOWN_SCRIPT: &str = "mesh-down";

/// Errors raised while running a hook script. Never fatal to the daemon.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script could not be started.
    #[error("failed to execute script '{script}': {source}")]
    Spawn {
        /// Script name.
        script: String,
        /// Spawn error.
        #[source]
        source: io::Error,
    },
    /// The script ran but did not succeed.
    #[error("script '{script}' failed: {status}")]
    Failed {
        /// Script name.
        script: String,
        /// Exit status.
        status: ExitStatus,
    },
}

/// The variables handed to every hook script; nothing else is passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptEnvironment {
    /// Network name, empty without `--net`.
    pub netname: String,
    /// Device path or name.
    pub device: String,
    /// Interface name.
    pub interface: String,
    /// Local node name, empty before the identity exists.
    pub name: String,
}

impl ScriptEnvironment {
    /// Variable names and values.
    #[must_use]
    pub fn vars(&self) -> [(&'static str, &str); 4] {
        [
            ("NETNAME", self.netname.as_str()),
            ("DEVICE", self.device.as_str()),
            ("INTERFACE", self.interface.as_str()),
            ("NAME", self.name.as_str()),
        ]
    }
}

/// Runs hook scripts.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptRunner {
    /// Runs `script` with exactly the variables in `environment`.
    fn run(&self, script: &str, environment: &ScriptEnvironment) -> Result<(), ScriptError>;
}

/// Runs `<confbase>/<script>` when it exists.
#[derive(Debug, Clone)]
pub struct SystemScriptRunner {
    confbase: Utf8PathBuf,
}

impl SystemScriptRunner {
    /// Runner for scripts under `confbase`.
    #[must_use]
    pub fn new(confbase: impl Into<Utf8PathBuf>) -> Self {
        Self {
            confbase: confbase.into(),
        }
    }
}

impl ScriptRunner for SystemScriptRunner {
    fn run(&self, script: &str, environment: &ScriptEnvironment) -> Result<(), ScriptError> {
        let path = self.confbase.join(script);
        if !path.is_file() {
            debug!(target: SCRIPT_TARGET, script, path = %path, "no script installed");
            return Ok(());
        }

        info!(target: SCRIPT_TARGET, script, "executing script");
        let status = Command::new(path.as_std_path())
            .current_dir(&self.confbase)
            .env_clear()
            .envs(environment.vars())
            .status()
            .map_err(|source| ScriptError::Spawn {
                script: script.to_owned(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ScriptError::Failed {
                script: script.to_owned(),
                status,
            })
        }
    }
}
