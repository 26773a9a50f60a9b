//! Runtime artefact locations for one network.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::runtime_dir;
use nix::unistd::geteuid;

use super::errors::LaunchError;

const RUNTIME_SUBDIR: &str = env!("CARGO_PKG_NAME");

/// Lock, PID and health file paths. Each network gets its own set so
/// several can run side by side.
#[derive(Debug, Clone)]
pub struct ProcessPaths {
    runtime_dir: PathBuf,
    lock_path: PathBuf,
    pid_path: PathBuf,
    health_path: PathBuf,
}

impl ProcessPaths {
    /// Derives the paths under `runtime_dir`, or the per-user default, and
    /// creates the directory.
    pub(crate) fn derive(
        runtime_dir: Option<&Path>,
        netname: Option<&str>,
    ) -> Result<Self, LaunchError> {
        let runtime_dir = runtime_dir.map_or_else(default_runtime_directory, Path::to_path_buf);
        fs::create_dir_all(&runtime_dir).map_err(|source| LaunchError::RuntimeDirectory {
            path: runtime_dir.clone(),
            source,
        })?;
        let stem = netname.map_or_else(
            || RUNTIME_SUBDIR.to_owned(),
            |net| format!("{RUNTIME_SUBDIR}.{net}"),
        );
        Ok(Self {
            lock_path: runtime_dir.join(format!("{stem}.lock")),
            pid_path: runtime_dir.join(format!("{stem}.pid")),
            health_path: runtime_dir.join(format!("{stem}.health")),
            runtime_dir,
        })
    }

    /// Directory holding runtime artefacts.
    pub fn runtime_dir(&self) -> &Path {
        self.runtime_dir.as_path()
    }

    /// Path to the lock file guarding singleton startup.
    pub fn lock_path(&self) -> &Path {
        self.lock_path.as_path()
    }

    /// Path to the PID file.
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Path to the health snapshot.
    pub fn health_path(&self) -> &Path {
        self.health_path.as_path()
    }
}

fn default_runtime_directory() -> PathBuf {
    if let Some(mut dir) = runtime_dir() {
        dir.push(RUNTIME_SUBDIR);
        dir
    } else {
        let mut dir = env::temp_dir();
        dir.push(RUNTIME_SUBDIR);
        dir.push(format!("uid-{}", geteuid().as_raw()));
        dir
    }
}
