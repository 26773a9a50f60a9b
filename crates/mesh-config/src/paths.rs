//! Layout of a network's configuration directory.
//!
//! ```text
//! <confbase>/meshd.conf      global settings
//! <confbase>/rsa_key.priv    default private key
//! <confbase>/hosts/<name>    per-node settings and public key
//! <confbase>/mesh-up         optional hook scripts
//! ```

use camino::{Utf8Path, Utf8PathBuf};

/// Name of the global configuration file.
pub const CONFIG_FILE_NAME: &str = "meshd.conf";

/// Name of the default private key file.
pub const PRIVATE_KEY_FILE_NAME: &str = "rsa_key.priv";

/// Name of the directory holding host files.
pub const HOSTS_DIR_NAME: &str = "hosts";

/// Paths derived from the configuration base of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfPaths {
    confbase: Utf8PathBuf,
    netname: Option<String>,
}

impl ConfPaths {
    /// Builds paths rooted at `confbase` for the optional network `netname`.
    #[must_use]
    pub fn new(confbase: impl Into<Utf8PathBuf>, netname: Option<String>) -> Self {
        Self {
            confbase: confbase.into(),
            netname,
        }
    }

    /// Configuration base directory.
    #[must_use]
    pub fn confbase(&self) -> &Utf8Path {
        &self.confbase
    }

    /// Network name, when one was selected.
    #[must_use]
    pub fn netname(&self) -> Option<&str> {
        self.netname.as_deref()
    }

    /// Global configuration file.
    #[must_use]
    pub fn config_file(&self) -> Utf8PathBuf {
        self.confbase.join(CONFIG_FILE_NAME)
    }

    /// Directory of host files.
    #[must_use]
    pub fn hosts_dir(&self) -> Utf8PathBuf {
        self.confbase.join(HOSTS_DIR_NAME)
    }

    /// Host file for `name`.
    #[must_use]
    pub fn host_file(&self, name: &str) -> Utf8PathBuf {
        self.hosts_dir().join(name)
    }

    /// Default private key location.
    #[must_use]
    pub fn private_key_file(&self) -> Utf8PathBuf {
        self.confbase.join(PRIVATE_KEY_FILE_NAME)
    }

    /// Hook script called `name`.
    #[must_use]
    pub fn script(&self, name: &str) -> Utf8PathBuf {
        self.confbase.join(name)
    }
}
