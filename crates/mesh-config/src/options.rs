//! Command-line options of the `meshd` binary.

use camino::Utf8PathBuf;
use clap::Parser;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{DEFAULT_LOG_FILTER, default_confbase};
use crate::error::ConfigError;
use crate::names::check_name;
use crate::paths::ConfPaths;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON for log collectors.
    #[default]
    Json,
    /// Single-line output for terminals.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Options accepted by the daemon.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "meshd", version, about = "Mesh VPN daemon")]
pub struct DaemonOptions {
    /// Configuration base directory; overrides the one derived from `--net`.
    #[arg(short = 'c', long = "config", value_name = "DIR", env = "MESHD_CONFIG")]
    pub config: Option<Utf8PathBuf>,
    /// Network to join; selects `/etc/meshd/<NAME>`.
    #[arg(short = 'n', long = "net", value_name = "NAME", env = "NETNAME")]
    pub net: Option<String>,
    /// Tracing filter directive.
    #[arg(long, env = "MESHD_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log output format (`json` or `compact`).
    #[arg(long, env = "MESHD_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
    /// Stay attached to the terminal instead of daemonising.
    #[arg(short = 'D', long, env = "MESHD_FOREGROUND")]
    pub foreground: bool,
    /// Directory for the lock, PID and health files.
    #[arg(long, value_name = "DIR", env = "MESHD_RUNTIME_DIR")]
    pub runtime_dir: Option<Utf8PathBuf>,
}

impl DaemonOptions {
    /// Resolves the configuration layout, validating the network name.
    pub fn conf_paths(&self) -> Result<ConfPaths, ConfigError> {
        if let Some(net) = self.net.as_deref() {
            check_name("network name", net)?;
        }
        let confbase = self
            .config
            .clone()
            .unwrap_or_else(|| default_confbase(self.net.as_deref()));
        Ok(ConfPaths::new(confbase, self.net.clone()))
    }
}
