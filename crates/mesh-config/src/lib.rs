//! Configuration model shared by the mesh daemon and its tests.
//!
//! A network is configured through a directory holding `meshd.conf` and one
//! host file per node under `hosts/`. This crate parses those files into
//! ordered trees, exposes typed lookups scoped to either file, and defines the
//! enumerations, defaults and command-line options that the daemon agrees on.

mod error;
mod modes;
mod names;
mod options;
mod paths;
mod scope;
mod subnet;
mod tree;

pub mod defaults;

pub use error::{ConfigError, Origin};
pub use modes::{AddressFamily, ModeParseError, RoutingMode};
pub use names::{check_name, is_valid_name};
pub use options::{DaemonOptions, LogFormat, LogFormatParseError};
pub use paths::{CONFIG_FILE_NAME, ConfPaths, HOSTS_DIR_NAME, PRIVATE_KEY_FILE_NAME};
pub use scope::{ConfigStore, NodeConfig, Scope};
pub use subnet::{MacAddress, SubnetParseError, SubnetSpec};
pub use tree::{ConfigEntry, ConfigTree};
