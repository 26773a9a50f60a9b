//! Scoped configuration lookups.
//!
//! Settings live in two trees: the network-wide `meshd.conf` and the host
//! file describing one node. Callers name the scope explicitly so that a
//! setting read from the wrong file is a visible mistake rather than a silent
//! fallback.

use crate::error::ConfigError;
use crate::paths::ConfPaths;
use crate::subnet::SubnetSpec;
use crate::tree::{ConfigEntry, ConfigTree};

/// Which configuration tree a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The network-wide `meshd.conf`.
    Global,
    /// The host file of the node being configured.
    Host,
}

/// Read access to scoped configuration.
///
/// Implementors only provide raw entry access; typed lookups are derived.
pub trait ConfigStore {
    /// First entry for `key` in `scope`.
    fn entry(&self, scope: Scope, key: &str) -> Option<&ConfigEntry>;

    /// Every entry for `key` in `scope`, in file order.
    fn entries(&self, scope: Scope, key: &str) -> Vec<&ConfigEntry>;

    /// Raw string value of `key`.
    fn lookup_string(&self, scope: Scope, key: &str) -> Option<String> {
        self.entry(scope, key).map(|entry| entry.value().to_owned())
    }

    /// Boolean value of `key`; an unparsable value is an error.
    fn lookup_bool(&self, scope: Scope, key: &str) -> Result<Option<bool>, ConfigError> {
        self.entry(scope, key).map(ConfigEntry::as_bool).transpose()
    }

    /// Integer value of `key`; an unparsable value is an error.
    fn lookup_int(&self, scope: Scope, key: &str) -> Result<Option<i64>, ConfigError> {
        self.entry(scope, key).map(ConfigEntry::as_int).transpose()
    }

    /// Every `Subnet` entry in `scope`, parsed.
    fn lookup_subnets(&self, scope: Scope) -> Result<Vec<SubnetSpec>, ConfigError> {
        self.entries(scope, "Subnet")
            .into_iter()
            .map(ConfigEntry::as_subnet)
            .collect()
    }
}

/// Global settings paired with one node's host settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    global: ConfigTree,
    host: ConfigTree,
}

impl NodeConfig {
    /// Wraps a global tree; the host tree starts empty.
    #[must_use]
    pub fn new(global: ConfigTree) -> Self {
        Self {
            global,
            host: ConfigTree::new(),
        }
    }

    /// Reads `meshd.conf` from the configuration base.
    pub fn load(paths: &ConfPaths) -> Result<Self, ConfigError> {
        ConfigTree::read(&paths.config_file()).map(Self::new)
    }

    /// Replaces the host tree.
    #[must_use]
    pub fn with_host(mut self, host: ConfigTree) -> Self {
        self.host = host;
        self
    }

    /// Loads the host file for `name`, replacing any previous host tree.
    pub fn read_host(&mut self, paths: &ConfPaths, name: &str) -> Result<(), ConfigError> {
        let path = paths.host_file(name);
        self.host = ConfigTree::read(&path).map_err(|error| match error {
            ConfigError::Read { path, source } => ConfigError::HostFile {
                name: name.to_owned(),
                path,
                source,
            },
            other => other,
        })?;
        Ok(())
    }

    /// Network-wide settings.
    #[must_use]
    pub fn global(&self) -> &ConfigTree {
        &self.global
    }

    /// Settings from the node's host file.
    #[must_use]
    pub fn host(&self) -> &ConfigTree {
        &self.host
    }

    fn tree(&self, scope: Scope) -> &ConfigTree {
        match scope {
            Scope::Global => &self.global,
            Scope::Host => &self.host,
        }
    }
}

impl ConfigStore for NodeConfig {
    fn entry(&self, scope: Scope, key: &str) -> Option<&ConfigEntry> {
        self.tree(scope).lookup(key)
    }

    fn entries(&self, scope: Scope, key: &str) -> Vec<&ConfigEntry> {
        self.tree(scope).lookup_all(key).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn config() -> NodeConfig {
        NodeConfig::new(ConfigTree::new().with("Name", "nodeA").with("TCPOnly", "no"))
            .with_host(
                ConfigTree::new()
                    .with("TCPOnly", "yes")
                    .with("Subnet", "10.1.0.0/16")
                    .with("Subnet", "fd00::/64"),
            )
    }

    #[test]
    fn scopes_are_independent() {
        let config = config();
        assert_eq!(config.lookup_bool(Scope::Global, "TCPOnly").expect("bool"), Some(false));
        assert_eq!(config.lookup_bool(Scope::Host, "TCPOnly").expect("bool"), Some(true));
        assert_eq!(config.lookup_string(Scope::Host, "Name"), None);
    }

    #[test]
    fn collects_subnets_in_order() {
        let subnets = config().lookup_subnets(Scope::Host).expect("subnets");
        let rendered: Vec<String> = subnets.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["10.1.0.0/16", "fd00::/64"]);
    }

    #[test]
    fn bad_subnet_is_reported() {
        let config = NodeConfig::default().with_host(ConfigTree::new().with("Subnet", "10.0.0.1/8"));
        let error = config
            .lookup_subnets(Scope::Host)
            .expect_err("subnet should be rejected");
        assert_eq!(error.key(), Some("Subnet"));
    }

    #[test]
    fn missing_host_file_names_the_node() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        let paths = ConfPaths::new(root, None);
        let mut config = NodeConfig::default();
        let error = config
            .read_host(&paths, "ghost")
            .expect_err("host file is absent");
        assert!(matches!(error, ConfigError::HostFile { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn reads_host_file_from_hosts_directory() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        fs::create_dir_all(root.join("hosts")).expect("hosts dir");
        fs::write(root.join("hosts/nodeA"), "Port = 7000\n").expect("host file");
        let paths = ConfPaths::new(root, None);

        let mut config = NodeConfig::default();
        config.read_host(&paths, "nodeA").expect("host file should load");
        assert_eq!(config.lookup_int(Scope::Host, "Port").expect("int"), Some(7000));
    }
}
