//! Assembly of the local node from configuration.
//!
//! [`NodeBootstrap`] resolves the node's name, keys, options and cipher
//! suite into a [`LocalIdentity`], registers it with the node, subnet and
//! event registries, asks the topology engine to recompute, and opens the
//! listening sockets. Any failure aborts the whole sequence and surfaces the
//! specific cause.

use std::str::FromStr;
use std::time::{Duration, SystemTime};

use mesh_config::defaults::{DEFAULT_MAC_EXPIRE, DEFAULT_MAX_TIMEOUT, DEFAULT_PORT};
use mesh_config::{
    AddressFamily, ConfPaths, ConfigError, ConfigStore, NodeConfig, RoutingMode, Scope, check_name,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::credentials::{
    CredentialError, FsKeyReader, KeyReader, Keypair, load_private_key, load_public_key,
};
use crate::identity::{IdentitySettings, LocalIdentity, NodeOptions, NodeTimeouts};
use crate::listener::{
    ListenerError, ListenerSet, Resolver, SocketFactory, SystemResolver, SystemSocketFactory,
};
use crate::placeholder::NoopTopology;
use crate::registry::{EventKind, RegistryKind, Registries};
use crate::suite::{CipherSuite, EphemeralKey, SuiteError, key_lifetime};
use crate::topology::TopologyEngine;

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");
const PRIORITY_INHERITANCE_SUPPORTED: bool = cfg!(target_os = "linux");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the global configuration for `paths`.
    fn load(&self, paths: &ConfPaths) -> Result<NodeConfig, ConfigError>;
}

/// Loader that reads `meshd.conf` from the configuration base.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self, paths: &ConfPaths) -> Result<NodeConfig, ConfigError> {
        NodeConfig::load(paths)
    }
}

/// Loader that returns a pre-built configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: NodeConfig,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _paths: &ConfPaths) -> Result<NodeConfig, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced while bootstrapping the local node.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A setting was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Key material could not be loaded or did not match.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The cipher suite could not be selected or keyed.
    #[error(transparent)]
    Suite(#[from] SuiteError),
    /// No listening socket could be opened.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// A registry the node must be recorded in does not exist.
    #[error("the {registry} registry is not initialised")]
    RegistryUnavailable {
        /// Missing registry.
        registry: RegistryKind,
    },
}

impl BootstrapError {
    /// Name of the setting the error refers to, when there is one.
    #[must_use]
    pub fn setting(&self) -> Option<&str> {
        match self {
            Self::Config(error) => error.key(),
            Self::Suite(error) => error.setting(),
            Self::Credential(_) | Self::Listener(_) | Self::RegistryUnavailable { .. } => None,
        }
    }
}

/// Result of a successful bootstrap.
#[derive(Debug)]
pub struct Bootstrapped {
    /// The local node.
    pub identity: LocalIdentity,
    /// Its listening endpoints.
    pub listeners: ListenerSet,
}

/// Builds and registers the local node.
pub struct NodeBootstrap<'a> {
    paths: &'a ConfPaths,
    reader: &'a dyn KeyReader,
    topology: &'a dyn TopologyEngine,
    resolver: &'a dyn Resolver,
    sockets: &'a dyn SocketFactory,
}

impl<'a> NodeBootstrap<'a> {
    /// Bootstrap using the filesystem, system sockets and no graph engine.
    #[must_use]
    pub fn new(paths: &'a ConfPaths) -> Self {
        Self {
            paths,
            reader: &FsKeyReader,
            topology: &NoopTopology,
            resolver: &SystemResolver,
            sockets: &SystemSocketFactory,
        }
    }

    /// Replaces the key file reader.
    #[must_use]
    pub fn with_key_reader(mut self, reader: &'a dyn KeyReader) -> Self {
        self.reader = reader;
        self
    }

    /// Replaces the topology engine.
    #[must_use]
    pub fn with_topology(mut self, topology: &'a dyn TopologyEngine) -> Self {
        self.topology = topology;
        self
    }

    /// Replaces the bind address resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: &'a dyn Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the socket factory.
    #[must_use]
    pub fn with_sockets(mut self, sockets: &'a dyn SocketFactory) -> Self {
        self.sockets = sockets;
        self
    }

    /// Runs the full sequence: resolve, register, bind.
    pub fn bootstrap(
        &self,
        config: &mut NodeConfig,
        registries: &mut Registries,
        now: SystemTime,
    ) -> Result<Bootstrapped, BootstrapError> {
        let identity = self.resolve_identity(config, now)?;
        self.register(&identity, registries)?;
        let listeners = self.bind(&identity)?;
        Ok(Bootstrapped {
            identity,
            listeners,
        })
    }

    /// Resolves every setting of the local node and generates its
    /// data-channel key. Reads the node's host file into `config`.
    pub fn resolve_identity(
        &self,
        config: &mut NodeConfig,
        now: SystemTime,
    ) -> Result<LocalIdentity, BootstrapError> {
        let name = node_name(config)?;

        let private = load_private_key(config, self.paths, self.reader)?;
        config.read_host(self.paths, &name)?;
        let public = load_public_key(config, &name, self.paths, self.reader)?;
        let keypair = Keypair::new(&name, private, public)?;

        let port = config
            .lookup_string(Scope::Host, "Port")
            .unwrap_or_else(|| DEFAULT_PORT.to_owned());
        let subnets = config.lookup_subnets(Scope::Host)?;
        let options = NodeOptions::new(
            either_scope(config, "IndirectData")?,
            either_scope(config, "TCPOnly")?,
        );
        let mode: RoutingMode = parse_setting(config, "Mode", "expected router, switch or hub")?
            .unwrap_or_default();

        let priority_inheritance = config
            .lookup_bool(Scope::Global, "PriorityInheritance")?
            .unwrap_or(false);
        if priority_inheritance && !PRIORITY_INHERITANCE_SUPPORTED {
            warn!(
                target: BOOTSTRAP_TARGET,
                "PriorityInheritance not supported on this platform"
            );
        }

        let family: AddressFamily = parse_setting(config, "AddressFamily", "expected IPv4, IPv6 or any")?
            .unwrap_or_default();
        let hostnames = config
            .lookup_bool(Scope::Global, "Hostnames")?
            .unwrap_or(false);
        let timeouts = NodeTimeouts {
            mac_expire: seconds(config, Scope::Global, "MACExpire", DEFAULT_MAC_EXPIRE, 0)?,
            max_timeout: seconds(config, Scope::Host, "MaxTimeout", DEFAULT_MAX_TIMEOUT, 1)?,
            key_lifetime: key_lifetime(config)?,
        };

        let suite = CipherSuite::negotiate(config)?;
        let key = EphemeralKey::generate(suite.cipher(), now, timeouts.key_lifetime)?;

        let settings = IdentitySettings {
            name,
            port,
            bind_address: config.lookup_string(Scope::Global, "BindToAddress"),
            mode,
            family,
            options,
            subnets,
            suite,
            timeouts,
            priority_inheritance,
            hostnames,
        };
        let identity = LocalIdentity::new(settings, keypair, key);
        info!(
            target: BOOTSTRAP_TARGET,
            node = identity.name(),
            mode = %identity.mode(),
            port = identity.port(),
            fingerprint = %identity.keypair().public().fingerprint(),
            "local node configured"
        );
        Ok(identity)
    }

    /// Records the node and its subnets, schedules key rotation, and
    /// triggers a topology recompute.
    pub fn register(
        &self,
        identity: &LocalIdentity,
        registries: &mut Registries,
    ) -> Result<(), BootstrapError> {
        let subnets = registries
            .subnets
            .as_mut()
            .ok_or(BootstrapError::RegistryUnavailable {
                registry: RegistryKind::Subnets,
            })?;
        for subnet in identity.subnets() {
            subnets.add(identity.name(), *subnet);
        }

        if let Some(events) = registries.events.as_mut() {
            events.schedule(EventKind::KeyExpiry, identity.key().expires_at());
        }

        let nodes = registries
            .nodes
            .as_mut()
            .ok_or(BootstrapError::RegistryUnavailable {
                registry: RegistryKind::Nodes,
            })?;
        nodes.register(identity.node_entry());
        let edges = registries
            .edges
            .as_ref()
            .ok_or(BootstrapError::RegistryUnavailable {
                registry: RegistryKind::Edges,
            })?;
        self.topology.recompute(nodes, edges);
        Ok(())
    }

    /// Opens the node's listening sockets.
    pub fn bind(&self, identity: &LocalIdentity) -> Result<ListenerSet, BootstrapError> {
        ListenerSet::bind_all_with(
            self.resolver,
            self.sockets,
            identity.settings().bind_address.as_deref(),
            identity.port(),
            identity.family(),
        )
        .map_err(Into::into)
    }
}

/// The configured `Name`, validated as a node identifier.
pub fn node_name(config: &dyn ConfigStore) -> Result<String, BootstrapError> {
    let name = config
        .lookup_string(Scope::Global, "Name")
        .ok_or_else(|| ConfigError::Missing {
            key: "Name".to_owned(),
        })?;
    check_name("node name", &name)?;
    Ok(name)
}

fn either_scope(config: &dyn ConfigStore, key: &str) -> Result<bool, ConfigError> {
    let global = config.lookup_bool(Scope::Global, key)?.unwrap_or(false);
    let host = config.lookup_bool(Scope::Host, key)?.unwrap_or(false);
    Ok(global || host)
}

fn parse_setting<T: FromStr>(
    config: &dyn ConfigStore,
    key: &str,
    expected: &str,
) -> Result<Option<T>, ConfigError> {
    config
        .entry(Scope::Global, key)
        .map(|entry| entry.value().parse().map_err(|_| entry.invalid(expected)))
        .transpose()
}

fn seconds(
    config: &dyn ConfigStore,
    scope: Scope,
    key: &str,
    default: i64,
    minimum: i64,
) -> Result<Duration, ConfigError> {
    let value = config.lookup_int(scope, key)?.unwrap_or(default);
    if value < minimum {
        let expected = if minimum > 0 {
            format!("at least {minimum}")
        } else {
            "0 or greater".to_owned()
        };
        return Err(ConfigError::out_of_range(key, value, expected));
    }
    u64::try_from(value)
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::out_of_range(key, value, "0 or greater"))
}

#[cfg(test)]
mod tests {
    use mesh_config::{ConfigTree, NodeConfig};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("1"), 1)]
    #[case(None, 900)]
    fn seconds_uses_default_and_accepts_minimum(
        #[case] configured: Option<&str>,
        #[case] expected: u64,
    ) {
        let mut host = ConfigTree::new();
        if let Some(value) = configured {
            host.insert("MaxTimeout", value);
        }
        let config = NodeConfig::default().with_host(host);
        let timeout = seconds(&config, Scope::Host, "MaxTimeout", DEFAULT_MAX_TIMEOUT, 1)
            .expect("valid timeout");
        assert_eq!(timeout, Duration::from_secs(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("-5")]
    fn nonpositive_max_timeout_names_the_setting(#[case] value: &str) {
        let config = NodeConfig::default().with_host(ConfigTree::new().with("MaxTimeout", value));
        let error = seconds(&config, Scope::Host, "MaxTimeout", DEFAULT_MAX_TIMEOUT, 1)
            .expect_err("rejected");
        assert_eq!(error.key(), Some("MaxTimeout"));
    }

    #[rstest]
    #[case(Some("yes"), None, true)]
    #[case(None, Some("on"), true)]
    #[case(Some("no"), Some("no"), false)]
    #[case(None, None, false)]
    fn flags_are_ored_across_scopes(
        #[case] global: Option<&str>,
        #[case] host: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut global_tree = ConfigTree::new();
        let mut host_tree = ConfigTree::new();
        if let Some(value) = global {
            global_tree.insert("IndirectData", value);
        }
        if let Some(value) = host {
            host_tree.insert("IndirectData", value);
        }
        let config = NodeConfig::new(global_tree).with_host(host_tree);
        assert_eq!(either_scope(&config, "IndirectData").expect("bool"), expected);
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let config = NodeConfig::new(ConfigTree::new().with("Mode", "bridge"));
        let error = parse_setting::<RoutingMode>(&config, "Mode", "expected router")
            .expect_err("unknown mode");
        assert_eq!(error.key(), Some("Mode"));
        assert!(error.to_string().contains("bridge"));
    }
}
