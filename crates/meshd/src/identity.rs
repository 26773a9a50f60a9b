//! The local node's record.

use std::time::{Duration, SystemTime};

use mesh_config::{AddressFamily, RoutingMode, SubnetSpec};

use crate::credentials::Keypair;
use crate::registry::NodeEntry;
use crate::suite::{CipherSuite, EphemeralKey, SuiteError};

/// Connection option flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeOptions {
    indirect_data: bool,
    tcp_only: bool,
}

impl NodeOptions {
    /// Builds the flags; `tcp_only` forces `indirect_data`.
    #[must_use]
    pub const fn new(indirect_data: bool, tcp_only: bool) -> Self {
        Self {
            indirect_data: indirect_data || tcp_only,
            tcp_only,
        }
    }

    /// Peers must relay data through the control channel's endpoints.
    #[must_use]
    pub const fn indirect_data(self) -> bool {
        self.indirect_data
    }

    /// Data travels over TCP only.
    #[must_use]
    pub const fn tcp_only(self) -> bool {
        self.tcp_only
    }
}

/// Timers configured for the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTimeouts {
    /// How long learned MAC addresses stay valid.
    pub mac_expire: Duration,
    /// Upper bound of the reconnection back-off.
    pub max_timeout: Duration,
    /// Lifetime of each data-channel key.
    pub key_lifetime: Duration,
}

/// Everything [`LocalIdentity::new`] needs besides the key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    /// Node name.
    pub name: String,
    /// Listening port.
    pub port: String,
    /// Address to bind listeners to; `None` binds every local address.
    pub bind_address: Option<String>,
    /// Routing mode.
    pub mode: RoutingMode,
    /// Address family preference.
    pub family: AddressFamily,
    /// Option flags.
    pub options: NodeOptions,
    /// Subnets this node owns.
    pub subnets: Vec<SubnetSpec>,
    /// Data-channel suite.
    pub suite: CipherSuite,
    /// Timers.
    pub timeouts: NodeTimeouts,
    /// Whether `PriorityInheritance` is enabled.
    pub priority_inheritance: bool,
    /// Whether peer hostnames are resolved for logging.
    pub hostnames: bool,
}

/// The daemon's own node.
///
/// The node is its own next hop and via node and is always active and
/// reachable. The keypair and data-channel key are scrubbed on drop.
#[derive(Debug)]
pub struct LocalIdentity {
    settings: IdentitySettings,
    control_suite: CipherSuite,
    keypair: Keypair,
    key: EphemeralKey,
    active: bool,
    reachable: bool,
}

impl LocalIdentity {
    /// Assembles the identity.
    #[must_use]
    pub fn new(settings: IdentitySettings, keypair: Keypair, key: EphemeralKey) -> Self {
        Self {
            settings,
            control_suite: CipherSuite::control_channel(),
            keypair,
            key,
            active: true,
            reachable: true,
        }
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Listening port.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.settings.port
    }

    /// Routing mode.
    #[must_use]
    pub fn mode(&self) -> RoutingMode {
        self.settings.mode
    }

    /// Address family preference.
    #[must_use]
    pub fn family(&self) -> AddressFamily {
        self.settings.family
    }

    /// Option flags.
    #[must_use]
    pub fn options(&self) -> NodeOptions {
        self.settings.options
    }

    /// Owned subnets.
    #[must_use]
    pub fn subnets(&self) -> &[SubnetSpec] {
        &self.settings.subnets
    }

    /// Data-channel suite.
    #[must_use]
    pub fn suite(&self) -> &CipherSuite {
        &self.settings.suite
    }

    /// Suite for the outbound leg of the node's own control connection.
    #[must_use]
    pub fn control_suite(&self) -> &CipherSuite {
        &self.control_suite
    }

    /// Timers.
    #[must_use]
    pub fn timeouts(&self) -> NodeTimeouts {
        self.settings.timeouts
    }

    /// Every setting resolved from configuration.
    #[must_use]
    pub fn settings(&self) -> &IdentitySettings {
        &self.settings
    }

    /// Asymmetric keys.
    #[must_use]
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Current data-channel key.
    #[must_use]
    pub fn key(&self) -> &EphemeralKey {
        &self.key
    }

    /// Next hop towards this node: itself.
    #[must_use]
    pub fn next_hop(&self) -> &str {
        self.name()
    }

    /// Via node for this node: itself.
    #[must_use]
    pub fn via(&self) -> &str {
        self.name()
    }

    /// Whether the node is in use.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the node is reachable.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Entry for the node registry.
    #[must_use]
    pub fn node_entry(&self) -> NodeEntry {
        NodeEntry {
            name: self.name().to_owned(),
            next_hop: self.next_hop().to_owned(),
            via: self.via().to_owned(),
            active: self.active,
            reachable: self.reachable,
        }
    }

    /// Replaces the data-channel key when `now` has reached its expiry.
    /// Returns whether a new key was generated.
    pub fn rotate_key_if_expired(&mut self, now: SystemTime) -> Result<bool, SuiteError> {
        if !self.key.is_expired(now) {
            return Ok(false);
        }
        self.key = EphemeralKey::generate(
            self.settings.suite.cipher(),
            now,
            self.settings.timeouts.key_lifetime,
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::credentials::{PrivateKey, PublicKey};
    use crate::suite::{Cipher, Digest};
    use crate::tests::support::keys::test_private_key;

    const LIFETIME: Duration = Duration::from_secs(3600);

    #[fixture]
    fn identity() -> LocalIdentity {
        let key = test_private_key();
        let keypair = Keypair::new(
            "nodeA",
            PrivateKey::Full(key.clone()),
            PublicKey::new(key.to_public_key()),
        )
        .expect("matching keypair");
        let suite = CipherSuite::new(Some(Cipher::Aes256Cbc), Some(Digest::Sha256), 4, 0)
            .expect("valid suite");
        let settings = IdentitySettings {
            name: "nodeA".to_owned(),
            port: "655".to_owned(),
            bind_address: None,
            mode: RoutingMode::Router,
            family: AddressFamily::Any,
            options: NodeOptions::default(),
            subnets: Vec::new(),
            suite,
            timeouts: NodeTimeouts {
                mac_expire: Duration::from_secs(600),
                max_timeout: Duration::from_secs(900),
                key_lifetime: LIFETIME,
            },
            priority_inheritance: false,
            hostnames: false,
        };
        let ephemeral = EphemeralKey::generate(suite.cipher(), SystemTime::UNIX_EPOCH, LIFETIME)
            .expect("ephemeral key");
        LocalIdentity::new(settings, keypair, ephemeral)
    }

    #[rstest]
    fn key_is_kept_until_expiry(mut identity: LocalIdentity) {
        let before = identity.key().as_bytes().to_vec();
        let expiry = identity.key().expires_at();
        let early = expiry - Duration::from_secs(1);

        assert!(!identity.rotate_key_if_expired(early).expect("rotation check"));
        assert_eq!(identity.key().as_bytes(), before.as_slice());
        assert_eq!(identity.key().expires_at(), expiry);
    }

    #[rstest]
    fn key_rotates_at_expiry(mut identity: LocalIdentity) {
        let before = identity.key().as_bytes().to_vec();
        let now = identity.key().expires_at();

        assert!(identity.rotate_key_if_expired(now).expect("rotation"));
        assert_eq!(identity.key().len(), before.len());
        assert_ne!(identity.key().as_bytes(), before.as_slice());
        assert_eq!(identity.key().expires_at(), now + LIFETIME);
        assert!(!identity.rotate_key_if_expired(now).expect("fresh key"));
    }

    #[rstest]
    #[case(false, false, false)]
    #[case(true, false, true)]
    #[case(false, true, true)]
    #[case(true, true, true)]
    fn tcp_only_implies_indirect_data(
        #[case] indirect: bool,
        #[case] tcp_only: bool,
        #[case] expected: bool,
    ) {
        let options = NodeOptions::new(indirect, tcp_only);
        assert_eq!(options.indirect_data(), expected);
        assert_eq!(options.tcp_only(), tcp_only);
    }
}
