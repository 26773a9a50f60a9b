//! Fallback values for settings an operator leaves unset.

use camino::Utf8PathBuf;

/// Port used for both the TCP and UDP listeners.
pub const DEFAULT_PORT: &str = "655";

/// Seconds a learned MAC address stays valid in switch mode.
pub const DEFAULT_MAC_EXPIRE: i64 = 600;

/// Upper bound in seconds for the reconnection back-off.
pub const DEFAULT_MAX_TIMEOUT: i64 = 900;

/// Seconds of silence before a peer is pinged.
pub const DEFAULT_PING_TIMEOUT: i64 = 60;

/// Ping timeout substituted when the configured value is below one second.
pub const FALLBACK_PING_TIMEOUT: i64 = 86_400;

/// Lifetime in seconds of the data-channel key.
pub const DEFAULT_KEY_EXPIRE: i64 = 3600;

/// Bytes of the digest appended to each data packet.
pub const DEFAULT_MAC_LENGTH: i64 = 4;

/// Data-channel compression level.
pub const DEFAULT_COMPRESSION: i64 = 0;

/// Highest supported compression level.
pub const MAX_COMPRESSION: i64 = 11;

/// Directory holding the configuration of every network.
pub const DEFAULT_CONFDIR: &str = "/etc/meshd";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration base for `netname`, or the root configuration directory.
#[must_use]
pub fn default_confbase(netname: Option<&str>) -> Utf8PathBuf {
    let root = Utf8PathBuf::from(DEFAULT_CONFDIR);
    match netname {
        Some(name) => root.join(name),
        None => root,
    }
}
