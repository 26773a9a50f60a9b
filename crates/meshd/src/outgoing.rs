//! Seam to the component that dials `ConnectTo` peers.

use crate::registry::ConnectionRegistry;

/// Starts connection attempts to statically configured peers.
#[cfg_attr(test, mockall::automock)]
pub trait OutgoingConnector {
    /// Begins an attempt towards each of `peers`, recording pending
    /// connections in `connections`. Failed attempts are retried elsewhere.
    fn try_outgoing(&self, peers: &[String], connections: &mut ConnectionRegistry);
}
