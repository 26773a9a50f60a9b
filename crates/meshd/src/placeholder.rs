//! Stand-ins for the graph engine and the connection layer, used until
//! those subsystems are attached.

use crate::outgoing::OutgoingConnector;
use crate::registry::{Connection, ConnectionRegistry, EdgeRegistry, NodeRegistry, OutgoingRecord};
use crate::topology::TopologyEngine;

const PLACEHOLDER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::placeholder");

/// Topology engine that only logs recompute requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTopology;

impl TopologyEngine for NoopTopology {
    fn recompute(&self, nodes: &NodeRegistry, edges: &EdgeRegistry) {
        tracing::debug!(
            target: PLACEHOLDER_TARGET,
            nodes = nodes.len(),
            edges = edges.len(),
            "topology recompute requested but no graph engine is attached"
        );
    }
}

/// Connector that records one pending outgoing connection per peer without
/// dialling.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingOutgoing;

impl OutgoingConnector for PendingOutgoing {
    fn try_outgoing(&self, peers: &[String], connections: &mut ConnectionRegistry) {
        for peer in peers {
            tracing::warn!(
                target: PLACEHOLDER_TARGET,
                peer = %peer,
                "outgoing connection recorded but no handshake layer is attached"
            );
            connections.insert(Connection::outgoing(OutgoingRecord::new(peer.as_str())));
        }
    }
}
