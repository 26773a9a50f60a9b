//! In-memory tables the daemon keeps for the lifetime of a network.
//!
//! Tables are created in [`RegistryKind`] order and released in reverse.

mod connections;
mod events;
mod nodes;
mod subnets;

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::debug;

pub use self::connections::{Connection, ConnectionRegistry, OutgoingRecord, Terminated};
pub use self::events::{EventKind, EventQueue, RequestTracker, ScheduledEvent};
pub use self::nodes::{Edge, EdgeRegistry, NodeEntry, NodeRegistry};
pub use self::subnets::{OwnedSubnet, SubnetRegistry};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// The registries, in initialisation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum RegistryKind {
    /// Control-channel connections.
    Connections,
    /// Subnet ownership.
    Subnets,
    /// Nodes.
    Nodes,
    /// Edges between nodes.
    Edges,
    /// Timed events.
    Events,
    /// Duplicate-request cache.
    Requests,
}

/// Every registry; a `None` slot has not been created or was released.
#[derive(Debug, Default)]
pub struct Registries {
    /// Control-channel connections.
    pub connections: Option<ConnectionRegistry>,
    /// Subnet ownership.
    pub subnets: Option<SubnetRegistry>,
    /// Nodes.
    pub nodes: Option<NodeRegistry>,
    /// Edges.
    pub edges: Option<EdgeRegistry>,
    /// Timed events.
    pub events: Option<EventQueue>,
    /// Duplicate-request cache.
    pub requests: Option<RequestTracker>,
}

impl Registries {
    /// Creates every registry in order and returns the order used.
    pub fn init(&mut self) -> Vec<RegistryKind> {
        RegistryKind::iter()
            .inspect(|kind| {
                self.create(*kind);
                debug!(target: REGISTRY_TARGET, registry = %kind, "registry initialised");
            })
            .collect()
    }

    /// Releases every present registry in reverse order and returns the
    /// ones released. Absent registries are skipped.
    pub fn teardown(&mut self) -> Vec<RegistryKind> {
        RegistryKind::iter()
            .rev()
            .filter(|kind| {
                let released = self.release(*kind);
                if released {
                    debug!(target: REGISTRY_TARGET, registry = %kind, "registry released");
                }
                released
            })
            .collect()
    }

    /// Whether `kind` is currently present.
    #[must_use]
    pub fn is_present(&self, kind: RegistryKind) -> bool {
        match kind {
            RegistryKind::Connections => self.connections.is_some(),
            RegistryKind::Subnets => self.subnets.is_some(),
            RegistryKind::Nodes => self.nodes.is_some(),
            RegistryKind::Edges => self.edges.is_some(),
            RegistryKind::Events => self.events.is_some(),
            RegistryKind::Requests => self.requests.is_some(),
        }
    }

    fn create(&mut self, kind: RegistryKind) {
        match kind {
            RegistryKind::Connections => self.connections = Some(ConnectionRegistry::new()),
            RegistryKind::Subnets => self.subnets = Some(SubnetRegistry::new()),
            RegistryKind::Nodes => self.nodes = Some(NodeRegistry::new()),
            RegistryKind::Edges => self.edges = Some(EdgeRegistry::new()),
            RegistryKind::Events => self.events = Some(EventQueue::new()),
            RegistryKind::Requests => self.requests = Some(RequestTracker::new()),
        }
    }

    fn release(&mut self, kind: RegistryKind) -> bool {
        match kind {
            RegistryKind::Connections => self.connections.take().is_some(),
            RegistryKind::Subnets => self.subnets.take().is_some(),
            RegistryKind::Nodes => self.nodes.take().is_some(),
            RegistryKind::Edges => self.edges.take().is_some(),
            RegistryKind::Events => self.events.take().is_some(),
            RegistryKind::Requests => self.requests.take().is_some(),
        }
    }
}
