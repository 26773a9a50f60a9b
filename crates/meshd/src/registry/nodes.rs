//! Node and edge tables consulted by the topology engine.

use std::collections::BTreeMap;

/// Routing state of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// Node name.
    pub name: String,
    /// Next hop towards the node.
    pub next_hop: String,
    /// Node through which traffic is relayed.
    pub via: String,
    /// Whether the node is currently in use.
    pub active: bool,
    /// Whether the node can be reached.
    pub reachable: bool,
}

/// Every known node, keyed by name.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<String, NodeEntry>,
}

impl NodeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `entry.name`.
    pub fn register(&mut self, entry: NodeEntry) {
        self.nodes.insert(entry.name.clone(), entry);
    }

    /// Entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NodeEntry> {
        self.nodes.get(name)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes currently marked reachable.
    pub fn reachable(&self) -> impl Iterator<Item = &NodeEntry> {
        self.nodes.values().filter(|entry| entry.reachable)
    }
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Origin node.
    pub from: String,
    /// Destination node.
    pub to: String,
    /// Link cost.
    pub weight: u32,
}

/// Every known edge.
#[derive(Debug, Default)]
pub struct EdgeRegistry {
    edges: Vec<Edge>,
}

impl EdgeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `edge`.
    pub fn add(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
