//! Seam to the graph engine that computes reachability.

use crate::registry::{EdgeRegistry, NodeRegistry};

/// Recomputes reachability after nodes or subnets change.
#[cfg_attr(test, mockall::automock)]
pub trait TopologyEngine {
    /// Recomputes routes over `nodes` and `edges`.
    fn recompute(&self, nodes: &NodeRegistry, edges: &EdgeRegistry);
}
