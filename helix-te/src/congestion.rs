//
// Helix — congestion detection (§4.E).
//

use helix_topology::{Edge, Topology};
use helix_utils::{Dpid, PortNo};

/// Default congestion threshold τ: a link is congested once its usage
/// crosses 90% of capacity.
pub const DEFAULT_THRESHOLD: f64 = 0.90;

/// Returns every active edge whose utilisation exceeds `threshold`.
pub fn detect_congested_edges(topo: &Topology, threshold: f64) -> Vec<Edge> {
    let mut congested = Vec::new();
    for switch in topo.switches() {
        for edge in topo.edges_from(switch.dpid) {
            if edge.active && edge.utilisation() > threshold {
                congested.push(edge);
            }
        }
    }
    congested
}

pub fn edge_key(edge: &Edge) -> (Dpid, PortNo) {
    (edge.from, edge.from_port)
}
