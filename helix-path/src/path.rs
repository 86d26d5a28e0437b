//
// Helix — the `Path` type and its invariants (§3 "Path").
//

use std::collections::HashSet;

use helix_topology::Topology;
use helix_utils::{Dpid, PortNo};
use serde::{Deserialize, Serialize};

/// One hop of a path: the switch, the port the candidate's traffic arrives
/// on, and the port it leaves on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PathHop {
    pub switch: Dpid,
    pub ingress_port: PortNo,
    pub egress_port: PortNo,
}

/// An ordered sequence of hops from a source host to a destination host
/// (§3 "Path"). An empty path means src and dst are the same host.
pub type Path = Vec<PathHop>;

/// The result of computing a protection backup for a candidate (§4.B).
#[derive(Clone, Debug)]
pub enum BackupPath {
    /// A node-disjoint backup was found: every intermediate switch differs
    /// from the primary's.
    Full(Path),
    /// Only a link-disjoint backup was found; some intermediate switch is
    /// shared with the primary, so the installer cannot promise coverage
    /// against that switch's failure.
    Partial(Path),
    /// No alternative path exists at all.
    None,
}

impl BackupPath {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BackupPath::Full(p) | BackupPath::Partial(p) => Some(p),
            BackupPath::None => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, BackupPath::Partial(_))
    }
}

/// Validates the invariants from §3 "Path": connected sequence of active
/// edges, no repeated switches.
pub fn is_valid(topo: &Topology, path: &Path) -> bool {
    let mut seen = HashSet::new();
    for hop in path {
        if !seen.insert(hop.switch) {
            return false;
        }
    }
    for window in path.windows(2) {
        let [a, b] = window else { unreachable!() };
        match topo.edge(a.switch, a.egress_port) {
            Some(edge) if edge.active && edge.to == b.switch => {}
            _ => return false,
        }
    }
    true
}

/// The sequence of on-path switch DPIDs, in order.
pub fn switches(path: &Path) -> Vec<Dpid> {
    path.iter().map(|h| h.switch).collect()
}
