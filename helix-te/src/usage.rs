//
// Helix — the link-usage table (§3 "Link-usage table").
//
// Tracks, for every directed edge, which candidates contribute how much
// of its usage. Maintained incrementally so that applying one
// candidate's path change during a TE pass is visible to the next
// candidate's projected-usage check without recomputing from scratch.
//

use std::collections::HashMap;

use helix_path::Path;
use helix_utils::{Dpid, Gid, PortNo};

/// Identifies a directed edge by its egress (switch, port) — the same
/// key `helix_topology::Topology::edge` uses.
pub type EdgeKey = (Dpid, PortNo);

#[derive(Debug, Default)]
struct EdgeUsage {
    contributions: HashMap<Gid, u64>,
    total: u64,
}

/// Per-edge gid -> contributed-bps breakdown, plus the running total
/// (invariant: `total == sum(contributions.values())`).
#[derive(Debug, Default)]
pub struct LinkUsageTable {
    edges: HashMap<EdgeKey, EdgeUsage>,
}

impl LinkUsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_usage(&self, edge: EdgeKey) -> u64 {
        self.edges.get(&edge).map(|e| e.total).unwrap_or(0)
    }

    pub fn contribution(&self, edge: EdgeKey, gid: Gid) -> u64 {
        self.edges
            .get(&edge)
            .and_then(|e| e.contributions.get(&gid))
            .copied()
            .unwrap_or(0)
    }

    /// Projects what an edge's usage would be if `gid`'s contribution
    /// were replaced with `new_bps` (zero to remove it entirely).
    pub fn projected_usage(&self, edge: EdgeKey, gid: Gid, new_bps: u64) -> u64 {
        let current_total = self.total_usage(edge);
        let current_contribution = self.contribution(edge, gid);
        current_total - current_contribution + new_bps
    }

    /// Removes every edge contribution `gid` made along `path` and
    /// re-adds `rate_bps` along `path`'s edges. Called once per
    /// candidate, immediately after its new path is selected, so later
    /// candidates in the same pass see the updated totals.
    pub fn apply_path_change(&mut self, gid: Gid, old_path: &Path, new_path: &Path, rate_bps: u64) {
        for hop in old_path {
            self.remove_contribution((hop.switch, hop.egress_port), gid);
        }
        for hop in new_path {
            self.set_contribution((hop.switch, hop.egress_port), gid, rate_bps);
        }
    }

    fn remove_contribution(&mut self, edge: EdgeKey, gid: Gid) {
        if let Some(entry) = self.edges.get_mut(&edge) {
            if let Some(prev) = entry.contributions.remove(&gid) {
                entry.total -= prev;
            }
        }
    }

    fn set_contribution(&mut self, edge: EdgeKey, gid: Gid, bps: u64) {
        let entry = self.edges.entry(edge).or_default();
        let prev = entry.contributions.insert(gid, bps).unwrap_or(0);
        entry.total = entry.total - prev + bps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_path::PathHop;

    fn hop(switch: u64, egress: u32) -> PathHop {
        PathHop {
            switch: Dpid(switch),
            ingress_port: PortNo(0),
            egress_port: PortNo(egress),
        }
    }

    #[test]
    fn apply_then_reapply_keeps_total_consistent() {
        let mut table = LinkUsageTable::new();
        let path_a = vec![hop(1, 10)];
        table.apply_path_change(Gid(1), &[], &path_a, 100);
        assert_eq!(table.total_usage((Dpid(1), PortNo(10))), 100);

        let path_b = vec![hop(1, 20)];
        table.apply_path_change(Gid(1), &path_a, &path_b, 100);
        assert_eq!(table.total_usage((Dpid(1), PortNo(10))), 0);
        assert_eq!(table.total_usage((Dpid(1), PortNo(20))), 100);
    }

    #[test]
    fn projected_usage_subtracts_own_contribution() {
        let mut table = LinkUsageTable::new();
        let path = vec![hop(1, 10)];
        table.apply_path_change(Gid(1), &[], &path, 100);
        table.apply_path_change(Gid(2), &[], &path, 50);
        assert_eq!(table.total_usage((Dpid(1), PortNo(10))), 150);

        // Gid 1 moving off this edge to 0 bps should leave only gid 2's 50.
        assert_eq!(
            table.projected_usage((Dpid(1), PortNo(10)), Gid(1), 0),
            50
        );
    }
}
