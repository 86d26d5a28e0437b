//
// Helix — path splices for fast-failover groups (§4.B, Open Question (c)).
//
// A splice tells an on-path switch which alternate egress port to bucket
// into its fast-failover group so that, if the primary egress's liveness
// bit drops, the switch reroutes locally instead of waiting on a
// recompute round-trip to the controller.
//
// Two variants are kept, per the SPEC_FULL.md binding decision:
//
// * `splices_strict` only proposes a splice when the alternate route is
//   loop-free and fully reachable to the destination using *only*
//   currently-known, active links — it will not propose a splice the
//   controller cannot itself vouch for.
// * `splices_loose` proposes a splice at the first point primary and
//   backup diverge and trusts that the neighbour switches downstream of
//   it will, in turn, reroute around whatever failed — useful when the
//   controller's view of the backup's far side is stale or incomplete.
//

use std::collections::HashSet;

use helix_topology::Topology;
use helix_utils::{Dpid, PortNo};
use serde::{Deserialize, Serialize};

use crate::path::{is_valid, BackupPath, Path, PathHop};
use crate::shortest::{build_path, shortest_switch_path, TieBreak};
use crate::weight::WeightFn;

/// One switch's alternate egress, to be installed as a fast-failover
/// bucket alongside its primary egress.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Splice {
    pub switch: Dpid,
    pub primary_egress: PortNo,
    pub alternate_egress: PortNo,
}

fn primary_excluded_edges(primary: &Path) -> HashSet<(Dpid, Dpid)> {
    let mut excluded = HashSet::new();
    for window in primary.windows(2) {
        let [a, b] = window else { unreachable!() };
        excluded.insert((a.switch, b.switch));
        excluded.insert((b.switch, a.switch));
    }
    excluded
}

/// Computes one splice per primary hop (excluding the last, which has no
/// further egress), validating that the alternate route is loop-free and
/// reachable using only links the topology currently believes are active.
///
/// Returns fewer splices than `primary.len() - 1` when some hop has no
/// such validated alternate — strict never fabricates a splice it can't
/// vouch for.
pub fn splices_strict(
    topo: &Topology,
    primary: &Path,
    dst_port: PortNo,
    weight_fn: &WeightFn<'_>,
    tie_break: TieBreak,
) -> Vec<Splice> {
    if primary.len() < 2 {
        return Vec::new();
    }
    let excluded = primary_excluded_edges(primary);
    let dst_switch = primary.last().unwrap().switch;

    let mut splices = Vec::new();
    for hop in &primary[..primary.len() - 1] {
        let Some(seq) = shortest_switch_path(
            topo,
            hop.switch,
            dst_switch,
            weight_fn,
            tie_break,
            &excluded,
        ) else {
            continue;
        };
        if seq.len() < 2 {
            continue;
        }
        let Some(alt_path) = build_path(topo, hop.ingress_port, &seq, dst_port)
        else {
            continue;
        };
        if !is_valid(topo, &alt_path) {
            continue;
        }
        splices.push(Splice {
            switch: hop.switch,
            primary_egress: hop.egress_port,
            alternate_egress: alt_path[0].egress_port,
        });
    }
    splices
}

/// Proposes a splice at the point primary and backup diverge, trusting
/// that switches past that point reroute on their own — no reachability
/// validation against the current topology view.
pub fn splices_loose(primary: &Path, backup: &BackupPath) -> Vec<Splice> {
    let Some(backup_path) = backup.path() else {
        return Vec::new();
    };
    if primary.is_empty() || backup_path.is_empty() {
        return Vec::new();
    }

    // The only point we can vouch for without walking the alternate
    // route is the very first hop, where the primary and backup paths
    // both start from the same source switch.
    if primary[0].switch != backup_path[0].switch {
        return Vec::new();
    }

    vec![Splice {
        switch: primary[0].switch,
        primary_egress: primary[0].egress_port,
        alternate_egress: backup_path[0].egress_port,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortest::{disjoint_pair, shortest_path};
    use crate::weight::unit_weight;
    use helix_utils::{HostId, MacAddr};
    use std::net::Ipv4Addr;

    fn dpid(n: u64) -> Dpid {
        Dpid(n)
    }
    fn port(n: u32) -> PortNo {
        PortNo(n)
    }
    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    // Ring s1-s2-s3-s4-s5 plus chord s1-s4, same as shortest.rs's S1
    // fixture: shortest path is s1-s4-s5, and the ring supplies a fully
    // disjoint alternate.
    fn ring_topology() -> Topology {
        let mut topo = Topology::new();
        topo.add_link(dpid(1), port(1), dpid(2), port(1), 1_000_000_000);
        topo.add_link(dpid(2), port(2), dpid(3), port(1), 1_000_000_000);
        topo.add_link(dpid(3), port(2), dpid(4), port(1), 1_000_000_000);
        topo.add_link(dpid(4), port(2), dpid(5), port(1), 1_000_000_000);
        topo.add_link(dpid(1), port(9), dpid(4), port(9), 1_000_000_000);
        topo.host_discovered(host(1), dpid(1), port(100));
        topo.host_discovered(host(2), dpid(5), port(100));
        topo
    }

    #[test]
    fn strict_splice_at_source_switch_reroutes_onto_ring() {
        let topo = ring_topology();
        let w = unit_weight();
        let primary =
            shortest_path(&topo, host(1), host(2), &w, TieBreak::HopsThenLex)
                .unwrap();
        let dst_port = primary.last().unwrap().egress_port;

        let splices =
            splices_strict(&topo, &primary, dst_port, &w, TieBreak::HopsThenLex);
        assert_eq!(splices.len(), 1);
        assert_eq!(splices[0].switch, dpid(1));
        assert_eq!(splices[0].primary_egress, port(9));
        assert_eq!(splices[0].alternate_egress, port(1));
    }

    #[test]
    fn loose_splice_uses_backup_first_hop_without_validation() {
        let topo = ring_topology();
        let w = unit_weight();
        let (primary, backup) =
            disjoint_pair(&topo, host(1), host(2), &w, TieBreak::HopsThenLex)
                .unwrap();

        let splices = splices_loose(&primary, &backup);
        assert_eq!(splices.len(), 1);
        assert_eq!(splices[0].switch, dpid(1));
        assert_eq!(splices[0].alternate_egress, port(1));
    }

    #[test]
    fn loose_splice_empty_when_backup_is_none() {
        let splices = splices_loose(&vec![PathHop {
            switch: dpid(1),
            ingress_port: port(100),
            egress_port: port(9),
        }], &BackupPath::None);
        assert!(splices.is_empty());
    }
}
