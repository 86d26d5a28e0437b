//
// Helix — candidate selection and ordering for a TE pass (§4.E).
//

use helix_path::Path;
use helix_topology::Edge;
use helix_utils::{Gid, HostId};

use crate::congestion::edge_key;
use crate::usage::EdgeKey;

/// Everything the TE engine needs to know about one candidate to decide
/// whether, and how, to re-path it.
#[derive(Clone, Debug)]
pub struct CandidateInfo {
    pub gid: Gid,
    pub src: HostId,
    pub dst: HostId,
    pub primary: Path,
    pub send_rate_bps: u64,
}

impl CandidateInfo {
    fn traverses(&self, edge: EdgeKey) -> bool {
        self.primary
            .iter()
            .any(|hop| (hop.switch, hop.egress_port) == edge)
    }
}

/// Candidates whose current path traverses at least one of `congested`.
pub fn affected_candidates<'a>(
    candidates: &'a [CandidateInfo],
    congested: &[Edge],
) -> Vec<&'a CandidateInfo> {
    let congested_keys: Vec<EdgeKey> = congested.iter().map(edge_key).collect();
    candidates
        .iter()
        .filter(|c| congested_keys.iter().any(|&e| c.traverses(e)))
        .collect()
}

/// Orders affected candidates by current send-rate. `rev = true` (the
/// default) processes heaviest hitters first, on the theory that moving
/// the biggest contributor off a congested link clears it fastest;
/// `rev = false` processes light candidates first, which disturbs fewer
/// flows per accepted change.
pub fn sort_candidates<'a>(mut candidates: Vec<&'a CandidateInfo>, rev: bool) -> Vec<&'a CandidateInfo> {
    candidates.sort_by_key(|c| c.send_rate_bps);
    if rev {
        candidates.reverse();
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_path::PathHop;
    use helix_utils::{Dpid, MacAddr, PortNo};
    use std::net::Ipv4Addr;

    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    fn candidate(gid: u64, rate: u64, switch: u64, egress: u32) -> CandidateInfo {
        CandidateInfo {
            gid: Gid(gid),
            src: host(1),
            dst: host(2),
            primary: vec![PathHop {
                switch: Dpid(switch),
                ingress_port: PortNo(0),
                egress_port: PortNo(egress),
            }],
            send_rate_bps: rate,
        }
    }

    fn edge(switch: u64, port: u32) -> Edge {
        Edge {
            from: Dpid(switch),
            from_port: PortNo(port),
            to: Dpid(99),
            to_port: PortNo(1),
            capacity_bps: 100,
            usage_bps: 95.0,
            active: true,
        }
    }

    #[test]
    fn affected_candidates_only_includes_those_on_congested_edges() {
        let c1 = candidate(1, 70, 1, 1);
        let c2 = candidate(2, 80, 2, 1);
        let candidates = vec![c1, c2];
        let congested = vec![edge(1, 1)];
        let affected = affected_candidates(&candidates, &congested);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].gid, Gid(1));
    }

    #[test]
    fn heavy_hitters_first_when_rev_true() {
        let c1 = candidate(1, 70, 1, 1);
        let c2 = candidate(2, 90, 1, 1);
        let c3 = candidate(3, 80, 1, 1);
        let refs = vec![&c1, &c2, &c3];
        let sorted = sort_candidates(refs, true);
        let rates: Vec<u64> = sorted.iter().map(|c| c.send_rate_bps).collect();
        assert_eq!(rates, vec![90, 80, 70]);
    }

    #[test]
    fn light_first_when_rev_false() {
        let c1 = candidate(1, 70, 1, 1);
        let c2 = candidate(2, 90, 1, 1);
        let refs = vec![&c1, &c2];
        let sorted = sort_candidates(refs, false);
        let rates: Vec<u64> = sorted.iter().map(|c| c.send_rate_bps).collect();
        assert_eq!(rates, vec![70, 90]);
    }
}
