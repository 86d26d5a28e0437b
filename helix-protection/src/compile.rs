//
// Helix — group/flow compilation from a candidate's primary path and
// splices into switch-level protection state (§4.C).
//

use helix_path::{BackupPath, Path, Splice};
use helix_utils::{Dpid, Gid, HostId, PortNo};
use serde::{Deserialize, Serialize};

/// One OpenFlow fast-failover bucket: output on `port`, live-gated on
/// `watch_port`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GroupBucket {
    pub port: PortNo,
    pub watch_port: PortNo,
}

/// A fast-failover group to install on one switch for one candidate.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GroupSpec {
    pub switch: Dpid,
    pub gid: Gid,
    pub buckets: Vec<GroupBucket>,
}

/// A flow matching a candidate's traffic and forwarding it into its
/// group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct FlowSpec {
    pub switch: Dpid,
    pub gid: Gid,
    pub src: HostId,
    pub dst: HostId,
    pub ingress_port: PortNo,
}

/// Compiles a candidate's primary path, backup and splices into the
/// per-switch group and flow specs the installer should converge the
/// network towards.
///
/// Every on-path switch (save the last, which has no further egress)
/// gets a group whose first bucket is the primary egress; a splice for
/// that switch (strict or loose, whichever the caller computed) appends
/// a second bucket so the switch itself fails over without waiting on
/// the controller. Switches with no splice still get a single-bucket
/// group — protection there falls back to the controller's own
/// recompute.
pub fn compile_groups_and_flows(
    gid: Gid,
    src: HostId,
    dst: HostId,
    primary: &Path,
    backup: &BackupPath,
    splices: &[Splice],
) -> (Vec<GroupSpec>, Vec<FlowSpec>) {
    let _ = backup; // kept for callers that want to log/inspect it alongside compilation
    let mut groups = Vec::new();
    let mut flows = Vec::new();

    if primary.is_empty() {
        return (groups, flows);
    }

    for hop in &primary[..primary.len().saturating_sub(1)] {
        let mut buckets = vec![GroupBucket {
            port: hop.egress_port,
            watch_port: hop.egress_port,
        }];
        if let Some(splice) = splices.iter().find(|s| s.switch == hop.switch) {
            buckets.push(GroupBucket {
                port: splice.alternate_egress,
                watch_port: splice.alternate_egress,
            });
        }
        groups.push(GroupSpec {
            switch: hop.switch,
            gid,
            buckets,
        });
        flows.push(FlowSpec {
            switch: hop.switch,
            gid,
            src,
            dst,
            ingress_port: hop.ingress_port,
        });
    }

    // The last hop has no further egress to protect, but it still needs
    // a flow delivering the candidate's traffic to the attached host.
    if let Some(last) = primary.last() {
        flows.push(FlowSpec {
            switch: last.switch,
            gid,
            src,
            dst,
            ingress_port: last.ingress_port,
        });
    }

    (groups, flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_path::PathHop;
    use helix_utils::MacAddr;
    use std::net::Ipv4Addr;

    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    #[test]
    fn single_hop_path_has_no_groups_but_has_a_flow() {
        let primary = vec![PathHop {
            switch: Dpid(1),
            ingress_port: PortNo(100),
            egress_port: PortNo(200),
        }];
        let (groups, flows) = compile_groups_and_flows(
            Gid(1),
            host(1),
            host(2),
            &primary,
            &BackupPath::None,
            &[],
        );
        assert!(groups.is_empty());
        assert_eq!(flows.len(), 1);
    }

    #[test]
    fn splice_adds_second_bucket_watching_its_own_port() {
        let primary = vec![
            PathHop {
                switch: Dpid(1),
                ingress_port: PortNo(100),
                egress_port: PortNo(1),
            },
            PathHop {
                switch: Dpid(2),
                ingress_port: PortNo(1),
                egress_port: PortNo(200),
            },
        ];
        let splices = vec![Splice {
            switch: Dpid(1),
            primary_egress: PortNo(1),
            alternate_egress: PortNo(9),
        }];
        let (groups, flows) = compile_groups_and_flows(
            Gid(1),
            host(1),
            host(2),
            &primary,
            &BackupPath::None,
            &splices,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].buckets.len(), 2);
        // Every bucket self-watches its own egress port, not the primary's —
        // otherwise the switch's own liveness logic can never select the
        // splice bucket once the primary port is already down.
        assert_eq!(groups[0].buckets[0].watch_port, PortNo(1));
        assert_eq!(groups[0].buckets[1].port, PortNo(9));
        assert_eq!(groups[0].buckets[1].watch_port, PortNo(9));
        assert_eq!(flows.len(), 2);
    }
}
