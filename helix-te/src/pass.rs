//
// Helix — one TE optimisation pass (§4.E "Application" / "Output").
//

use std::collections::{HashMap, HashSet};

use helix_path::{cspf_weight, shortest_path, Path, TieBreak};
use helix_topology::Topology;
use helix_utils::{Dpid, Gid, PortNo};
use tracing::{info, warn};

use crate::candidates::{affected_candidates, sort_candidates, CandidateInfo};
use crate::congestion::{detect_congested_edges, edge_key};
use crate::select::{select_path, Decision, OptiMethod};
use crate::usage::LinkUsageTable;

/// Resolved TE configuration for one controller (§6 `[te]` block).
#[derive(Clone, Copy, Debug)]
pub struct TeConfig {
    pub threshold: f64,
    pub method: OptiMethod,
    pub candidate_sort_rev: bool,
    pub pot_path_sort_rev: bool,
    pub partial_accept: bool,
}

/// A path change the pass decided to make, to be handed to the
/// protection installer (§4.C).
#[derive(Clone, Debug)]
pub struct PathChange {
    pub gid: Gid,
    pub new_primary: Path,
    pub is_partial: bool,
}

/// The outcome of one full pass over every congested-affected candidate.
#[derive(Clone, Debug, Default)]
pub struct PassResult {
    pub changes: Vec<PathChange>,
    pub residual_congestion: bool,
}

fn network_max_usage(table: &LinkUsageTable, congested_keys: &HashSet<(Dpid, PortNo)>) -> u64 {
    congested_keys
        .iter()
        .map(|&key| table.total_usage(key))
        .max()
        .unwrap_or(0)
}

fn traverses_any(path: &Path, keys: &HashSet<(Dpid, PortNo)>) -> bool {
    path.iter().any(|hop| keys.contains(&(hop.switch, hop.egress_port)))
}

/// Builds the potential-path set for one candidate per §4.E: the
/// candidate's existing backup (group-table swap methods) or a fresh
/// CSPF recompute (CSPFRecomp), discarding anything that still traverses
/// a congested edge.
fn potential_paths(
    method: OptiMethod,
    topo: &Topology,
    candidate: &CandidateInfo,
    backups: &HashMap<Gid, Path>,
    congested_keys: &HashSet<(Dpid, PortNo)>,
) -> Vec<Path> {
    let mut paths = match method {
        OptiMethod::CSPFRecomp => {
            let weight = cspf_weight();
            match shortest_path(
                topo,
                candidate.src,
                candidate.dst,
                &weight,
                TieBreak::UsageThenLenThenLex,
            ) {
                Some(path) => vec![path],
                None => Vec::new(),
            }
        }
        OptiMethod::FirstSol | OptiMethod::BestSolUsage | OptiMethod::BestSolPLen => {
            match backups.get(&candidate.gid) {
                Some(path) => vec![path.clone()],
                None => Vec::new(),
            }
        }
    };
    paths.retain(|p| !traverses_any(p, congested_keys));
    paths
}

/// Runs one optimisation pass. `backups` supplies each candidate's
/// currently-installed backup path, used as the potential-path set for
/// the group-table-swap methods. Candidates absent from `backups` are
/// only reachable via `CSPFRecomp`.
pub fn run_pass(
    topo: &Topology,
    candidates: &[CandidateInfo],
    backups: &HashMap<Gid, Path>,
    config: &TeConfig,
) -> PassResult {
    let congested = detect_congested_edges(topo, config.threshold);
    if congested.is_empty() {
        return PassResult::default();
    }
    let congested_keys: HashSet<(Dpid, PortNo)> =
        congested.iter().map(edge_key).collect();

    let affected = affected_candidates(candidates, &congested);
    if affected.is_empty() {
        // Congestion exists but no tracked candidate traverses it (e.g.
        // background traffic); nothing the engine can do about it.
        return PassResult {
            changes: Vec::new(),
            residual_congestion: true,
        };
    }
    let ordered = sort_candidates(affected, config.candidate_sort_rev);

    let mut table = LinkUsageTable::new();
    for c in candidates {
        table.apply_path_change(c.gid, &[], &c.primary, c.send_rate_bps);
    }

    let capacities = |sw: Dpid, port: PortNo| topo.edge(sw, port).map(|e| e.capacity_bps);

    let mut changes = Vec::new();
    let mut residual = false;

    for candidate in ordered {
        let pre_change_max = network_max_usage(&table, &congested_keys);
        let potentials = potential_paths(
            config.method,
            topo,
            candidate,
            backups,
            &congested_keys,
        );

        let decision = select_path(
            config.method,
            &table,
            candidate.gid,
            candidate.send_rate_bps,
            &potentials,
            config.threshold,
            config.partial_accept,
            config.pot_path_sort_rev,
            pre_change_max,
            &capacities,
        );

        match decision {
            Decision::Selected { path, is_partial } => {
                info!(
                    gid = %candidate.gid,
                    is_partial,
                    "TE pass re-pathing candidate"
                );
                table.apply_path_change(
                    candidate.gid,
                    &candidate.primary,
                    &path,
                    candidate.send_rate_bps,
                );
                changes.push(PathChange {
                    gid: candidate.gid,
                    new_primary: path,
                    is_partial,
                });
            }
            Decision::NoCandidate => {}
            Decision::InfeasibleNeedsPartial | Decision::Residual => {
                warn!(gid = %candidate.gid, "TE pass could not improve candidate");
                residual = true;
            }
        }
    }

    // Residual congestion also holds if any originally-congested edge is
    // still above threshold after all changes were applied.
    if !residual {
        residual = congested_keys
            .iter()
            .any(|&key| {
                let usage = table.total_usage(key);
                let cap = capacities(key.0, key.1).unwrap_or(u64::MAX);
                cap > 0 && (usage as f64 / cap as f64) > config.threshold
            });
    }

    PassResult {
        changes,
        residual_congestion: residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_path::PathHop;
    use helix_utils::{HostId, MacAddr};
    use std::net::Ipv4Addr;

    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    // Two parallel routes from h1 to h2: s1-s2 (the congested ring leg)
    // and s1-s3-s2 (the clear alternate), matching the shape of S2's
    // "upper ring" swap.
    fn two_route_topology() -> Topology {
        let mut topo = Topology::new();
        topo.add_link(Dpid(1), PortNo(1), Dpid(2), PortNo(1), 200_000_000);
        topo.add_link(Dpid(1), PortNo(2), Dpid(3), PortNo(1), 1_000_000_000);
        topo.add_link(Dpid(3), PortNo(2), Dpid(2), PortNo(2), 1_000_000_000);
        topo.host_discovered(host(1), Dpid(1), PortNo(100));
        topo.host_discovered(host(2), Dpid(2), PortNo(100));
        topo.set_port_usage(Dpid(1), PortNo(1), 190_000_000.0).unwrap();
        topo
    }

    #[test]
    fn first_sol_swaps_candidate_onto_its_installed_backup() {
        let topo = two_route_topology();
        let candidate = CandidateInfo {
            gid: Gid(1),
            src: host(1),
            dst: host(2),
            primary: vec![PathHop {
                switch: Dpid(1),
                ingress_port: PortNo(100),
                egress_port: PortNo(1),
            }],
            send_rate_bps: 190_000_000,
        };
        let mut backups = HashMap::new();
        backups.insert(
            Gid(1),
            vec![
                PathHop {
                    switch: Dpid(1),
                    ingress_port: PortNo(100),
                    egress_port: PortNo(2),
                },
                PathHop {
                    switch: Dpid(3),
                    ingress_port: PortNo(1),
                    egress_port: PortNo(2),
                },
            ],
        );

        let config = TeConfig {
            threshold: 0.90,
            method: OptiMethod::FirstSol,
            candidate_sort_rev: true,
            pot_path_sort_rev: false,
            partial_accept: false,
        };

        let result = run_pass(&topo, &[candidate], &backups, &config);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].gid, Gid(1));
        assert!(!result.changes[0].is_partial);
        assert!(!result.residual_congestion);
    }

    #[test]
    fn no_congestion_means_no_pass_activity() {
        let mut topo = Topology::new();
        topo.add_link(Dpid(1), PortNo(1), Dpid(2), PortNo(1), 1_000_000_000);
        topo.host_discovered(host(1), Dpid(1), PortNo(100));
        topo.host_discovered(host(2), Dpid(2), PortNo(100));

        let config = TeConfig {
            threshold: 0.90,
            method: OptiMethod::FirstSol,
            candidate_sort_rev: true,
            pot_path_sort_rev: false,
            partial_accept: false,
        };
        let result = run_pass(&topo, &[], &HashMap::new(), &config);
        assert!(result.changes.is_empty());
        assert!(!result.residual_congestion);
    }
}
