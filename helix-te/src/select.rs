//
// Helix — TE path selection methods (§4.E, §9 redesign flags).
//
// Exception-based control flow in the original is reframed as an
// explicit result enum per the redesign note: `Selected | NoCandidate |
// InfeasibleNeedsPartial | Residual`.
//

use std::str::FromStr;

use helix_path::Path;
use helix_utils::Gid;

use crate::usage::LinkUsageTable;

/// One of the four closed TE strategies (§4.E), resolved from
/// configuration at startup rather than dispatched on a string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptiMethod {
    FirstSol,
    BestSolUsage,
    BestSolPLen,
    CSPFRecomp,
}

impl FromStr for OptiMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FirstSol" => Ok(OptiMethod::FirstSol),
            "BestSolUsage" => Ok(OptiMethod::BestSolUsage),
            "BestSolPLen" => Ok(OptiMethod::BestSolPLen),
            "CSPFRecomp" => Ok(OptiMethod::CSPFRecomp),
            _ => Err(()),
        }
    }
}

/// The outcome of selecting a path for one candidate.
#[derive(Clone, Debug)]
pub enum Decision {
    /// A path was chosen and should be applied.
    Selected { path: Path, is_partial: bool },
    /// Nothing to do for this candidate (method-specific: e.g. FirstSol
    /// found a strictly-valid path, no need to consider partials).
    NoCandidate,
    /// No strictly-valid path exists and either `partial_accept` is
    /// false or no partial would improve on the pre-change max usage.
    InfeasibleNeedsPartial,
    /// The pass could not resolve this candidate at all; congestion on
    /// its edges persists.
    Residual,
}

/// A potential path annotated with the projected usage of its most
/// loaded edge, computed against `table` as if `gid`'s contribution on
/// every edge were replaced by `rate_bps`.
#[derive(Clone, Debug)]
pub struct Projected {
    pub path: Path,
    pub max_edge_usage_bps: u64,
    pub max_edge_capacity_bps: u64,
}

fn project(table: &LinkUsageTable, gid: Gid, rate_bps: u64, path: &Path, capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>) -> Option<Projected> {
    let mut max_usage = 0u64;
    let mut max_capacity = u64::MAX;
    for hop in path {
        let edge = (hop.switch, hop.egress_port);
        let cap = capacities(hop.switch, hop.egress_port)?;
        let usage = table.projected_usage(edge, gid, rate_bps);
        if usage > max_usage {
            max_usage = usage;
            max_capacity = cap;
        }
    }
    Some(Projected {
        path: path.clone(),
        max_edge_usage_bps: max_usage,
        max_edge_capacity_bps: max_capacity,
    })
}

/// A path is valid if, after projecting the candidate onto it, every
/// edge stays at or under capacity.
fn is_valid(
    table: &LinkUsageTable,
    gid: Gid,
    rate_bps: u64,
    path: &Path,
    capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>,
) -> bool {
    path.iter().all(|hop| {
        let edge = (hop.switch, hop.egress_port);
        match capacities(hop.switch, hop.egress_port) {
            Some(cap) => table.projected_usage(edge, gid, rate_bps) <= cap,
            None => false,
        }
    })
}

/// Strictly valid additionally stays under τ·capacity.
fn is_strictly_valid(
    table: &LinkUsageTable,
    gid: Gid,
    rate_bps: u64,
    path: &Path,
    threshold: f64,
    capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>,
) -> bool {
    path.iter().all(|hop| {
        let edge = (hop.switch, hop.egress_port);
        match capacities(hop.switch, hop.egress_port) {
            Some(cap) => {
                let projected = table.projected_usage(edge, gid, rate_bps) as f64;
                projected <= threshold * cap as f64
            }
            None => false,
        }
    })
}

/// Selects a path for one candidate from its potential-path set.
///
/// `capacities` resolves a (switch, egress_port) to its capacity; a
/// missing edge (e.g. a potential path that traverses a link that has
/// since vanished) makes the path invalid. `pre_change_max_usage` is the
/// network's maximum edge usage before this candidate is considered, used
/// to judge whether a partial admission strictly improves it (§4.E,
/// "partial accept").
#[allow(clippy::too_many_arguments)]
pub fn select_path(
    method: OptiMethod,
    table: &LinkUsageTable,
    gid: Gid,
    rate_bps: u64,
    potential_paths: &[Path],
    threshold: f64,
    partial_accept: bool,
    pot_path_sort_rev: bool,
    pre_change_max_usage_bps: u64,
    capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>,
) -> Decision {
    if potential_paths.is_empty() {
        return Decision::Residual;
    }

    let strictly_valid: Vec<Path> = potential_paths
        .iter()
        .filter(|p| is_strictly_valid(table, gid, rate_bps, p, threshold, capacities))
        .cloned()
        .collect();

    match method {
        OptiMethod::FirstSol => {
            if let Some(path) = strictly_valid.into_iter().next() {
                return Decision::Selected {
                    path,
                    is_partial: false,
                };
            }
            // FirstSol never admits a partial (§4.E).
            Decision::InfeasibleNeedsPartial
        }
        OptiMethod::BestSolUsage | OptiMethod::BestSolPLen => {
            if let Some(best) = pick_best(
                &strictly_valid,
                table,
                gid,
                rate_bps,
                method,
                pot_path_sort_rev,
                capacities,
            ) {
                return Decision::Selected {
                    path: best,
                    is_partial: false,
                };
            }

            if !partial_accept {
                return Decision::InfeasibleNeedsPartial;
            }

            let valid: Vec<Path> = potential_paths
                .iter()
                .filter(|p| is_valid(table, gid, rate_bps, p, capacities))
                .cloned()
                .collect();

            match pick_best_partial(&valid, table, gid, rate_bps, pre_change_max_usage_bps, capacities) {
                Some(path) => Decision::Selected {
                    path,
                    is_partial: true,
                },
                None => Decision::InfeasibleNeedsPartial,
            }
        }
        OptiMethod::CSPFRecomp => {
            // CSPFRecomp's potential set is the single recomputed path,
            // taken verbatim.
            let path = &potential_paths[0];
            if is_strictly_valid(table, gid, rate_bps, path, threshold, capacities) {
                return Decision::Selected {
                    path: path.clone(),
                    is_partial: false,
                };
            }
            if !partial_accept {
                return Decision::InfeasibleNeedsPartial;
            }
            if !is_valid(table, gid, rate_bps, path, capacities) {
                return Decision::InfeasibleNeedsPartial;
            }
            let Some(projected) = project(table, gid, rate_bps, path, capacities) else {
                return Decision::InfeasibleNeedsPartial;
            };
            if projected.max_edge_usage_bps < pre_change_max_usage_bps {
                Decision::Selected {
                    path: path.clone(),
                    is_partial: true,
                }
            } else {
                Decision::InfeasibleNeedsPartial
            }
        }
    }
}

fn pick_best(
    candidates: &[Path],
    table: &LinkUsageTable,
    gid: Gid,
    rate_bps: u64,
    method: OptiMethod,
    pot_path_sort_rev: bool,
    capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>,
) -> Option<Path> {
    let mut projected: Vec<Projected> = candidates
        .iter()
        .filter_map(|p| project(table, gid, rate_bps, p, capacities))
        .collect();
    if projected.is_empty() {
        return None;
    }

    // pot_path_sort_rev = false: tightest fit (maximise max usage);
    // true: most headroom (minimise max usage). BestSolPLen adds path
    // length as the secondary key.
    projected.sort_by(|a, b| {
        let primary = if pot_path_sort_rev {
            a.max_edge_usage_bps.cmp(&b.max_edge_usage_bps)
        } else {
            b.max_edge_usage_bps.cmp(&a.max_edge_usage_bps)
        };
        if method == OptiMethod::BestSolPLen {
            primary.then(a.path.len().cmp(&b.path.len()))
        } else {
            primary
        }
    });
    Some(projected.into_iter().next().unwrap().path)
}

/// Partial-accept tie-break (Open Question (b), SPEC_FULL.md binding
/// decision): lowest resulting max usage, then shorter length, then
/// lexicographically smaller on-path DPID sequence.
fn pick_best_partial(
    candidates: &[Path],
    table: &LinkUsageTable,
    gid: Gid,
    rate_bps: u64,
    pre_change_max_usage_bps: u64,
    capacities: &dyn Fn(helix_utils::Dpid, helix_utils::PortNo) -> Option<u64>,
) -> Option<Path> {
    let mut improving: Vec<Projected> = candidates
        .iter()
        .filter_map(|p| project(table, gid, rate_bps, p, capacities))
        .filter(|p| p.max_edge_usage_bps < pre_change_max_usage_bps)
        .collect();
    if improving.is_empty() {
        return None;
    }
    improving.sort_by(|a, b| {
        a.max_edge_usage_bps
            .cmp(&b.max_edge_usage_bps)
            .then(a.path.len().cmp(&b.path.len()))
            .then_with(|| {
                let a_seq: Vec<_> = a.path.iter().map(|h| h.switch).collect();
                let b_seq: Vec<_> = b.path.iter().map(|h| h.switch).collect();
                a_seq.cmp(&b_seq)
            })
    });
    Some(improving.into_iter().next().unwrap().path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_path::PathHop;
    use helix_utils::{Dpid, PortNo};

    fn hop(switch: u64, egress: u32) -> PathHop {
        PathHop {
            switch: Dpid(switch),
            ingress_port: PortNo(0),
            egress_port: PortNo(egress),
        }
    }

    fn caps(switch: helix_utils::Dpid, _port: PortNo) -> Option<u64> {
        match switch.0 {
            1 => Some(80_000_000),
            _ => Some(1_000_000_000),
        }
    }

    #[test]
    fn first_sol_never_admits_partial() {
        let table = LinkUsageTable::new();
        let overloaded_path = vec![hop(1, 1)];
        let decision = select_path(
            OptiMethod::FirstSol,
            &table,
            Gid(1),
            90_000_000,
            &[overloaded_path],
            0.9,
            true,
            false,
            0,
            &caps,
        );
        assert!(matches!(decision, Decision::InfeasibleNeedsPartial));
    }

    #[test]
    fn cspf_recomp_accepts_partial_only_if_it_reduces_max_usage() {
        let table = LinkUsageTable::new();
        let path = vec![hop(1, 1)];
        // 90 Mbps of 80 Mbps link = over capacity -> not even valid.
        let decision = select_path(
            OptiMethod::CSPFRecomp,
            &table,
            Gid(1),
            90_000_000,
            &[path.clone()],
            0.9,
            true,
            false,
            100_000_000,
            &caps,
        );
        assert!(matches!(decision, Decision::InfeasibleNeedsPartial));

        // 75 Mbps of 80 Mbps: valid but not strictly valid (>72Mbps=0.9*80M);
        // improves on a worse pre-change max usage of 100 Mbps.
        let decision = select_path(
            OptiMethod::CSPFRecomp,
            &table,
            Gid(1),
            75_000_000,
            &[path],
            0.9,
            true,
            false,
            100_000_000,
            &caps,
        );
        assert!(matches!(decision, Decision::Selected { is_partial: true, .. }));
    }
}
