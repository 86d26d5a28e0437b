//
// Helix — Dijkstra shortest path and node/link-disjoint backup computation
// (§4.B).
//

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use helix_topology::Topology;
use helix_utils::{Dpid, HostId, PortNo};

use crate::path::{BackupPath, Path, PathHop};
use crate::weight::WeightFn;

/// How ties between equal-weight paths are broken (§4.B).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TieBreak {
    /// Fewer hops first, then lexicographically smaller DPID sequence —
    /// the default for unit-weight queries.
    HopsThenLex,
    /// Smaller maximum edge usage first, then shorter length, then
    /// lexicographically — used when weights encode TE usage (CSPF).
    UsageThenLenThenLex,
}

/// A fully-ordered search key. Each field is monotonically non-decreasing
/// as a candidate path is extended by one more edge, which is what allows
/// combining them into a single Dijkstra priority without breaking
/// correctness: the conventional multi-criteria/lexicographic
/// generalization of Dijkstra's algorithm.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Key {
    weight: u64,
    primary_tiebreak: u64,
    secondary_tiebreak: u64,
    dpid_seq: Vec<Dpid>,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.primary_tiebreak.cmp(&other.primary_tiebreak))
            .then(self.secondary_tiebreak.cmp(&other.secondary_tiebreak))
            .then_with(|| self.dpid_seq.cmp(&other.dpid_seq))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn usage_fixed(usage: f64) -> u64 {
    (usage.max(0.0) * 1_000_000.0) as u64
}

/// Dijkstra over the switch-level topology from `start` to `goal`,
/// optionally skipping any edge in `excluded`. Returns the sequence of
/// on-path switch DPIDs (including `start` and `goal`), or `None` if
/// disconnected.
pub(crate) fn shortest_switch_path(
    topo: &Topology,
    start: Dpid,
    goal: Dpid,
    weight_fn: &WeightFn<'_>,
    tie_break: TieBreak,
    excluded: &HashSet<(Dpid, Dpid)>,
) -> Option<Vec<Dpid>> {
    if start == goal {
        return Some(vec![start]);
    }

    let root_key = Key {
        weight: 0,
        primary_tiebreak: 0,
        secondary_tiebreak: 0,
        dpid_seq: vec![start],
    };

    let mut best: HashMap<Dpid, Key> = HashMap::new();
    best.insert(start, root_key.clone());
    let mut cand: BTreeMap<(Key, Dpid), ()> = BTreeMap::new();
    cand.insert((root_key, start), ());
    let mut settled: HashSet<Dpid> = HashSet::new();
    let mut prev: HashMap<Dpid, Dpid> = HashMap::new();

    while let Some(((key, u), _)) = cand.iter().next().map(|(k, v)| (k.clone(), *v)) {
        cand.remove(&(key.clone(), u));
        if settled.contains(&u) {
            continue;
        }
        settled.insert(u);

        if u == goal {
            let mut path = vec![goal];
            let mut cur = goal;
            while let Some(&p) = prev.get(&cur) {
                path.push(p);
                cur = p;
            }
            path.reverse();
            return Some(path);
        }

        for edge in topo.edges_from(u) {
            if !edge.active || excluded.contains(&(edge.from, edge.to)) {
                continue;
            }
            if settled.contains(&edge.to) {
                continue;
            }
            let w = weight_fn(&edge) as u64;
            let hops = (key.dpid_seq.len()) as u64;
            let prev_max_usage = match tie_break {
                TieBreak::UsageThenLenThenLex => key.primary_tiebreak,
                TieBreak::HopsThenLex => 0,
            };
            let edge_usage = usage_fixed(edge.utilisation());
            let max_usage = prev_max_usage.max(edge_usage);

            let mut dpid_seq = key.dpid_seq.clone();
            dpid_seq.push(edge.to);

            let (primary_tiebreak, secondary_tiebreak) = match tie_break {
                TieBreak::HopsThenLex => (hops, 0),
                TieBreak::UsageThenLenThenLex => (max_usage, hops),
            };

            let new_key = Key {
                weight: key.weight + w,
                primary_tiebreak,
                secondary_tiebreak,
                dpid_seq,
            };

            let better = match best.get(&edge.to) {
                Some(existing) => new_key < *existing,
                None => true,
            };
            if better {
                best.insert(edge.to, new_key.clone());
                prev.insert(edge.to, u);
                cand.insert((new_key, edge.to), ());
            }
        }
    }

    None
}

/// Builds the port-level [`Path`] for a switch-DPID sequence, filling in
/// the host-facing access ports at both ends (§3 "Path" invariant (i)).
pub(crate) fn build_path(
    topo: &Topology,
    src_port: PortNo,
    switch_seq: &[Dpid],
    dst_port: PortNo,
) -> Option<Path> {
    if switch_seq.is_empty() {
        return None;
    }
    if switch_seq.len() == 1 {
        return Some(vec![PathHop {
            switch: switch_seq[0],
            ingress_port: src_port,
            egress_port: dst_port,
        }]);
    }

    let mut hops = Vec::with_capacity(switch_seq.len());
    for (i, &sw) in switch_seq.iter().enumerate() {
        let ingress = if i == 0 {
            src_port
        } else {
            let prev = switch_seq[i - 1];
            let edge = topo.edge_between(prev, sw)?;
            edge.to_port
        };
        let egress = if i + 1 == switch_seq.len() {
            dst_port
        } else {
            let next = switch_seq[i + 1];
            let edge = topo.edge_between(sw, next)?;
            edge.from_port
        };
        hops.push(PathHop {
            switch: sw,
            ingress_port: ingress,
            egress_port: egress,
        });
    }
    Some(hops)
}

/// Computes the shortest path between two hosts (§4.B).
///
/// Returns `Some(vec![])` if `src == dst` (§4.B edge case: "source equals
/// destination yields empty path (not NONE)"), `None` if disconnected.
pub fn shortest_path(
    topo: &Topology,
    src: HostId,
    dst: HostId,
    weight_fn: &WeightFn<'_>,
    tie_break: TieBreak,
) -> Option<Path> {
    if src == dst {
        return Some(Vec::new());
    }
    let src_entry = topo.host(src)?;
    let dst_entry = topo.host(dst)?;
    let (src_sw, src_port) = src_entry.attached?;
    let (dst_sw, dst_port) = dst_entry.attached?;

    let switch_seq = shortest_switch_path(
        topo,
        src_sw,
        dst_sw,
        weight_fn,
        tie_break,
        &HashSet::new(),
    )?;
    build_path(topo, src_port, &switch_seq, dst_port)
}

/// Computes a primary path and a disjoint backup (§4.B).
///
/// The backup is found by excluding the primary's own edges (in both
/// directions) and recomputing. If the result shares no intermediate
/// switch with the primary it is node-disjoint ([`BackupPath::Full`]);
/// otherwise it is only link-disjoint ([`BackupPath::Partial`]).
pub fn disjoint_pair(
    topo: &Topology,
    src: HostId,
    dst: HostId,
    weight_fn: &WeightFn<'_>,
    tie_break: TieBreak,
) -> Option<(Path, BackupPath)> {
    let primary = shortest_path(topo, src, dst, weight_fn, tie_break)?;
    if primary.len() < 2 {
        // Same host, or src/dst on the very same switch: no room for a
        // disjoint backup to even differ.
        return Some((primary, BackupPath::None));
    }

    let src_entry = topo.host(src)?;
    let dst_entry = topo.host(dst)?;
    let (src_sw, src_port) = src_entry.attached?;
    let (dst_sw, dst_port) = dst_entry.attached?;

    let mut excluded = HashSet::new();
    for hop in &primary {
        if let Some(edge) = topo.edge(hop.switch, hop.egress_port) {
            excluded.insert((edge.from, edge.to));
            excluded.insert((edge.to, edge.from));
        }
    }

    let backup_seq = shortest_switch_path(
        topo, src_sw, dst_sw, weight_fn, tie_break, &excluded,
    );

    let backup = match backup_seq {
        None => BackupPath::None,
        Some(seq) => match build_path(topo, src_port, &seq, dst_port) {
            None => BackupPath::None,
            Some(backup_path) => {
                let primary_intermediate: HashSet<Dpid> = primary
                    [1..primary.len().saturating_sub(1).max(0)]
                    .iter()
                    .map(|h| h.switch)
                    .collect();
                let backup_intermediate: HashSet<Dpid> = if backup_path.len() > 2 {
                    backup_path[1..backup_path.len() - 1]
                        .iter()
                        .map(|h| h.switch)
                        .collect()
                } else {
                    HashSet::new()
                };
                if primary_intermediate.is_disjoint(&backup_intermediate) {
                    BackupPath::Full(backup_path)
                } else {
                    BackupPath::Partial(backup_path)
                }
            }
        },
    };

    Some((primary, backup))
}
