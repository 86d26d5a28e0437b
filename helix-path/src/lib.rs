//
// Helix — path computation and protection engine (§4.B).
//
// Dijkstra-based shortest-path queries, node-disjoint (falling back to
// link-disjoint) backup paths, and strict/loose path splices used to
// populate fast-failover groups.
//
// SPDX-License-Identifier: MIT
//

pub mod path;
pub mod shortest;
pub mod splice;
pub mod weight;

pub use path::{is_valid, switches, BackupPath, Path, PathHop};
pub use shortest::{disjoint_pair, shortest_path, TieBreak};
pub use splice::{splices_loose, splices_strict, Splice};
pub use weight::{cspf_weight, unit_weight, WeightFn};
