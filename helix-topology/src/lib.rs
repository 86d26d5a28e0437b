//
// Helix — topology graph with TE metrics (§3, §4.A).
//
// A directed multigraph of switches and hosts augmented with per-port
// capacity and live usage, supporting the O(deg) queries required by the
// path-computation layer. Mutations emit topology-change events consumed
// by the path engine, protection installer, and local controller.
//
// SPDX-License-Identifier: MIT
//

pub mod error;
pub mod graph;

pub use error::TopologyError;
pub use graph::{
    Edge, PortDesc, Topology, TopologyChange, TopologyEvent,
};
