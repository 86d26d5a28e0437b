//
// Helix — protection installer (§4.C).
//
// Compiles a candidate's computed path and splices into per-switch
// fast-failover groups and flows, then diffs desired state against
// installed state to produce an ordered install/remove plan.
//
// SPDX-License-Identifier: MIT
//

pub mod compile;
pub mod installer;

pub use compile::{compile_groups_and_flows, FlowSpec, GroupBucket, GroupSpec};
pub use installer::{InstallOp, Installer};
