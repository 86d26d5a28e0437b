//
// Helix — protection installer: diffs desired group/flow state against
// what is believed installed and emits an ordered sequence of
// install/remove operations (§4.C).
//
// Ordering follows the same make-before-break discipline as
// `holo-routing`'s RIB-to-netlink sync: additions install the group
// before the flow that references it (a flow referencing a nonexistent
// group is rejected by the switch), and removals deactivate the flow
// before uninstalling the group it pointed to (removing a group still
// referenced by a flow is rejected too).
//

use std::collections::HashMap;

use helix_utils::{Dpid, Gid};
use tracing::debug;

use crate::compile::{FlowSpec, GroupSpec};

/// One step of a reconciliation plan, to be executed in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstallOp {
    InstallGroup(GroupSpec),
    InstallFlow(FlowSpec),
    RemoveFlow(Dpid, Gid),
    RemoveGroup(Dpid, Gid),
}

/// Tracks the installer's belief about what is currently programmed on
/// the switches, so that repeated calls to [`Installer::reconcile`] only
/// emit the delta.
#[derive(Debug, Default)]
pub struct Installer {
    groups: HashMap<(Dpid, Gid), GroupSpec>,
    flows: HashMap<(Dpid, Gid), FlowSpec>,
}

impl Installer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the ops needed to converge installed state onto
    /// `desired_groups`/`desired_flows`, and updates the installer's own
    /// bookkeeping as if those ops had already succeeded.
    ///
    /// Callers that need to handle partial failure should only commit
    /// the prefix of the returned plan that actually succeeded; this
    /// type does not itself retry.
    pub fn reconcile(
        &mut self,
        desired_groups: &[GroupSpec],
        desired_flows: &[FlowSpec],
    ) -> Vec<InstallOp> {
        let desired_groups: HashMap<(Dpid, Gid), GroupSpec> = desired_groups
            .iter()
            .cloned()
            .map(|g| ((g.switch, g.gid), g))
            .collect();
        let desired_flows: HashMap<(Dpid, Gid), FlowSpec> = desired_flows
            .iter()
            .cloned()
            .map(|f| ((f.switch, f.gid), f))
            .collect();

        let mut ops = Vec::new();

        // Deactivate-then-uninstall: flows stale or gone first, then the
        // groups they used to reference.
        let stale_flow_keys: Vec<(Dpid, Gid)> = self
            .flows
            .iter()
            .filter(|(k, v)| desired_flows.get(k) != Some(v))
            .map(|(k, _)| *k)
            .collect();
        for key in &stale_flow_keys {
            ops.push(InstallOp::RemoveFlow(key.0, key.1));
            self.flows.remove(key);
        }
        let stale_group_keys: Vec<(Dpid, Gid)> = self
            .groups
            .iter()
            .filter(|(k, v)| desired_groups.get(k) != Some(v))
            .map(|(k, _)| *k)
            .collect();
        for key in &stale_group_keys {
            ops.push(InstallOp::RemoveGroup(key.0, key.1));
            self.groups.remove(key);
        }

        // Install-then-activate: new/changed groups first, then the
        // flows that reference them.
        for (key, spec) in &desired_groups {
            if self.groups.get(key) != Some(spec) {
                ops.push(InstallOp::InstallGroup(spec.clone()));
                self.groups.insert(*key, spec.clone());
            }
        }
        for (key, spec) in &desired_flows {
            if self.flows.get(key) != Some(spec) {
                ops.push(InstallOp::InstallFlow(*spec));
                self.flows.insert(*key, *spec);
            }
        }

        debug!(ops = ops.len(), "reconciled protection state");
        ops
    }

    pub fn installed_group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn installed_flow_count(&self) -> usize {
        self.flows.len()
    }
}
