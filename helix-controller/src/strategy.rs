//
// Helix — the RecoveryStrategy closed enum (§9 "Inheritance chain"
// redesign flag).
//
// The teacher's `opti_method` dispatch is a closed enum resolved once at
// startup rather than a trait object (§4.E's additional notes); the same
// pattern applies here: `[application] optimise_protection` plus the
// splice-mode choice of Open Question (c) resolve to exactly one of
// these three variants before the control task ever runs.
//

use helix_path::{
    disjoint_pair, shortest_path, splices_loose, splices_strict, unit_weight, BackupPath, Path,
    Splice, TieBreak,
};
use helix_topology::Topology;
use helix_utils::{HostId, PortNo};

use crate::config::{ApplicationConfig, SpliceMode};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecoveryStrategy {
    /// No protection group is pre-installed; a link failure is handled
    /// purely by the controller recomputing and reinstalling the
    /// primary path.
    Reactive,
    /// A node-disjoint (falling back to link-disjoint) backup is
    /// pre-installed via a strict splice (§4.B `splices_strict`).
    ProtectionStrict,
    /// Same as `ProtectionStrict`, but the splice is loose: it trusts
    /// the backup's first hop without re-validating reachability.
    ProtectionLooseSplice,
}

impl RecoveryStrategy {
    /// Resolves the strategy from configuration, once, at startup.
    pub fn resolve(application: &ApplicationConfig, splice_mode: SpliceMode) -> Self {
        if !application.optimise_protection {
            return RecoveryStrategy::Reactive;
        }
        match splice_mode {
            SpliceMode::Strict => RecoveryStrategy::ProtectionStrict,
            SpliceMode::Loose => RecoveryStrategy::ProtectionLooseSplice,
        }
    }

    /// Computes the primary path and, for the `Protection*` variants, the
    /// disjoint backup and the splices that populate its fast-failover
    /// group. Returns `None` if `dst` is unreachable from `src`.
    pub fn compute_paths(
        &self,
        topo: &Topology,
        src: HostId,
        dst: HostId,
    ) -> Option<(Path, BackupPath, Vec<Splice>)> {
        let weight = unit_weight();
        match self {
            RecoveryStrategy::Reactive => {
                let primary = shortest_path(topo, src, dst, &weight, TieBreak::HopsThenLex)?;
                Some((primary, BackupPath::None, Vec::new()))
            }
            RecoveryStrategy::ProtectionStrict | RecoveryStrategy::ProtectionLooseSplice => {
                let (primary, backup) =
                    disjoint_pair(topo, src, dst, &weight, TieBreak::HopsThenLex)?;
                let splices = match self {
                    RecoveryStrategy::ProtectionStrict => {
                        let dst_port = primary
                            .last()
                            .map(|hop| hop.egress_port)
                            .unwrap_or(PortNo(0));
                        splices_strict(topo, &primary, dst_port, &weight, TieBreak::HopsThenLex)
                    }
                    RecoveryStrategy::ProtectionLooseSplice => splices_loose(&primary, &backup),
                    RecoveryStrategy::Reactive => unreachable!(),
                };
                Some((primary, backup, splices))
            }
        }
    }
}
