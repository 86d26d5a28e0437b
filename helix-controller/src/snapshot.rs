//
// Helix — human-readable SIGUSR1 snapshot (§4.F, §6 "Signals").
//

use helix_utils::{Gid, HostId, PortNo};
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::fsm::ControllerState;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CandidateSnapshot {
    pub gid: Gid,
    pub src: HostId,
    pub dst: HostId,
    pub send_rate_bps: u64,
    pub no_path: bool,
    pub ports: Option<Vec<PortNo>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    pub candidates: Vec<CandidateSnapshot>,
}

/// Builds the snapshot SIGUSR1 emits. `include_ports` mirrors the
/// `[stats] out_port` configuration knob (§6).
pub fn build_snapshot(
    state: ControllerState,
    candidates: impl Iterator<Item = impl std::ops::Deref<Target = Candidate>>,
    include_ports: bool,
) -> ControllerSnapshot {
    let candidates = candidates
        .map(|c| CandidateSnapshot {
            gid: c.gid,
            src: c.src,
            dst: c.dst,
            send_rate_bps: c.send_rate_bps,
            no_path: c.no_path,
            ports: include_ports.then(|| c.primary.iter().map(|h| h.egress_port).collect()),
        })
        .collect();
    ControllerSnapshot { state, candidates }
}
