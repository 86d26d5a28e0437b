//
// Helix — STATE_SYNC shadow state (§4.G.3).
//
// "Only the master sends role-change requests to switches and modifies
// flow/group tables; slaves maintain shadow state via STATE_SYNC so
// failover is immediate." A slave never installs anything from its
// shadow; it exists purely so a newly-elected master already knows
// every candidate without waiting on a full topology rediscovery.
//

use std::collections::HashMap;

use helix_utils::ibus::{CandidateSnapshot, StateSyncPayload};
use helix_utils::Gid;

#[derive(Debug, Default)]
pub struct ShadowState {
    candidates: HashMap<Gid, CandidateSnapshot>,
}

impl ShadowState {
    pub fn new() -> Self {
        ShadowState::default()
    }

    /// Replaces the shadow wholesale with the master's latest push. The
    /// master always sends a full snapshot, so there is nothing to merge.
    pub fn apply(&mut self, payload: StateSyncPayload) {
        self.candidates = payload
            .candidates
            .into_iter()
            .map(|c| (c.gid, c))
            .collect();
    }

    pub fn get(&self, gid: Gid) -> Option<&CandidateSnapshot> {
        self.candidates.get(&gid)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_utils::MacAddr;
    use std::net::Ipv4Addr;

    fn host(n: u8) -> helix_utils::HostId {
        helix_utils::HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    #[test]
    fn apply_replaces_previous_snapshot_wholesale() {
        let mut shadow = ShadowState::new();
        shadow.apply(StateSyncPayload {
            candidates: vec![CandidateSnapshot {
                gid: Gid(1),
                src: host(1),
                dst: host(2),
                send_rate_bps: 100.0,
            }],
        });
        assert_eq!(shadow.candidate_count(), 1);

        shadow.apply(StateSyncPayload { candidates: vec![] });
        assert_eq!(shadow.candidate_count(), 0);
        assert!(shadow.get(Gid(1)).is_none());
    }
}
