//
// Helix — candidate lifecycle (§3 "Candidate", §4.F).
//

use helix_path::{BackupPath, Path, Splice};
use helix_utils::{Gid, HostId};
use serde::{Deserialize, Serialize};

/// A tracked (src, dst) host pair and its current forwarding state.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Candidate {
    pub gid: Gid,
    pub src: HostId,
    pub dst: HostId,
    pub primary: Path,
    #[serde(skip, default = "default_backup")]
    pub backup: BackupPath,
    pub splices: Vec<Splice>,
    pub send_rate_bps: u64,
    /// Set when the path engine could not find any path at all; the
    /// candidate is retried on every topology change (§7 "Path-not-found").
    pub no_path: bool,
}

fn default_backup() -> BackupPath {
    BackupPath::None
}

impl Candidate {
    pub fn new(src: HostId, dst: HostId) -> Self {
        Candidate {
            gid: Gid::for_pair(src, dst),
            src,
            dst,
            primary: Vec::new(),
            backup: BackupPath::None,
            splices: Vec::new(),
            send_rate_bps: 0,
            no_path: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_utils::MacAddr;
    use std::net::Ipv4Addr;

    #[test]
    fn gid_matches_deterministic_derivation() {
        let src = HostId {
            mac: MacAddr([0, 0, 0, 0, 0, 1]),
            ip: Ipv4Addr::new(10, 0, 0, 1),
        };
        let dst = HostId {
            mac: MacAddr([0, 0, 0, 0, 0, 2]),
            ip: Ipv4Addr::new(10, 0, 0, 2),
        };
        let candidate = Candidate::new(src, dst);
        assert_eq!(candidate.gid, Gid::for_pair(src, dst));
        assert!(candidate.no_path);
    }
}
