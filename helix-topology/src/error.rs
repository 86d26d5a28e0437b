//
// Helix — topology errors (§7).
//

use helix_utils::{Dpid, PortNo};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("switch {0} not found")]
    SwitchNotFound(Dpid),
    #[error("port {1} on switch {0} not found")]
    PortNotFound(Dpid, PortNo),
    #[error(
        "topology inconsistency: {a}:{ap} claims peer {b}:{bp}, \
         but {b}:{bp} does not point back"
    )]
    Inconsistency {
        a: Dpid,
        ap: PortNo,
        b: Dpid,
        bp: PortNo,
    },
}

impl TopologyError {
    /// Transient-severity errors log at WARN (§7); an inconsistency is also
    /// WARN-level here since the graph self-heals it by fixing up the back
    /// reference, rather than treating it as a fatal invariant violation.
    pub fn log(&self) {
        warn!(error = %self, "topology error");
    }
}
