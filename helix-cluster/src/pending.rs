//
// Helix — outstanding INTER_AREA_REQ bookkeeping (§4.G.4, §4.H).
//
// A local controller forwards requests for out-of-area destinations to
// the root controller over the bus and, eventually, gets an
// INTER_AREA_RESP back carrying the stitched path. This tracks the
// request_id -> Gid mapping between the two, and times a request out if
// root never answers (§5's bus-send/ack suspension point).
//

use std::collections::HashMap;
use std::time::Duration;

use helix_utils::Gid;

/// Default timeout for an inter-area request, matching the switch
/// round-trip default of §5.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct PendingRequests {
    next_id: u64,
    outstanding: HashMap<u64, Gid>,
}

impl PendingRequests {
    pub fn new() -> Self {
        PendingRequests::default()
    }

    /// Allocates a fresh request_id for `gid` and marks it outstanding.
    pub fn start(&mut self, gid: Gid) -> u64 {
        self.next_id += 1;
        let request_id = self.next_id;
        self.outstanding.insert(request_id, gid);
        request_id
    }

    /// Resolves a request by id, returning the candidate it was for if
    /// it was still outstanding (duplicate or stale responses are
    /// ignored).
    pub fn resolve(&mut self, request_id: u64) -> Option<Gid> {
        self.outstanding.remove(&request_id)
    }

    pub fn cancel(&mut self, gid: Gid) {
        self.outstanding.retain(|_, g| *g != gid);
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_removes_the_request() {
        let mut pending = PendingRequests::new();
        let id = pending.start(Gid(7));
        assert_eq!(pending.outstanding_count(), 1);
        assert_eq!(pending.resolve(id), Some(Gid(7)));
        assert_eq!(pending.outstanding_count(), 0);
    }

    #[test]
    fn duplicate_resolve_is_a_no_op() {
        let mut pending = PendingRequests::new();
        let id = pending.start(Gid(7));
        assert_eq!(pending.resolve(id), Some(Gid(7)));
        assert_eq!(pending.resolve(id), None);
    }

    #[test]
    fn request_ids_are_unique_per_instance() {
        let mut pending = PendingRequests::new();
        let a = pending.start(Gid(1));
        let b = pending.start(Gid(2));
        assert_ne!(a, b);
    }
}
