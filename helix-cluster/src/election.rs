//
// Helix — multi-controller leader election (§4.G.1, §4.G.2).
//
// Deterministic: the live instance with the lowest instance_id is master.
// Generalises the teacher's VRRP master/backup FSM (priority-based) to an
// instance-id-based election with no priority configuration.
//

use std::collections::HashMap;
use std::time::{Duration, Instant};

use helix_utils::ibus::{AreaId, InstanceId};

/// Every live instance emits a heartbeat at this period (§4.G.1).
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);

/// A master is declared dead after this many consecutive missed
/// heartbeats (§4.G.1: "missed (>3s by default)").
pub const MISSED_HEARTBEAT_LIMIT: u32 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Master,
    Slave,
}

#[derive(Clone, Copy, Debug)]
struct PeerState {
    epoch: u64,
    last_heartbeat: Instant,
}

/// One local controller instance's view of its area's election state.
///
/// `epoch` is this instance's own belief about the current area epoch;
/// it only ever moves forward (§4.G.2: "epochs are strictly monotone per
/// area").
#[derive(Debug)]
pub struct ClusterState {
    pub area_id: AreaId,
    pub instance_id: InstanceId,
    pub role: Role,
    pub epoch: u64,
    peers: HashMap<InstanceId, PeerState>,
}

impl ClusterState {
    pub fn new(area_id: AreaId, instance_id: InstanceId) -> Self {
        ClusterState {
            area_id,
            instance_id,
            role: Role::Slave,
            epoch: 0,
            peers: HashMap::new(),
        }
    }

    /// Records a heartbeat from `sender` at `epoch`.
    pub fn on_heartbeat(&mut self, now: Instant, sender: InstanceId, epoch: u64) {
        self.peers.insert(
            sender,
            PeerState {
                epoch,
                last_heartbeat: now,
            },
        );
    }

    fn peer_is_live(&self, now: Instant, peer: &PeerState) -> bool {
        now.duration_since(peer.last_heartbeat)
            < HEARTBEAT_PERIOD * MISSED_HEARTBEAT_LIMIT
    }

    /// Returns `true` once a peer has been seen to have missed three
    /// consecutive heartbeats.
    pub fn peer_is_dead(&self, now: Instant, peer: InstanceId) -> bool {
        match self.peers.get(&peer) {
            Some(state) => !self.peer_is_live(now, state),
            None => true,
        }
    }

    /// Live instance ids, including this one (a slave always considers
    /// itself live).
    fn live_instances(&self, now: Instant) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self
            .peers
            .iter()
            .filter(|(_, state)| self.peer_is_live(now, state))
            .map(|(id, _)| *id)
            .collect();
        ids.push(self.instance_id);
        ids.sort_unstable();
        ids
    }

    /// Re-runs the election over currently-known live instances. The
    /// lowest live instance_id wins. Returns `Some(new_epoch)` only when
    /// this instance becomes (or remains) master and a ROLE_ANNOUNCE
    /// should be sent; `None` means this instance is (or remains) a
    /// slave.
    pub fn elect(&mut self, now: Instant) -> Option<u64> {
        let winner = self.live_instances(now).into_iter().min();
        if winner == Some(self.instance_id) {
            if self.role != Role::Master {
                self.epoch += 1;
            }
            self.role = Role::Master;
            Some(self.epoch)
        } else {
            self.role = Role::Slave;
            None
        }
    }

    /// Processes a ROLE_ANNOUNCE from `sender` at `epoch`. Per §4.G.2, a
    /// returning old master observes a higher epoch than its own and
    /// demotes itself; any instance observing a stale (lower-or-equal)
    /// epoch ignores the announce.
    pub fn on_role_announce(&mut self, sender: InstanceId, epoch: u64) {
        if epoch <= self.epoch {
            return;
        }
        self.epoch = epoch;
        self.role = if sender == self.instance_id {
            Role::Master
        } else {
            Role::Slave
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_instance_id_wins_election() {
        let now = Instant::now();
        let mut state = ClusterState::new(1, 5);
        state.on_heartbeat(now, 2, 0);
        state.on_heartbeat(now, 9, 0);

        let outcome = state.elect(now);
        assert_eq!(outcome, None);
        assert_eq!(state.role, Role::Slave);
    }

    #[test]
    fn instance_becomes_master_when_it_is_the_lowest_live_id() {
        let now = Instant::now();
        let mut state = ClusterState::new(1, 2);
        state.on_heartbeat(now, 9, 0);

        let outcome = state.elect(now);
        assert_eq!(outcome, Some(1));
        assert_eq!(state.role, Role::Master);
    }

    #[test]
    fn dead_peer_is_excluded_from_election() {
        let now = Instant::now();
        let mut state = ClusterState::new(1, 9);
        // Peer 2's heartbeat is stale enough to count as dead.
        state.on_heartbeat(
            now - HEARTBEAT_PERIOD * (MISSED_HEARTBEAT_LIMIT + 1),
            2,
            0,
        );
        assert!(state.peer_is_dead(now, 2));

        let outcome = state.elect(now);
        assert_eq!(outcome, Some(1));
        assert_eq!(state.role, Role::Master);
    }

    #[test]
    fn returning_old_master_demotes_on_higher_epoch() {
        let now = Instant::now();
        let mut state = ClusterState::new(1, 2);
        state.epoch = 3;
        state.role = Role::Master;

        // A new master announced while we were partitioned away.
        state.on_role_announce(9, 4);
        assert_eq!(state.role, Role::Slave);
        assert_eq!(state.epoch, 4);
    }

    #[test]
    fn stale_role_announce_is_ignored() {
        let now = Instant::now();
        let _ = now;
        let mut state = ClusterState::new(1, 2);
        state.epoch = 5;
        state.role = Role::Master;

        state.on_role_announce(9, 5);
        assert_eq!(state.role, Role::Master);
        assert_eq!(state.epoch, 5);
    }

    #[test]
    fn re_election_increments_epoch_only_on_role_change() {
        let now = Instant::now();
        let mut state = ClusterState::new(1, 2);
        state.on_heartbeat(now, 9, 0);

        assert_eq!(state.elect(now), Some(1));
        assert_eq!(state.epoch, 1);
        // Already master: re-electing with the same live set must not
        // bump the epoch again.
        assert_eq!(state.elect(now), Some(1));
        assert_eq!(state.epoch, 1);
    }
}
