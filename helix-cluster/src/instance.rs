//
// Helix — a cluster instance's bus event loop (§4.G).
//
// Wires [`ClusterState`] and [`ShadowState`] to the bus: [`Instance::on_envelope`]
// is the pure message handler (mirrors the teacher's `Instance` processing
// one VRRP packet at a time); [`Instance::run`] is the actual task loop,
// grounded on `holo-routing`'s ibus dispatch loop and the teacher's
// `IntervalTask`-driven hello timer.
//

use std::sync::Arc;
use std::time::Instant;

use helix_utils::ibus::{
    AreaId, Bus, BusEnvelope, BusMsg, BusReceiver, InstanceId, StateSyncPayload,
};
use helix_utils::task::IntervalTask;
use helix_utils::{Gid, HostId};
use tokio::sync::mpsc;
use tracing::info;

use crate::election::{ClusterState, Role, HEARTBEAT_PERIOD};
use crate::pending::PendingRequests;
use crate::sync::ShadowState;

/// A side effect [`Instance::on_envelope`] or [`Instance::tick`] asks the
/// caller to carry out: publish a message, or surface a resolved
/// inter-area response up to the controller.
#[derive(Debug)]
pub enum Action {
    Publish(BusMsg),
    InterAreaResolved {
        gid: Gid,
        stitched: Option<helix_utils::ibus::StitchedPath>,
    },
}

pub struct Instance {
    pub area_id: AreaId,
    pub instance_id: InstanceId,
    pub state: ClusterState,
    pub shadow: ShadowState,
    pub pending: PendingRequests,
}

impl Instance {
    pub fn new(area_id: AreaId, instance_id: InstanceId) -> Self {
        Instance {
            area_id,
            instance_id,
            state: ClusterState::new(area_id, instance_id),
            shadow: ShadowState::new(),
            pending: PendingRequests::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.state.role
    }

    /// Processes one bus message, returning any side effects the caller
    /// (the control task) should carry out.
    pub fn on_envelope(&mut self, now: Instant, envelope: &BusEnvelope) -> Vec<Action> {
        if envelope.sender == self.instance_id {
            return Vec::new();
        }
        match &envelope.payload {
            BusMsg::Heartbeat { epoch } => {
                self.state.on_heartbeat(now, envelope.sender, *epoch);
                Vec::new()
            }
            BusMsg::RoleQuery => {
                if self.state.role == Role::Master {
                    vec![Action::Publish(BusMsg::RoleAnnounce {
                        epoch: self.state.epoch,
                    })]
                } else {
                    Vec::new()
                }
            }
            BusMsg::RoleAnnounce { epoch } => {
                self.state.on_role_announce(envelope.sender, *epoch);
                Vec::new()
            }
            BusMsg::StateSync(payload) => {
                if self.state.role == Role::Slave {
                    self.shadow.apply(payload.clone());
                }
                Vec::new()
            }
            BusMsg::InterAreaReq(_) => Vec::new(),
            BusMsg::InterAreaResp(resp) => {
                match self.pending.resolve(resp.request_id) {
                    Some(gid) => vec![Action::InterAreaResolved {
                        gid,
                        stitched: resp.stitched.clone(),
                    }],
                    None => Vec::new(),
                }
            }
        }
    }

    /// Called by the heartbeat timer every [`HEARTBEAT_PERIOD`]: re-runs
    /// the election and returns the messages this instance should
    /// publish this tick.
    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = vec![Action::Publish(BusMsg::Heartbeat {
            epoch: self.state.epoch,
        })];
        if let Some(epoch) = self.state.elect(now) {
            actions.push(Action::Publish(BusMsg::RoleAnnounce { epoch }));
        }
        actions
    }

    /// Sends the master's candidate snapshot to slaves. No-op if this
    /// instance isn't master.
    pub fn push_state_sync(&self, payload: StateSyncPayload) -> Option<Action> {
        (self.role() == Role::Master).then(|| Action::Publish(BusMsg::StateSync(payload)))
    }

    /// Forwards a request for an out-of-area destination to the root
    /// controller, tracking it until a response (or timeout) arrives.
    pub fn request_inter_area_path(&mut self, gid: Gid, src: HostId, dst: HostId) -> Action {
        let request_id = self.pending.start(gid);
        Action::Publish(BusMsg::InterAreaReq(helix_utils::ibus::InterAreaReq {
            request_id,
            src,
            dst,
        }))
    }

    /// Runs this instance's bus event loop until the bus is closed.
    /// Heartbeats are driven by an [`IntervalTask`] posting ticks on an
    /// internal channel so the control task remains the sole mutator of
    /// `self` (§5's single-writer invariant).
    pub async fn run(mut self, bus: Arc<dyn Bus>, mut bus_rx: BusReceiver) {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<()>();
        let _heartbeat = IntervalTask::new(HEARTBEAT_PERIOD, true, move || {
            let tick_tx = tick_tx.clone();
            async move {
                let _ = tick_tx.send(());
            }
        });

        loop {
            tokio::select! {
                Some(()) = tick_rx.recv() => {
                    for action in self.tick(Instant::now()) {
                        self.dispatch(&bus, action);
                    }
                }
                envelope = bus_rx.recv() => {
                    let Some(envelope) = envelope else { break };
                    for action in self.on_envelope(Instant::now(), &envelope) {
                        self.dispatch(&bus, action);
                    }
                }
            }
        }
    }

    fn dispatch(&self, bus: &Arc<dyn Bus>, action: Action) {
        match action {
            Action::Publish(msg) => bus.publish(self.area_id, self.instance_id, msg),
            Action::InterAreaResolved { gid, stitched } => {
                info!(%gid, resolved = stitched.is_some(), "inter-area request resolved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_utils::ibus::InterAreaResp;
    use helix_utils::MacAddr;
    use std::net::Ipv4Addr;

    fn envelope(sender: InstanceId, payload: BusMsg) -> BusEnvelope {
        BusEnvelope {
            area_id: 1,
            sender,
            seqno: 1,
            payload,
        }
    }

    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    #[test]
    fn tick_emits_heartbeat_and_claims_mastery_when_alone() {
        let mut inst = Instance::new(1, 2);
        let actions = inst.tick(Instant::now());
        assert!(matches!(actions[0], Action::Publish(BusMsg::Heartbeat { .. })));
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Publish(BusMsg::RoleAnnounce { .. }))));
        assert_eq!(inst.role(), Role::Master);
    }

    #[test]
    fn role_query_from_a_slave_is_ignored() {
        let mut inst = Instance::new(1, 2);
        let actions = inst.on_envelope(Instant::now(), &envelope(9, BusMsg::RoleQuery));
        assert!(actions.is_empty());
    }

    #[test]
    fn master_answers_role_query() {
        let mut inst = Instance::new(1, 2);
        inst.state.role = Role::Master;
        inst.state.epoch = 4;
        let actions = inst.on_envelope(Instant::now(), &envelope(9, BusMsg::RoleQuery));
        assert!(matches!(
            actions[0],
            Action::Publish(BusMsg::RoleAnnounce { epoch: 4 })
        ));
    }

    #[test]
    fn slave_applies_state_sync_but_master_ignores_it() {
        let mut inst = Instance::new(1, 2);
        let payload = StateSyncPayload {
            candidates: vec![helix_utils::ibus::CandidateSnapshot {
                gid: Gid(1),
                src: host(1),
                dst: host(2),
                send_rate_bps: 10.0,
            }],
        };
        inst.on_envelope(Instant::now(), &envelope(9, BusMsg::StateSync(payload.clone())));
        assert_eq!(inst.shadow.candidate_count(), 1);

        inst.state.role = Role::Master;
        inst.shadow = ShadowState::new();
        inst.on_envelope(Instant::now(), &envelope(9, BusMsg::StateSync(payload)));
        assert_eq!(inst.shadow.candidate_count(), 0);
    }

    #[test]
    fn inter_area_response_resolves_the_matching_request() {
        let mut inst = Instance::new(1, 2);
        let action = inst.request_inter_area_path(Gid(5), host(1), host(2));
        let Action::Publish(BusMsg::InterAreaReq(req)) = action else {
            panic!("expected InterAreaReq");
        };

        let resp = BusMsg::InterAreaResp(InterAreaResp {
            request_id: req.request_id,
            stitched: None,
        });
        let actions = inst.on_envelope(Instant::now(), &envelope(9, resp));
        assert!(matches!(
            actions[0],
            Action::InterAreaResolved { gid: Gid(5), stitched: None }
        ));
        assert_eq!(inst.pending.outstanding_count(), 0);
    }

    #[test]
    fn self_sent_envelopes_are_ignored() {
        let mut inst = Instance::new(1, 2);
        let actions = inst.on_envelope(Instant::now(), &envelope(2, BusMsg::RoleQuery));
        assert!(actions.is_empty());
    }
}
