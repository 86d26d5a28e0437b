//
// Helix — the inter-controller bus (§4.G, §5).
//
// The bus carries four message kinds between instances of a cluster and,
// for inter-area requests, up to the root controller. The transport is
// left pluggable (a real deployment might use a message queue or gRPC
// streaming) behind the [`Bus`] trait; [`LocalBus`] is an in-process
// fan-out implementation suitable for a single test process hosting
// several simulated instances, mirroring the teacher's
// `#[cfg(feature = "testing")]` in-process substitution for network tasks.
//

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::ids::{Gid, HostId};

pub type AreaId = u32;
pub type InstanceId = u32;

/// A bus message, carrying monotone per-sender sequence numbers so the
/// transport can guarantee in-order, at-least-once delivery (§5).
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct BusEnvelope {
    pub area_id: AreaId,
    pub sender: InstanceId,
    pub seqno: u64,
    pub payload: BusMsg,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub enum BusMsg {
    /// Sent every second by every live instance (§4.G.1).
    Heartbeat { epoch: u64 },
    /// Leader-election query/response (§4.G.2).
    RoleQuery,
    RoleAnnounce { epoch: u64 },
    /// Master-to-slave candidate/path snapshot push (§4.G.3).
    StateSync(StateSyncPayload),
    /// Forwarded to/from the root controller (§4.G.4, §4.H).
    InterAreaReq(InterAreaReq),
    InterAreaResp(InterAreaResp),
}

#[derive(Clone, Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct StateSyncPayload {
    pub candidates: Vec<CandidateSnapshot>,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct CandidateSnapshot {
    pub gid: Gid,
    pub src: HostId,
    pub dst: HostId,
    pub send_rate_bps: f64,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct InterAreaReq {
    pub request_id: u64,
    pub src: HostId,
    pub dst: HostId,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct InterAreaResp {
    pub request_id: u64,
    pub stitched: Option<StitchedPath>,
}

/// The stitched inter-area path descriptor returned by the root controller
/// (§4.H.4): a local segment in the source area, the inter-area link
/// chosen to cross, and a local segment in the destination area.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct StitchedPath {
    pub src_area: AreaId,
    pub dst_area: AreaId,
    pub src_segment_hops: u32,
    pub dst_segment_hops: u32,
    pub max_utilisation: f64,
}

pub type BusReceiver = UnboundedReceiver<BusEnvelope>;
pub type BusSender = UnboundedSender<BusEnvelope>;

/// A handle instances use to publish to, and subscribe from, the bus of
/// their area.
pub trait Bus: Send + Sync {
    fn publish(&self, area_id: AreaId, sender: InstanceId, msg: BusMsg);
}

/// In-process publish/subscribe bus: every subscribed instance of an area
/// receives every message published to that area, in the order it was
/// published (satisfying the per-sender ordering guarantee of §5 trivially,
/// since there is a single mpsc per subscriber).
#[derive(Clone, Default)]
pub struct LocalBus {
    inner: Arc<Mutex<LocalBusInner>>,
}

#[derive(Default)]
struct LocalBusInner {
    subscribers: HashMap<AreaId, Vec<BusSender>>,
    seqno: HashMap<(AreaId, InstanceId), u64>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a new instance to an area's bus, returning its receiver.
    pub fn subscribe(&self, area_id: AreaId) -> BusReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .lock()
            .unwrap()
            .subscribers
            .entry(area_id)
            .or_default()
            .push(tx);
        rx
    }
}

impl Bus for LocalBus {
    fn publish(&self, area_id: AreaId, sender: InstanceId, msg: BusMsg) {
        let mut inner = self.inner.lock().unwrap();
        let seqno = inner
            .seqno
            .entry((area_id, sender))
            .and_modify(|s| *s += 1)
            .or_insert(1);
        let envelope = BusEnvelope {
            area_id,
            sender,
            seqno: *seqno,
            payload: msg,
        };
        if let Some(subs) = inner.subscribers.get(&area_id) {
            for sub in subs {
                let _ = sub.send(envelope.clone());
            }
        }
    }
}
