//
// Helix — event-timeline records (§6 "Event timeline output format").
//
// `<stage>,<cid>[.<inst>],<ts>,<rts>,<kind>,<info>` where `<ts>` is an
// absolute epoch float, `<rts>` is the delta since the previous event for
// the same instance (0 for the first), and `<kind>` is one of
// {action, event_local, event_ofp}.
//

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum EventKind {
    Action,
    EventLocal,
    EventOfp,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Action => "action",
            EventKind::EventLocal => "event_local",
            EventKind::EventOfp => "event_ofp",
        };
        f.write_str(s)
    }
}

/// One line of the event-timeline output.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct TimelineEvent {
    pub stage: String,
    pub cid: u32,
    pub instance: Option<u32>,
    pub ts: f64,
    pub rts: f64,
    pub kind: EventKind,
    pub info: String,
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            Some(instance) => write!(
                f,
                "{},{}.{},{},{},{},{}",
                self.stage,
                self.cid,
                instance,
                self.ts,
                self.rts,
                self.kind,
                self.info
            ),
            None => write!(
                f,
                "{},{},{},{},{},{}",
                self.stage, self.cid, self.ts, self.rts, self.kind, self.info
            ),
        }
    }
}

/// Tracks the timestamp of the last event emitted per (cid, instance) so
/// that `rts` can be computed incrementally, as required by the format.
#[derive(Debug, Default)]
pub struct TimelineRecorder {
    last_ts: HashMap<(u32, Option<u32>), f64>,
    log: Vec<TimelineEvent>,
}

impl TimelineRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new event, computing `rts` from the previous event for the
    /// same (cid, instance) pair (0 for the first such event).
    pub fn record(
        &mut self,
        stage: impl Into<String>,
        cid: u32,
        instance: Option<u32>,
        ts: f64,
        kind: EventKind,
        info: impl Into<String>,
    ) -> TimelineEvent {
        let key = (cid, instance);
        let rts = match self.last_ts.get(&key) {
            Some(prev) => ts - prev,
            None => 0.0,
        };
        self.last_ts.insert(key, ts);

        let event = TimelineEvent {
            stage: stage.into(),
            cid,
            instance,
            ts,
            rts,
            kind,
            info: info.into(),
        };
        self.log.push(event.clone());
        event
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.log
    }
}
