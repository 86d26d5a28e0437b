//
// Helix — per-switch stats poll scheduling (§4.D).
//
// Each switch gets its own [`IntervalTask`] that emits a [`PollTick`] on
// a shared channel; the control task (§5) turns each tick into a
// southbound counter request and feeds the reply back into a
// [`crate::collector::StatsCollector`].
//

use std::collections::HashMap;
use std::time::Duration;

use helix_utils::task::IntervalTask;
use helix_utils::Dpid;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Emitted every poll period for a switch the manager is tracking.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PollTick {
    pub switch: Dpid,
}

/// Owns one [`IntervalTask`] per polled switch. Dropping the manager (or
/// removing a switch from it) cancels that switch's timer.
#[derive(Default)]
pub struct StatsPollManager {
    pollers: HashMap<Dpid, IntervalTask>,
    period: Duration,
}

impl StatsPollManager {
    pub fn new(period: Duration) -> Self {
        Self {
            pollers: HashMap::new(),
            period,
        }
    }

    /// Starts polling `switch`, if it is not already being polled.
    pub fn add_switch(&mut self, switch: Dpid, tx: UnboundedSender<PollTick>) {
        self.pollers.entry(switch).or_insert_with(|| {
            IntervalTask::new(self.period, true, move || {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(PollTick { switch });
                }
            })
        });
    }

    /// Stops polling `switch`, cancelling its timer.
    pub fn remove_switch(&mut self, switch: Dpid) {
        self.pollers.remove(&switch);
    }

    pub fn is_polling(&self, switch: Dpid) -> bool {
        self.pollers.contains_key(&switch)
    }

    pub fn polled_switch_count(&self) -> usize {
        self.pollers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn poller_fires_immediately_then_on_each_period() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut manager = StatsPollManager::new(Duration::from_secs(5));
        manager.add_switch(Dpid(1), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.switch, Dpid(1));

        tokio::time::advance(Duration::from_secs(5)).await;
        let second = rx.recv().await.unwrap();
        assert_eq!(second.switch, Dpid(1));
    }

    #[tokio::test]
    async fn removing_a_switch_stops_polling() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut manager = StatsPollManager::new(Duration::from_secs(5));
        manager.add_switch(Dpid(1), tx);
        assert!(manager.is_polling(Dpid(1)));
        manager.remove_switch(Dpid(1));
        assert!(!manager.is_polling(Dpid(1)));
    }
}
