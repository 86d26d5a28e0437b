//
// Helix — TE consolidation delay (§4.E, §5 suspension point 2).
//
// Batches near-simultaneous congestion triggers into one optimisation
// pass: the first trigger after the timer is idle schedules a fire at
// `now + delta`; triggers that arrive while a fire is already pending are
// absorbed. The control task clears the timer once it has reacted to the
// fire, re-arming it for the next round of triggers.
//

use std::time::Duration;

use helix_utils::task::TimeoutTask;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
pub struct ConsolidationTimer {
    pending: Option<TimeoutTask>,
}

impl ConsolidationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a congestion trigger. If a fire is already scheduled,
    /// this trigger is absorbed into it; otherwise a new one-shot timer
    /// is armed for `delta` from now.
    pub fn trigger(&mut self, delta: Duration, fire_tx: UnboundedSender<()>) {
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(TimeoutTask::new(delta, move || {
            let fire_tx = fire_tx.clone();
            async move {
                let _ = fire_tx.send(());
            }
        }));
    }

    /// Called by the control task once it has run the optimisation pass
    /// in response to a fire, so the next trigger arms a fresh timer.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_trigger_within_window_does_not_reschedule() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut timer = ConsolidationTimer::new();
        timer.trigger(Duration::from_millis(1_000), tx.clone());
        assert!(timer.is_pending());

        tokio::time::advance(Duration::from_millis(500)).await;
        // A second trigger inside the window is absorbed, not rescheduled.
        timer.trigger(Duration::from_millis(1_000), tx);

        tokio::time::advance(Duration::from_millis(600)).await;
        rx.recv().await.unwrap();

        timer.clear();
        assert!(!timer.is_pending());
    }
}
