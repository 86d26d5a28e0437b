//
// Helix — per-port statistics collection with EWMA smoothing and
// counter-reset detection (§4.D).
//

use std::collections::HashMap;

use helix_utils::{Dpid, PortNo};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smoothing factor for the exponentially-weighted moving average.
/// Fixed at 0.5 per §4.D: new samples and history are weighted equally,
/// damping jitter without lagging behind a real traffic shift by more
/// than a couple of poll intervals.
pub const EWMA_ALPHA: f64 = 0.5;

/// One raw counter poll result from a switch, as reported by the
/// southbound layer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PortCounterSample {
    pub switch: Dpid,
    pub port: PortNo,
    pub tx_bytes: u64,
    pub interval_secs: f64,
}

/// A smoothed send-rate update, ready to be folded into the topology's
/// per-port utilisation (§4.A).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct StatsUpdate {
    pub switch: Dpid,
    pub port: PortNo,
    pub send_rate_bps: u64,
}

/// Tracks, per (switch, port), the last raw counter value and the
/// current EWMA of the send rate.
#[derive(Debug, Default)]
pub struct StatsCollector {
    last_counter: HashMap<(Dpid, PortNo), u64>,
    ewma_bps: HashMap<(Dpid, PortNo), f64>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in one poll sample. Returns `None` for the first sample of a
    /// port (no prior counter to diff against) and whenever a counter
    /// reset is detected (the switch's byte counter went backwards,
    /// almost always a port reset or a switch reboot) — in both cases the
    /// EWMA state for that port is (re)started fresh on the next sample
    /// rather than producing a bogus negative-rate or cliff reading.
    pub fn observe(&mut self, sample: PortCounterSample) -> Option<StatsUpdate> {
        let key = (sample.switch, sample.port);
        let prev_counter = self.last_counter.insert(key, sample.tx_bytes);

        let Some(prev_counter) = prev_counter else {
            return None;
        };

        if sample.tx_bytes < prev_counter {
            warn!(
                switch = %sample.switch,
                port = %sample.port,
                prev = prev_counter,
                now = sample.tx_bytes,
                "port counter went backwards, treating as reset"
            );
            self.ewma_bps.remove(&key);
            return None;
        }

        let delta_bytes = sample.tx_bytes - prev_counter;
        let interval = sample.interval_secs.max(f64::EPSILON);
        let instantaneous_bps = (delta_bytes as f64 * 8.0) / interval;

        let smoothed = match self.ewma_bps.get(&key) {
            Some(&prev_ewma) => {
                EWMA_ALPHA * instantaneous_bps + (1.0 - EWMA_ALPHA) * prev_ewma
            }
            None => instantaneous_bps,
        };
        self.ewma_bps.insert(key, smoothed);

        Some(StatsUpdate {
            switch: sample.switch,
            port: sample.port,
            send_rate_bps: smoothed.round() as u64,
        })
    }

    pub fn current_rate(&self, switch: Dpid, port: PortNo) -> Option<u64> {
        self.ewma_bps.get(&(switch, port)).map(|r| r.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tx_bytes: u64, interval_secs: f64) -> PortCounterSample {
        PortCounterSample {
            switch: Dpid(1),
            port: PortNo(1),
            tx_bytes,
            interval_secs,
        }
    }

    #[test]
    fn first_sample_yields_no_update() {
        let mut collector = StatsCollector::new();
        assert!(collector.observe(sample(1_000, 1.0)).is_none());
    }

    #[test]
    fn second_sample_computes_instantaneous_rate_as_first_ewma_value() {
        let mut collector = StatsCollector::new();
        collector.observe(sample(0, 1.0));
        let update = collector.observe(sample(125_000, 1.0)).unwrap();
        // 125_000 bytes/s * 8 = 1_000_000 bps.
        assert_eq!(update.send_rate_bps, 1_000_000);
    }

    #[test]
    fn third_sample_smooths_towards_new_rate_at_alpha_half() {
        let mut collector = StatsCollector::new();
        collector.observe(sample(0, 1.0));
        collector.observe(sample(125_000, 1.0)); // ewma = 1_000_000 bps
        let update = collector.observe(sample(250_000, 1.0)).unwrap();
        // instantaneous = 1_000_000 bps, ewma = 0.5*1_000_000 + 0.5*1_000_000
        assert_eq!(update.send_rate_bps, 1_000_000);

        let update = collector.observe(sample(250_000 + 250_000, 1.0)).unwrap();
        // instantaneous = 2_000_000 bps, ewma = 0.5*2_000_000 + 0.5*1_000_000 = 1_500_000
        assert_eq!(update.send_rate_bps, 1_500_000);
    }

    #[test]
    fn counter_reset_is_detected_and_restarts_baseline() {
        let mut collector = StatsCollector::new();
        collector.observe(sample(10_000, 1.0));
        collector.observe(sample(20_000, 1.0));
        // Switch rebooted, counter dropped back to a small value.
        assert!(collector.observe(sample(500, 1.0)).is_none());
        // Next sample establishes a fresh baseline rate.
        let update = collector.observe(sample(1_000, 1.0)).unwrap();
        assert_eq!(update.send_rate_bps, 4_000); // (500 bytes * 8) / 1.0s
    }
}
