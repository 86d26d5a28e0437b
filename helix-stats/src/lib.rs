//
// Helix — stats collector (§4.D).
//
// Polls per-switch port counters on a timer, smooths the resulting send
// rate with an EWMA, and detects counter resets so a rebooted switch
// doesn't look like a traffic cliff.
//
// SPDX-License-Identifier: MIT
//

pub mod collector;
pub mod poller;

pub use collector::{PortCounterSample, StatsCollector, StatsUpdate, EWMA_ALPHA};
pub use poller::{PollTick, StatsPollManager};
