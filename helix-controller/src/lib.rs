//
// Helix — local controller (§4.F): the state machine wiring the
// topology graph, path engine, protection installer, stats collector and
// TE engine together.
//
// SPDX-License-Identifier: MIT
//

pub mod candidate;
pub mod config;
pub mod controller;
pub mod fsm;
pub mod snapshot;
pub mod strategy;

pub use candidate::Candidate;
pub use config::{ApplicationConfig, LocalControllerConfig, MultiCtrlConfig, SpliceMode, StatsConfig, TeSectionConfig};
pub use controller::LocalController;
pub use fsm::{transition, ControllerState, FsmEvent};
pub use snapshot::{build_snapshot, CandidateSnapshot, ControllerSnapshot};
pub use strategy::RecoveryStrategy;
