//
// Helix — traffic-engineering optimisation engine (§4.E).
//
// Detects link congestion, consolidates near-simultaneous triggers into
// a single pass, orders affected candidates, and runs one of four
// selection strategies to find path changes that reduce maximum link
// usage without oscillating.
//
// SPDX-License-Identifier: MIT
//

pub mod candidates;
pub mod congestion;
pub mod delay;
pub mod pass;
pub mod select;
pub mod usage;

pub use candidates::{affected_candidates, sort_candidates, CandidateInfo};
pub use congestion::{detect_congested_edges, DEFAULT_THRESHOLD};
pub use delay::ConsolidationTimer;
pub use pass::{run_pass, PassResult, PathChange, TeConfig};
pub use select::{select_path, Decision, OptiMethod};
pub use usage::{EdgeKey, LinkUsageTable};
