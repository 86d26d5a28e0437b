//
// Helix — the multi-controller layer (§4.G): leader election, heartbeat
// liveness, shadow-state sync, and inter-area request forwarding between
// instances sharing an area's bus.
//
// SPDX-License-Identifier: MIT
//

pub mod election;
pub mod instance;
pub mod pending;
pub mod sync;

pub use election::{ClusterState, Role, HEARTBEAT_PERIOD, MISSED_HEARTBEAT_LIMIT};
pub use instance::{Action, Instance};
pub use pending::{PendingRequests, REQUEST_TIMEOUT};
pub use sync::ShadowState;
