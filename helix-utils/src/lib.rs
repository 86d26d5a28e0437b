//
// Helix — shared types and utilities used across every controller crate.
//
// SPDX-License-Identifier: MIT
//

pub mod ibus;
pub mod ids;
pub mod task;
pub mod timeline;

pub use ids::{Dpid, Gid, HostId, MacAddr, PortNo};
