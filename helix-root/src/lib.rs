//
// Helix — the root controller (§4.H): the inter-area link catalogue and
// path-stitching logic. Root is purely advisory over the bus and holds
// no switch connections of its own.
//
// SPDX-License-Identifier: MIT
//

pub mod catalogue;
pub mod service;
pub mod stitch;

pub use catalogue::{Catalogue, InterAreaLink};
pub use service::RootService;
pub use stitch::{resolve, SegmentInfo, SegmentQuery};
