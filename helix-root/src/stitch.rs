//
// Helix — inter-area path stitching (§4.H.2-4).
//
// Root never touches a switch itself; it asks each area's master for the
// hop-count and utilisation of the segment inside its own area and picks
// the inter-area link minimising total hop count, falling back to
// aggregated maximum utilisation on a tie.
//

use helix_utils::ibus::{AreaId, StitchedPath};
use helix_utils::{Dpid, HostId};

use crate::catalogue::Catalogue;

/// The local-area segment measurements a master reports back to root.
#[derive(Clone, Copy, Debug)]
pub struct SegmentInfo {
    pub hops: u32,
    pub max_utilisation: f64,
}

/// Queries an area master for the segment from `host` to/from the
/// boundary switch `boundary`. Returns `None` if the master can't reach
/// it (no candidate/path currently known for that host).
pub type SegmentQuery<'a> = dyn Fn(AreaId, Dpid, HostId) -> Option<SegmentInfo> + 'a;

struct Candidate {
    src_area: AreaId,
    dst_area: AreaId,
    local: SegmentInfo,
    remote: SegmentInfo,
}

impl Candidate {
    fn total_hops(&self) -> u32 {
        self.local.hops + 1 + self.remote.hops
    }

    fn max_utilisation(&self) -> f64 {
        self.local.max_utilisation.max(self.remote.max_utilisation)
    }
}

/// Resolves an inter-area request into a stitched path, per §4.H steps
/// 1-3. Returns `None` if either host's area is unknown, the hosts are
/// already in the same area (not root's concern), or no eligible link
/// has both segments currently reachable.
pub fn resolve(
    catalogue: &Catalogue,
    query: &SegmentQuery<'_>,
    src: HostId,
    dst: HostId,
) -> Option<StitchedPath> {
    let src_area = catalogue.host_area(src)?;
    let dst_area = catalogue.host_area(dst)?;
    if src_area == dst_area {
        return None;
    }

    let candidates: Vec<Candidate> = catalogue
        .links_between(src_area, dst_area)
        .into_iter()
        .filter_map(|link| {
            let local = query(src_area, link.sw_a, src)?;
            let remote = query(dst_area, link.sw_b, dst)?;
            Some(Candidate {
                src_area,
                dst_area,
                local,
                remote,
            })
        })
        .collect();

    let best = candidates.into_iter().min_by(|a, b| {
        a.total_hops()
            .cmp(&b.total_hops())
            .then_with(|| a.max_utilisation().total_cmp(&b.max_utilisation()))
    })?;

    Some(StitchedPath {
        src_area: best.src_area,
        dst_area: best.dst_area,
        src_segment_hops: best.local.hops,
        dst_segment_hops: best.remote.hops,
        max_utilisation: best.max_utilisation(),
    })
}
