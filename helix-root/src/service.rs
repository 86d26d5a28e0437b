//
// Helix — the root controller's bus-facing service (§4.H).
//
// Root holds no switch connections; it reacts to INTER_AREA_REQ with an
// INTER_AREA_RESP, consulting the catalogue and whatever segment
// information the area masters currently report.
//

use helix_utils::ibus::{InterAreaReq, InterAreaResp};
use tracing::info;

use crate::catalogue::Catalogue;
use crate::stitch::{resolve, SegmentQuery};

pub struct RootService {
    pub catalogue: Catalogue,
}

impl RootService {
    pub fn new(catalogue: Catalogue) -> Self {
        RootService { catalogue }
    }

    /// Handles one INTER_AREA_REQ, returning the response to publish
    /// back to both area masters.
    pub fn handle_request(&self, req: &InterAreaReq, query: &SegmentQuery<'_>) -> InterAreaResp {
        let stitched = resolve(&self.catalogue, query, req.src, req.dst);
        if stitched.is_none() {
            info!(request_id = req.request_id, "no stitched inter-area path found");
        }
        InterAreaResp {
            request_id: req.request_id,
            stitched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::InterAreaLink;
    use crate::stitch::SegmentInfo;
    use helix_utils::ibus::AreaId;
    use helix_utils::{Dpid, HostId, MacAddr, PortNo};
    use std::net::Ipv4Addr;

    fn host(n: u8) -> HostId {
        HostId {
            mac: MacAddr([0, 0, 0, 0, 0, n]),
            ip: Ipv4Addr::new(10, 0, 0, n.into()),
        }
    }

    #[test]
    fn handle_request_round_trips_the_request_id() {
        let mut cat = Catalogue::new();
        cat.add_link(InterAreaLink {
            area_a: 1,
            sw_a: Dpid(1),
            port_a: PortNo(1),
            area_b: 2,
            sw_b: Dpid(2),
            port_b: PortNo(1),
        });
        cat.host_discovered(host(1), 1);
        cat.host_discovered(host(2), 2);
        let service = RootService::new(cat);

        let query = |_area: AreaId, _boundary: Dpid, _host: HostId| {
            Some(SegmentInfo { hops: 1, max_utilisation: 0.1 })
        };
        let req = InterAreaReq {
            request_id: 42,
            src: host(1),
            dst: host(2),
        };
        let resp = service.handle_request(&req, &query);
        assert_eq!(resp.request_id, 42);
        assert!(resp.stitched.is_some());
    }
}
