//
// Helix — the root controller's inter-area link catalogue (§4.H).
//
// Owns, for each ordered pair of areas, the set of physical links
// crossing them, plus a host-to-area lookup so a request can be routed
// to the right pair of area masters.
//

use std::collections::HashMap;

use helix_utils::ibus::AreaId;
use helix_utils::{Dpid, HostId, PortNo};
use serde::{Deserialize, Serialize};

/// A physical link between a switch in `area_a` and a switch in
/// `area_b`. Links are undirected; [`Catalogue::links_between`]
/// normalises the orientation for the caller.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct InterAreaLink {
    pub area_a: AreaId,
    pub sw_a: Dpid,
    pub port_a: PortNo,
    pub area_b: AreaId,
    pub sw_b: Dpid,
    pub port_b: PortNo,
}

#[derive(Debug, Default)]
pub struct Catalogue {
    links: Vec<InterAreaLink>,
    host_area: HashMap<HostId, AreaId>,
}

impl Catalogue {
    pub fn new() -> Self {
        Catalogue::default()
    }

    pub fn add_link(&mut self, link: InterAreaLink) {
        self.links.push(link);
    }

    pub fn host_discovered(&mut self, host: HostId, area: AreaId) {
        self.host_area.insert(host, area);
    }

    pub fn host_area(&self, host: HostId) -> Option<AreaId> {
        self.host_area.get(&host).copied()
    }

    /// The links eligible to cross from `src_area` to `dst_area`,
    /// oriented so `sw_a`/`port_a` always sit in `src_area`.
    pub fn links_between(&self, src_area: AreaId, dst_area: AreaId) -> Vec<InterAreaLink> {
        self.links
            .iter()
            .filter_map(|link| {
                if link.area_a == src_area && link.area_b == dst_area {
                    Some(*link)
                } else if link.area_a == dst_area && link.area_b == src_area {
                    Some(InterAreaLink {
                        area_a: link.area_b,
                        sw_a: link.sw_b,
                        port_a: link.port_b,
                        area_b: link.area_a,
                        sw_b: link.sw_a,
                        port_b: link.port_a,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
