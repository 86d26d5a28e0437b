//
// Helix — the switch-to-controller map (§6, JSON).
//
// Keys are dotted, following the README convention cited in §6:
// `root.<rid>`, `ctrl.<cid>`, and within a controller descriptor,
// `dom.<neighbour_cid>` for its inter-area link list. Used by `root` to
// build the [`helix_root::Catalogue`] and by `local` to learn which
// switches/hosts belong to its own area.
//

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use helix_root::{Catalogue, InterAreaLink};
use helix_utils::{Dpid, PortNo};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InterAreaLinkDesc {
    pub sw: u64,
    pub port: u32,
    pub sw_to: u64,
    pub port_to: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CtrlDescriptor {
    #[serde(default)]
    pub sw: Vec<u64>,
    #[serde(default)]
    pub host: Vec<String>,
    #[serde(default)]
    pub extra_instances: Vec<u32>,
    #[serde(default)]
    pub dom: HashMap<String, Vec<InterAreaLinkDesc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RootDescriptor {}

#[derive(Debug, Default)]
pub struct SwitchToControllerMap {
    pub roots: HashMap<String, RootDescriptor>,
    pub ctrls: HashMap<String, CtrlDescriptor>,
}

impl SwitchToControllerMap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read switch-to-controller map {}", path.display()))?;
        let entries: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid switch-to-controller map {}", path.display()))?;

        let mut map = SwitchToControllerMap::default();
        for (key, value) in entries {
            if let Some(rid) = key.strip_prefix("root.") {
                let descriptor: RootDescriptor = serde_json::from_value(value)
                    .with_context(|| format!("invalid root.{rid} descriptor"))?;
                map.roots.insert(rid.to_string(), descriptor);
            } else if let Some(cid) = key.strip_prefix("ctrl.") {
                let descriptor: CtrlDescriptor = serde_json::from_value(value)
                    .with_context(|| format!("invalid ctrl.{cid} descriptor"))?;
                map.ctrls.insert(cid.to_string(), descriptor);
            }
        }
        Ok(map)
    }

    /// Builds the root controller's inter-area link catalogue (§4.H) by
    /// flattening every `ctrl.<cid>.dom.<neighbour_cid>` entry.
    pub fn build_catalogue(&self) -> Catalogue {
        let mut catalogue = Catalogue::new();
        for (cid, ctrl) in &self.ctrls {
            let Some(area_id) = area_id_of(cid) else {
                continue;
            };
            for (neighbour_cid, links) in &ctrl.dom {
                let Some(neighbour_area_id) = area_id_of(neighbour_cid) else {
                    continue;
                };
                for link in links {
                    catalogue.add_link(InterAreaLink {
                        area_a: area_id,
                        sw_a: Dpid(link.sw),
                        port_a: PortNo(link.port),
                        area_b: neighbour_area_id,
                        sw_b: Dpid(link.sw_to),
                        port_b: PortNo(link.port_to),
                    });
                }
            }
        }
        catalogue
    }
}

/// Controller ids in the map are opaque strings (`c1`, `c2`, ...); the
/// bus's `AreaId` is a `u32`, so area ids are derived from the numeric
/// suffix of the controller id.
fn area_id_of(cid: &str) -> Option<u32> {
    cid.trim_start_matches(|c: char| !c.is_ascii_digit()).parse().ok()
}
