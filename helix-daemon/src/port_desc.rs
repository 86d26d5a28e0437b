//
// Helix — the static port-description CSV (§6).
//
// Header line `dpid,port,speed`; `speed` is bits-per-second. Entries
// here override the nominal OpenFlow port-desc capacity for a
// (dpid,port); a (dpid,port) absent from the file keeps the nominal
// value the southbound layer already reported.
//

use std::path::Path;

use anyhow::{Context, Result};
use helix_utils::{Dpid, PortNo};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Record {
    dpid: u64,
    port: u32,
    speed: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct PortDesc {
    pub dpid: Dpid,
    pub port: PortNo,
    pub speed_bps: u64,
}

pub fn load(path: &Path) -> Result<Vec<PortDesc>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to read port-description CSV {}", path.display()))?;

    let mut descs = Vec::new();
    for result in reader.deserialize() {
        let record: Record = result.context("malformed port-description row")?;
        descs.push(PortDesc {
            dpid: Dpid(record.dpid),
            port: PortNo(record.port),
            speed_bps: record.speed,
        });
    }
    Ok(descs)
}
