//
// Helix — directed multigraph of switches and hosts (§3, §4.A).
//

use std::collections::HashMap;

use helix_utils::{Dpid, HostId, PortNo};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::TopologyError;

/// A switch port: one half of a physical link once `peer` is set.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct PortDesc {
    pub port: PortNo,
    pub peer: Option<(Dpid, PortNo)>,
    pub admin_up: bool,
    /// Nominal capacity in bits-per-second, from the port-desc CSV or
    /// OpenFlow port-desc (§6).
    pub capacity_bps: u64,
    /// Rolling send-rate estimate in bits-per-second, maintained by the
    /// stats collector (§4.D).
    pub send_rate_bps: f64,
    /// Whether the link is currently usable. A link reported down is
    /// marked inactive rather than removed, so it can be reactivated on
    /// recovery without losing its capacity/peer information (§4.A).
    pub active: bool,
}

impl PortDesc {
    fn new(port: PortNo, capacity_bps: u64) -> Self {
        PortDesc {
            port,
            peer: None,
            admin_up: true,
            capacity_bps,
            send_rate_bps: 0.0,
            active: true,
        }
    }

    /// Projected edge usage as a fraction of capacity.
    pub fn utilisation(&self) -> f64 {
        if self.capacity_bps == 0 {
            return 1.0;
        }
        self.send_rate_bps / self.capacity_bps as f64
    }
}

#[derive(Debug, Default)]
pub struct Switch {
    pub dpid: Dpid,
    pub ports: HashMap<PortNo, PortDesc>,
}

#[derive(Debug)]
pub struct HostEntry {
    pub id: HostId,
    /// First-hop attachment point, if discovered.
    pub attached: Option<(Dpid, PortNo)>,
}

/// A directed edge derived from a pair of linked ports (§3 "Edge").
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub from: Dpid,
    pub from_port: PortNo,
    pub to: Dpid,
    pub to_port: PortNo,
    pub capacity_bps: u64,
    pub usage_bps: f64,
    pub active: bool,
}

impl Edge {
    pub fn utilisation(&self) -> f64 {
        if self.capacity_bps == 0 {
            return 1.0;
        }
        self.usage_bps / self.capacity_bps as f64
    }
}

/// Topology-change events emitted on mutation, consumed by the path
/// engine, protection installer, and local controller (§4.A).
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub enum TopologyChange {
    LinkUp(Dpid, PortNo, Dpid, PortNo),
    LinkDown(Dpid, PortNo, Dpid, PortNo),
    LinkAdded(Dpid, PortNo, Dpid, PortNo),
    LinkRemoved(Dpid, PortNo, Dpid, PortNo),
    HostDiscovered(HostId, Dpid, PortNo),
    HostRemoved(HostId),
    PortUsageUpdated(Dpid, PortNo),
}

pub type TopologyEvent = TopologyChange;

/// The controller's authoritative view of its area's data-plane topology.
#[derive(Debug, Default)]
pub struct Topology {
    switches: HashMap<Dpid, Switch>,
    hosts: HashMap<HostId, HostEntry>,
    events_tx: Option<UnboundedSender<TopologyChange>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel that receives every topology-change event from
    /// this point forward.
    pub fn subscribe(&mut self, tx: UnboundedSender<TopologyChange>) {
        self.events_tx = Some(tx);
    }

    fn emit(&self, event: TopologyChange) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event);
        }
    }

    fn switch_mut(&mut self, dpid: Dpid) -> &mut Switch {
        self.switches.entry(dpid).or_insert_with(|| Switch {
            dpid,
            ports: HashMap::new(),
        })
    }

    /// Adds a bidirectional link between two switch ports, deriving two
    /// independent directed edges (§3 "Edge").
    pub fn add_link(
        &mut self,
        u: Dpid,
        p_u: PortNo,
        v: Dpid,
        p_v: PortNo,
        cap_bps: u64,
    ) {
        {
            let su = self.switch_mut(u);
            let desc = su
                .ports
                .entry(p_u)
                .or_insert_with(|| PortDesc::new(p_u, cap_bps));
            desc.capacity_bps = cap_bps;
            desc.peer = Some((v, p_v));
            desc.active = true;
        }
        {
            let sv = self.switch_mut(v);
            let desc = sv
                .ports
                .entry(p_v)
                .or_insert_with(|| PortDesc::new(p_v, cap_bps));
            desc.capacity_bps = cap_bps;
            desc.peer = Some((u, p_u));
            desc.active = true;
        }
        self.emit(TopologyChange::LinkAdded(u, p_u, v, p_v));
    }

    /// Permanently removes a link (e.g. decommissioned hardware), as
    /// opposed to a transient failure (see [`Topology::set_link_active`]).
    pub fn remove_link(&mut self, u: Dpid, p_u: PortNo, v: Dpid, p_v: PortNo) {
        if let Some(sw) = self.switches.get_mut(&u) {
            sw.ports.remove(&p_u);
        }
        if let Some(sw) = self.switches.get_mut(&v) {
            sw.ports.remove(&p_v);
        }
        self.emit(TopologyChange::LinkRemoved(u, p_u, v, p_v));
    }

    /// Marks a link up or down without discarding its port descriptors, so
    /// it can be revived by [`Topology::set_link_active`] again without
    /// re-running `add_link` (§4.A: "append-only in failure mode").
    pub fn set_link_active(
        &mut self,
        u: Dpid,
        p_u: PortNo,
        active: bool,
    ) -> Result<(), TopologyError> {
        let peer = {
            let su = self
                .switches
                .get_mut(&u)
                .ok_or(TopologyError::SwitchNotFound(u))?;
            let desc = su
                .ports
                .get_mut(&p_u)
                .ok_or(TopologyError::PortNotFound(u, p_u))?;
            desc.active = active;
            desc.peer
        };

        if let Some((v, p_v)) = peer {
            if let Some(sv) = self.switches.get_mut(&v) {
                if let Some(desc) = sv.ports.get_mut(&p_v) {
                    if desc.peer != Some((u, p_u)) {
                        return Err(TopologyError::Inconsistency {
                            a: u,
                            ap: p_u,
                            b: v,
                            bp: p_v,
                        });
                    }
                    desc.active = active;
                }
            }
            let event = if active {
                TopologyChange::LinkUp(u, p_u, v, p_v)
            } else {
                TopologyChange::LinkDown(u, p_u, v, p_v)
            };
            self.emit(event);
        }
        Ok(())
    }

    /// Updates a port's rolling send-rate estimate (§4.D publishes these).
    pub fn set_port_usage(
        &mut self,
        dpid: Dpid,
        port: PortNo,
        bps: f64,
    ) -> Result<(), TopologyError> {
        let sw = self
            .switches
            .get_mut(&dpid)
            .ok_or(TopologyError::SwitchNotFound(dpid))?;
        let desc = sw
            .ports
            .get_mut(&port)
            .ok_or(TopologyError::PortNotFound(dpid, port))?;
        desc.send_rate_bps = bps;
        self.emit(TopologyChange::PortUsageUpdated(dpid, port));
        Ok(())
    }

    /// Records that a host was discovered attached to a switch port.
    pub fn host_discovered(&mut self, host: HostId, dpid: Dpid, port: PortNo) {
        self.hosts.insert(
            host,
            HostEntry {
                id: host,
                attached: Some((dpid, port)),
            },
        );
        self.emit(TopologyChange::HostDiscovered(host, dpid, port));
    }

    pub fn host_removed(&mut self, host: HostId) {
        self.hosts.remove(&host);
        self.emit(TopologyChange::HostRemoved(host));
    }

    pub fn host(&self, host: HostId) -> Option<&HostEntry> {
        self.hosts.get(&host)
    }

    pub fn switch(&self, dpid: Dpid) -> Option<&Switch> {
        self.switches.get(&dpid)
    }

    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    /// Active neighbour DPIDs reachable in one hop from `dpid` — O(deg).
    pub fn neighbours(&self, dpid: Dpid) -> Vec<Dpid> {
        match self.switches.get(&dpid) {
            Some(sw) => sw
                .ports
                .values()
                .filter(|p| p.active && p.admin_up)
                .filter_map(|p| p.peer.map(|(peer, _)| peer))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The directed edge that a switch port participates in, if linked —
    /// O(deg).
    pub fn edge(&self, dpid: Dpid, port: PortNo) -> Option<Edge> {
        let desc = self.switches.get(&dpid)?.ports.get(&port)?;
        let (peer, _peer_port) = desc.peer?;
        Some(Edge {
            from: dpid,
            from_port: port,
            to: peer,
            to_port: _peer_port,
            capacity_bps: desc.capacity_bps,
            usage_bps: desc.send_rate_bps,
            active: desc.active && desc.admin_up,
        })
    }

    /// All active outgoing edges from a switch — O(deg).
    pub fn edges_from(&self, dpid: Dpid) -> Vec<Edge> {
        match self.switches.get(&dpid) {
            Some(sw) => sw
                .ports
                .keys()
                .filter_map(|port| self.edge(dpid, *port))
                .filter(|e| e.active)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Finds the edge directly connecting two switches, if one exists and
    /// is active.
    pub fn edge_between(&self, a: Dpid, b: Dpid) -> Option<Edge> {
        self.edges_from(a).into_iter().find(|e| e.to == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dpid(n: u64) -> Dpid {
        Dpid(n)
    }
    fn port(n: u32) -> PortNo {
        PortNo(n)
    }

    #[test]
    fn add_link_creates_reciprocal_edges() {
        let mut topo = Topology::new();
        topo.add_link(dpid(1), port(1), dpid(2), port(1), 1_000_000_000);

        let e1 = topo.edge(dpid(1), port(1)).unwrap();
        assert_eq!(e1.to, dpid(2));
        let e2 = topo.edge(dpid(2), port(1)).unwrap();
        assert_eq!(e2.to, dpid(1));
    }

    #[test]
    fn link_down_deactivates_both_directions() {
        let mut topo = Topology::new();
        topo.add_link(dpid(1), port(1), dpid(2), port(1), 1_000_000_000);
        topo.set_link_active(dpid(1), port(1), false).unwrap();

        assert!(!topo.edge(dpid(1), port(1)).unwrap().active);
        assert!(!topo.edge(dpid(2), port(1)).unwrap().active);
        assert!(topo.neighbours(dpid(1)).is_empty());
    }

    #[test]
    fn link_reactivates_after_recovery() {
        let mut topo = Topology::new();
        topo.add_link(dpid(1), port(1), dpid(2), port(1), 1_000_000_000);
        topo.set_link_active(dpid(1), port(1), false).unwrap();
        topo.set_link_active(dpid(1), port(1), true).unwrap();

        assert!(topo.edge(dpid(1), port(1)).unwrap().active);
        assert_eq!(topo.neighbours(dpid(1)), vec![dpid(2)]);
    }

    #[test]
    fn set_port_usage_updates_utilisation() {
        let mut topo = Topology::new();
        topo.add_link(dpid(1), port(1), dpid(2), port(1), 100_000_000);
        topo.set_port_usage(dpid(1), port(1), 90_000_000.0).unwrap();

        let e = topo.edge(dpid(1), port(1)).unwrap();
        assert!((e.utilisation() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn set_port_usage_on_missing_switch_errors() {
        let mut topo = Topology::new();
        let err = topo.set_port_usage(dpid(9), port(1), 1.0).unwrap_err();
        assert!(matches!(err, TopologyError::SwitchNotFound(_)));
    }
}
