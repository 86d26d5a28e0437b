//
// Helix — the local controller: wires the topology graph, path engine,
// protection installer, stats collector and TE engine together behind a
// single authoritative state machine (§4.F).
//
// The type here is the "authoritative state" of §5: in the daemon it is
// wrapped in a single control task and mutated only from there. Workers
// (pollers, the bus listener) submit messages; nothing outside this type
// mutates it directly.
//

use std::collections::HashMap;
use std::time::Duration;

use helix_path::BackupPath;
use helix_protection::{compile_groups_and_flows, FlowSpec, GroupSpec, InstallOp, Installer};
use helix_stats::{PortCounterSample, StatsCollector, StatsUpdate};
use helix_te::{run_pass, CandidateInfo, ConsolidationTimer, TeConfig};
use helix_topology::{Topology, TopologyChange};
use helix_utils::{Gid, HostId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::candidate::Candidate;
use crate::config::LocalControllerConfig;
use crate::fsm::{transition, ControllerState, FsmEvent};
use crate::snapshot::{build_snapshot, ControllerSnapshot};
use crate::strategy::RecoveryStrategy;

fn te_config(config: &LocalControllerConfig) -> TeConfig {
    TeConfig {
        threshold: config.te.utilisation_threshold,
        method: config.te.opti_method,
        candidate_sort_rev: config.te.candidate_sort_rev,
        pot_path_sort_rev: config.te.pot_path_sort_rev,
        partial_accept: config.te.partial_accept,
    }
}

pub struct LocalController {
    pub config: LocalControllerConfig,
    pub strategy: RecoveryStrategy,
    pub state: ControllerState,
    pub topo: Topology,
    pub candidates: HashMap<Gid, Candidate>,
    pub installer: Installer,
    pub stats: StatsCollector,
    pub consolidation: ConsolidationTimer,
}

impl LocalController {
    pub fn new(config: LocalControllerConfig) -> Self {
        let strategy = RecoveryStrategy::resolve(&config.application, config.splice_mode);
        LocalController {
            config,
            strategy,
            state: ControllerState::Init,
            topo: Topology::new(),
            candidates: HashMap::new(),
            installer: Installer::new(),
            stats: StatsCollector::new(),
            consolidation: ConsolidationTimer::new(),
        }
    }

    fn apply_fsm(&mut self, event: FsmEvent) {
        if let Some(next) = transition(self.state, event) {
            if next != self.state {
                info!(?self.state, ?next, "controller state transition");
            }
            self.state = next;
        }
    }

    /// Registers a new candidate and computes its initial path.
    pub fn add_candidate(&mut self, src: HostId, dst: HostId) -> (Gid, Vec<InstallOp>) {
        let candidate = Candidate::new(src, dst);
        let gid = candidate.gid;
        self.candidates.insert(gid, candidate);
        (gid, self.recompute_candidate(gid))
    }

    /// Reacts to a topology-change event already applied to `self.topo` by
    /// the caller (the discovery/southbound layer mutates the topology
    /// directly; the controller reacts to what it reports).
    pub fn handle_topology_event(&mut self, event: &TopologyChange) -> Vec<InstallOp> {
        match event {
            TopologyChange::LinkAdded(..) | TopologyChange::LinkUp(..) => {
                self.apply_fsm(FsmEvent::FirstLinkDiscovered);
                self.recompute_affected(None)
            }
            TopologyChange::LinkDown(..) | TopologyChange::LinkRemoved(..) => {
                self.apply_fsm(FsmEvent::LinkDown);
                let ops = self.recompute_affected(None);
                if self.candidates.values().all(|c| !c.no_path) {
                    self.apply_fsm(FsmEvent::AllCandidatesRepathedAndAcked);
                }
                ops
            }
            TopologyChange::HostRemoved(host) => {
                self.candidates.retain(|_, c| c.src != *host && c.dst != *host);
                Vec::new()
            }
            TopologyChange::HostDiscovered(..) | TopologyChange::PortUsageUpdated(..) => {
                Vec::new()
            }
        }
    }

    /// Recomputes every candidate, or only those already `no_path` when
    /// `only_no_path` selects a narrower recompute (§7: "retried on every
    /// topology change").
    fn recompute_affected(&mut self, only: Option<Gid>) -> Vec<InstallOp> {
        let gids: Vec<Gid> = match only {
            Some(gid) => vec![gid],
            None => self.candidates.keys().copied().collect(),
        };
        let mut ops = Vec::new();
        for gid in gids {
            ops.extend(self.recompute_candidate(gid));
        }
        ops
    }

    /// Recomputes one candidate's primary/backup/splices and diffs the
    /// resulting group/flow specs into the installer.
    pub fn recompute_candidate(&mut self, gid: Gid) -> Vec<InstallOp> {
        let Some(candidate) = self.candidates.get(&gid) else {
            return Vec::new();
        };
        let (src, dst) = (candidate.src, candidate.dst);

        match self.strategy.compute_paths(&self.topo, src, dst) {
            Some((primary, backup, splices)) => {
                let candidate = self.candidates.get_mut(&gid).unwrap();
                candidate.primary = primary.clone();
                candidate.backup = backup.clone();
                candidate.splices = splices.clone();
                candidate.no_path = false;

                let (groups, flows): (Vec<GroupSpec>, Vec<FlowSpec>) =
                    compile_groups_and_flows(gid, src, dst, &primary, &backup, &splices);
                self.installer.reconcile(&groups, &flows)
            }
            None => {
                warn!(%gid, "no path found for candidate");
                let candidate = self.candidates.get_mut(&gid).unwrap();
                // Keep the previous path if it is still internally valid;
                // otherwise park in no-path state (§7 "Path-not-found").
                if !helix_path::is_valid(&self.topo, &candidate.primary) {
                    candidate.primary.clear();
                    candidate.backup = BackupPath::None;
                    candidate.splices.clear();
                }
                candidate.no_path = true;
                Vec::new()
            }
        }
    }

    /// Called once a full poll interval has passed with no topology
    /// change (§4.F DISCOVERING -> STABLE).
    pub fn note_quiescent_poll(&mut self) {
        self.apply_fsm(FsmEvent::QuiescentForOnePollInterval);
    }

    /// Folds in one stats sample and, if it pushes a link over the
    /// congestion threshold, arms the consolidation timer.
    pub fn on_stats_sample(
        &mut self,
        sample: PortCounterSample,
        fire_tx: UnboundedSender<()>,
    ) -> Option<StatsUpdate> {
        let update = self.stats.observe(sample)?;
        if let Err(err) = self
            .topo
            .set_port_usage(update.switch, update.port, update.send_rate_bps as f64)
        {
            err.log();
            return Some(update);
        }

        if let Some(edge) = self.topo.edge(update.switch, update.port) {
            if edge.utilisation() > self.config.te.utilisation_threshold {
                self.consolidation.trigger(
                    Duration::from_secs_f64(self.config.te.consolidate_time_secs),
                    fire_tx,
                );
            }
        }
        Some(update)
    }

    /// Runs one TE optimisation pass in response to a consolidation-timer
    /// fire, applying any resulting path changes.
    ///
    /// A TE change is compiled and installed directly from the pass's own
    /// `new_primary` — it must never be routed back through
    /// `recompute_candidate`, which rebuilds the primary from scratch via
    /// `RecoveryStrategy::compute_paths`'s congestion-blind hop-count
    /// weight and would silently recompute the very path TE just moved
    /// the candidate off of.
    pub fn on_consolidation_fire(&mut self) -> Vec<InstallOp> {
        self.consolidation.clear();

        let infos: Vec<CandidateInfo> = self
            .candidates
            .values()
            .map(|c| CandidateInfo {
                gid: c.gid,
                src: c.src,
                dst: c.dst,
                primary: c.primary.clone(),
                send_rate_bps: c.send_rate_bps,
            })
            .collect();
        let backups: HashMap<Gid, helix_path::Path> = self
            .candidates
            .values()
            .filter_map(|c| c.backup.path().map(|p| (c.gid, p.clone())))
            .collect();

        let result = run_pass(&self.topo, &infos, &backups, &te_config(&self.config));
        if result.residual_congestion {
            warn!("TE pass completed with residual congestion");
        }

        let mut ops = Vec::new();
        for change in result.changes {
            ops.extend(self.apply_te_primary(change.gid, change.new_primary));
        }
        ops
    }

    /// Installs a TE-selected primary path for `gid`, leaving its
    /// existing backup/splices untouched (TE only ever re-paths the
    /// primary; the next topology event is what reconciles protection).
    fn apply_te_primary(&mut self, gid: Gid, new_primary: helix_path::Path) -> Vec<InstallOp> {
        let Some(candidate) = self.candidates.get_mut(&gid) else {
            return Vec::new();
        };
        candidate.primary = new_primary;
        candidate.no_path = false;
        let (src, dst) = (candidate.src, candidate.dst);
        let (primary, backup, splices) = (
            candidate.primary.clone(),
            candidate.backup.clone(),
            candidate.splices.clone(),
        );

        let (groups, flows): (Vec<GroupSpec>, Vec<FlowSpec>) =
            compile_groups_and_flows(gid, src, dst, &primary, &backup, &splices);
        self.installer.reconcile(&groups, &flows)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        build_snapshot(self.state, self.candidates.values(), self.config.stats.out_port)
    }
}
