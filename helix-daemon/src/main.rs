//
// Helix SDN controller daemon: CLI entry point wiring the
// local-controller, root-controller, and offline snapshot-decode
// subcommands (§6.1).
//

mod cli;
mod lc_config;
mod logging;
mod port_desc;
mod switch_map;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use helix_controller::{ControllerSnapshot, LocalController};
use helix_root::RootService;
use helix_stats::{PollTick, PortCounterSample, StatsPollManager};
use helix_utils::ibus::{Bus, LocalBus};
use helix_utils::Dpid;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use cli::{Cli, Command};

/// §6 exit codes.
const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 1;
#[allow(dead_code)]
const EXIT_BUS_FAILURE: u8 = 2;
#[allow(dead_code)]
const EXIT_INVARIANT_VIOLATION: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    // Abort the process if any task panics, rather than limping along
    // with a half-dead control task (§9: invariant violations are fatal).
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(EXIT_INVARIANT_VIOLATION as i32);
    }));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime");

    let result = runtime.block_on(run(cli.command));
    match result {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(err) => {
            error!(fatal = true, %err, "fatal error");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Local {
            config,
            switch_map,
            area_id,
            instance_id,
        } => run_local(&config, &switch_map, area_id, instance_id).await,
        Command::Root { switch_map } => run_root(&switch_map).await,
        Command::Snapshot { file } => run_snapshot(&file),
    }
}

async fn run_local(
    config_path: &std::path::Path,
    switch_map_path: &std::path::Path,
    area_id: u32,
    instance_id: u32,
) -> Result<()> {
    let config = lc_config::load(config_path)?;
    let map = switch_map::SwitchToControllerMap::load(switch_map_path)?;
    let ctrl_key = format!("c{area_id}");
    let descriptor = map.ctrls.get(&ctrl_key);
    info!(
        area_id,
        instance_id,
        switches = descriptor.map(|d| d.sw.len()).unwrap_or(0),
        hosts = descriptor.map(|d| d.host.len()).unwrap_or(0),
        strategy = ?helix_controller::RecoveryStrategy::resolve(&config.application, config.splice_mode),
        "starting local controller"
    );

    if config.multi_ctrl.start_com {
        let instance = helix_cluster::Instance::new(area_id, instance_id);
        let local_bus = Arc::new(LocalBus::new());
        let bus_rx = local_bus.subscribe(area_id);
        let bus: Arc<dyn Bus> = local_bus;
        tokio::spawn(instance.run(bus, bus_rx));
    }

    let (poll_tx, poll_rx) = mpsc::unbounded_channel();
    let mut poller = StatsPollManager::new(Duration::from_secs_f64(config.stats.interval_secs));
    if config.stats.collect {
        for &sw in descriptor.map(|d| d.sw.as_slice()).unwrap_or_default() {
            poller.add_switch(Dpid(sw), poll_tx.clone());
        }
    }

    let mut controller = LocalController::new(config);
    run_control_loop(&mut controller, poll_rx).await;
    // Keeps the pollers' `IntervalTask`s alive for the lifetime of the
    // control loop; dropping `poller` earlier would cancel every timer.
    drop(poller);
    Ok(())
}

/// Fetches this switch's port counters from the southbound connection.
///
/// Stubbed: this build has no live OpenFlow transport (§1), so every
/// poll tick comes back empty. The poll scheduling and dispatch into
/// the control task around this call are real.
fn fetch_port_counters(switch: Dpid) -> Vec<PortCounterSample> {
    debug!(%switch, "port counter fetch is stubbed, no southbound connection");
    Vec::new()
}

async fn run_root(switch_map_path: &std::path::Path) -> Result<()> {
    let map = switch_map::SwitchToControllerMap::load(switch_map_path)?;
    let catalogue = map.build_catalogue();
    let service = RootService::new(catalogue);
    info!("root controller started");

    let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    term.recv().await;
    info!("root controller shutting down");
    drop(service);
    Ok(())
}

fn run_snapshot(path: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: ControllerSnapshot = serde_json::from_str(&raw)?;
    println!("state: {:?}", snapshot.state);
    for candidate in &snapshot.candidates {
        println!(
            "  {} -> {}: {} bps{}{}",
            candidate.src,
            candidate.dst,
            candidate.send_rate_bps,
            if candidate.no_path { " [no-path]" } else { "" },
            candidate
                .ports
                .as_ref()
                .map(|ports| format!(" ports={ports:?}"))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

/// The daemon's single control task (§5): the only place that ever holds
/// `&mut LocalController`. Every external event — SIGUSR1 (dump
/// snapshot), SIGTERM (orderly shutdown), a stats poll tick, or a TE
/// consolidation-timer fire — is funnelled in here through a channel or
/// `tokio::select!` branch and folded into the controller in turn; none
/// of those events are ever handled by a task that mutates the
/// controller on its own.
async fn run_control_loop(
    controller: &mut LocalController,
    mut poll_rx: mpsc::UnboundedReceiver<PollTick>,
) {
    let mut usr1 = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1())
    {
        Ok(sig) => sig,
        Err(err) => {
            error!(%err, "failed to install SIGUSR1 handler");
            return;
        }
    };
    let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(err) => {
            error!(%err, "failed to install SIGTERM handler");
            return;
        }
    };
    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel();

    loop {
        tokio::select! {
            _ = usr1.recv() => {
                let snapshot = controller.snapshot();
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => eprintln!("{json}"),
                    Err(err) => error!(%err, "failed to serialise snapshot"),
                }
            }
            _ = term.recv() => {
                let ops = controller.installer.reconcile(&[], &[]);
                info!(ops = ops.len(), "orderly shutdown: flows and groups uninstalled");
                break;
            }
            tick = poll_rx.recv() => {
                let Some(tick) = tick else { continue };
                for sample in fetch_port_counters(tick.switch) {
                    if let Some(update) = controller.on_stats_sample(sample, fire_tx.clone()) {
                        debug!(switch = %update.switch, port = %update.port, bps = update.send_rate_bps, "stats sample applied");
                    }
                }
            }
            fire = fire_rx.recv() => {
                let Some(()) = fire else { continue };
                let ops = controller.on_consolidation_fire();
                info!(ops = ops.len(), "consolidation-timer fire resolved by TE pass");
            }
        }
    }
}
