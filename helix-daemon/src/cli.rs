//
// Helix — command-line interface (§6.1 ambient interface additions).
//

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "helixd", version, about = "Helix SDN controller daemon")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON instead of the default text format.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one local-controller instance.
    Local {
        /// Local-controller key/value block configuration file.
        #[arg(short, long)]
        config: PathBuf,
        /// Switch-to-controller JSON map.
        #[arg(long)]
        switch_map: PathBuf,
        /// This instance's (area_id, instance_id).
        #[arg(long)]
        area_id: u32,
        #[arg(long)]
        instance_id: u32,
    },
    /// Run a root controller.
    Root {
        /// Switch-to-controller JSON map (for the inter-area catalogue).
        #[arg(long)]
        switch_map: PathBuf,
    },
    /// Offline-decode a SIGUSR1 snapshot dump for tooling.
    Snapshot {
        /// Path to a JSON-serialised `ControllerSnapshot`.
        file: PathBuf,
    },
}
