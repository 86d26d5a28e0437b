//
// Helix — tracing initialisation (§1.1 ambient stack).
//
// A trimmed-down version of `holo-daemon::init_tracing`: Helix's core
// never touches journald, log files, or tokio-console, so only the
// stdout layer (plain or JSON) and an env-filter remain.
//

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub fn init(verbosity: u8, json: bool) {
    let default_level = match verbosity {
        0 => "helix=info",
        1 => "helix=debug",
        _ => "helix=trace",
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.parse().unwrap())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
