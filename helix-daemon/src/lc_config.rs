//
// Helix — loads the local-controller key/value block configuration
// (§6) with the `ini` crate, the way `holo-daemon::config` loads its
// TOML with the `toml` crate: a different concrete grammar, same role.
//

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use helix_controller::{LocalControllerConfig, SpliceMode};
use ini::Ini;

fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section)).and_then(|props| props.get(key))
}

fn parse_or<T: FromStr>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T> {
    match get(ini, section, key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("[{section}] {key}: invalid value {raw:?}")),
        None => Ok(default),
    }
}

/// Loads and validates the local-controller configuration file. A
/// missing key falls back to [`LocalControllerConfig::default`]'s value
/// for that field; an invalid value or a failed validation is a
/// configuration error, which §7 treats as fatal at startup.
pub fn load(path: &Path) -> Result<LocalControllerConfig> {
    let ini = Ini::load_from_file(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let defaults = LocalControllerConfig::default();

    let config = LocalControllerConfig {
        application: helix_controller::ApplicationConfig {
            optimise_protection: parse_or(
                &ini,
                "application",
                "optimise_protection",
                defaults.application.optimise_protection,
            )?,
            static_port_desc: get(&ini, "application", "static_port_desc")
                .map(String::from)
                .or(defaults.application.static_port_desc),
        },
        stats: helix_controller::StatsConfig {
            collect: parse_or(&ini, "stats", "collect", defaults.stats.collect)?,
            collect_port: parse_or(
                &ini,
                "stats",
                "collect_port",
                defaults.stats.collect_port,
            )?,
            interval_secs: parse_or(&ini, "stats", "interval", defaults.stats.interval_secs)?,
            out_port: parse_or(&ini, "stats", "out_port", defaults.stats.out_port)?,
        },
        multi_ctrl: helix_controller::MultiCtrlConfig {
            start_com: parse_or(
                &ini,
                "multi_ctrl",
                "start_com",
                defaults.multi_ctrl.start_com,
            )?,
            domain_id: parse_or(
                &ini,
                "multi_ctrl",
                "domain_id",
                defaults.multi_ctrl.domain_id,
            )?,
        },
        te: helix_controller::TeSectionConfig {
            utilisation_threshold: parse_or(
                &ini,
                "te",
                "utilisation_threshold",
                defaults.te.utilisation_threshold,
            )?,
            consolidate_time_secs: parse_or(
                &ini,
                "te",
                "consolidate_time",
                defaults.te.consolidate_time_secs,
            )?,
            opti_method: parse_or(&ini, "te", "opti_method", defaults.te.opti_method)?,
            candidate_sort_rev: parse_or(
                &ini,
                "te",
                "candidate_sort_rev",
                defaults.te.candidate_sort_rev,
            )?,
            pot_path_sort_rev: parse_or(
                &ini,
                "te",
                "pot_path_sort_rev",
                defaults.te.pot_path_sort_rev,
            )?,
            partial_accept: parse_or(
                &ini,
                "te",
                "partial_accept",
                defaults.te.partial_accept,
            )?,
        },
        splice_mode: parse_or(&ini, "application", "splice_mode", SpliceMode::Strict)?,
    };

    config.validate().context("configuration error")?;
    Ok(config)
}
