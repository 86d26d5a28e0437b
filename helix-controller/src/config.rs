//
// Helix — local-controller configuration (§6 "key/value blocks").
//
// The textual `[section] key:type=value` format itself is parsed by
// `helix-daemon`; this type is the validated, typed result every other
// component consumes.
//

use std::str::FromStr;

use helix_te::OptiMethod;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpliceMode {
    Strict,
    Loose,
}

impl FromStr for SpliceMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "strict" => Ok(SpliceMode::Strict),
            "loose" => Ok(SpliceMode::Loose),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    pub optimise_protection: bool,
    pub static_port_desc: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            optimise_protection: true,
            static_port_desc: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StatsConfig {
    pub collect: bool,
    pub collect_port: bool,
    pub interval_secs: f64,
    pub out_port: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            collect: true,
            collect_port: true,
            interval_secs: 10.0,
            out_port: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MultiCtrlConfig {
    pub start_com: bool,
    pub domain_id: u32,
}

impl Default for MultiCtrlConfig {
    fn default() -> Self {
        MultiCtrlConfig {
            start_com: true,
            domain_id: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TeSectionConfig {
    pub utilisation_threshold: f64,
    pub consolidate_time_secs: f64,
    pub opti_method: OptiMethod,
    pub candidate_sort_rev: bool,
    pub pot_path_sort_rev: bool,
    pub partial_accept: bool,
}

impl Default for TeSectionConfig {
    fn default() -> Self {
        TeSectionConfig {
            utilisation_threshold: 0.90,
            consolidate_time_secs: 1.0,
            opti_method: OptiMethod::FirstSol,
            candidate_sort_rev: true,
            pot_path_sort_rev: false,
            partial_accept: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LocalControllerConfig {
    pub application: ApplicationConfig,
    pub stats: StatsConfig,
    pub multi_ctrl: MultiCtrlConfig,
    pub te: TeSectionConfig,
    pub splice_mode: SpliceMode,
}

impl Default for SpliceMode {
    fn default() -> Self {
        SpliceMode::Strict
    }
}

/// Configuration error (§7 "Configuration error" — fatal at startup).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("stats interval {0} out of bounds [0.5, 600]")]
    StatsIntervalOutOfBounds(f64),
    #[error("te.consolidate_time {0} must be less than stats.interval {1}")]
    ConsolidateNotLessThanInterval(f64, f64),
    #[error("te.utilisation_threshold {0} out of bounds [0, 1]")]
    ThresholdOutOfBounds(f64),
}

impl LocalControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.5..=600.0).contains(&self.stats.interval_secs) {
            return Err(ConfigError::StatsIntervalOutOfBounds(
                self.stats.interval_secs,
            ));
        }
        if !(0.0..=1.0).contains(&self.te.utilisation_threshold) {
            return Err(ConfigError::ThresholdOutOfBounds(
                self.te.utilisation_threshold,
            ));
        }
        if self.te.consolidate_time_secs >= self.stats.interval_secs {
            return Err(ConfigError::ConsolidateNotLessThanInterval(
                self.te.consolidate_time_secs,
                self.stats.interval_secs,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(LocalControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_bounds_interval_is_rejected() {
        let mut config = LocalControllerConfig::default();
        config.stats.interval_secs = 1000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StatsIntervalOutOfBounds(_))
        ));
    }

    #[test]
    fn consolidate_time_must_stay_below_poll_interval() {
        let mut config = LocalControllerConfig::default();
        config.te.consolidate_time_secs = 10.0;
        config.stats.interval_secs = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConsolidateNotLessThanInterval(_, _))
        ));
    }
}
