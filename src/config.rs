use std::path::PathBuf;

use clap::Parser;

use crate::error::PairingError;
use crate::pairing::PairingConfig;

/// Airprox encounter finder configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// JSON-lines file of surveillance reports; reads stdin when omitted
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// How long a report stays eligible for pairing, in seconds
    #[arg(long, default_value_t = 13.0)]
    pub window_secs: f64,

    /// Horizontal distance that makes two reports a candidate pair, in NM
    #[arg(long, default_value_t = 10.0)]
    pub distance_nm: f64,

    /// Pairing metric weight on time (per ms)
    #[arg(long, default_value_t = 1.0)]
    pub time_coef: f64,

    /// Pairing metric weight on distance (per ft)
    #[arg(long, default_value_t = 1.0)]
    pub dist_coef: f64,

    /// Drop errant points either side of data outages before smoothing
    #[arg(long, default_value_t = false)]
    pub outage_aware: bool,

    /// Savitzky-Golay smooth altitudes after the standard cleaning stages
    #[arg(long, default_value_t = false)]
    pub smooth_altitudes: bool,

    /// Altitude smoothing resampling step, in seconds
    #[arg(long, default_value_t = 3)]
    pub altitude_step_secs: i64,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    pub fn pairing(&self) -> Result<PairingConfig, PairingError> {
        let window_ms = (self.window_secs * 1_000.0).round() as i64;
        PairingConfig::new(window_ms, self.distance_nm, self.time_coef, self.dist_coef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_pairing() {
        let config = Config::try_parse_from(["airprox"]).unwrap();
        assert!(config.input.is_none());
        assert!(!config.verbose);
        assert!(!config.smooth_altitudes);
        assert_eq!(config.altitude_step_secs, 3);
        assert_eq!(config.pairing().unwrap(), PairingConfig::standard());
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "airprox", "--input", "reports.jsonl", "--window-secs", "20", "--distance-nm", "3", "-v",
        ])
        .unwrap();
        assert_eq!(config.input, Some(PathBuf::from("reports.jsonl")));
        assert!(config.verbose);
        let pairing = config.pairing().unwrap();
        assert_eq!(pairing.time_window_ms(), 20_000);
        assert_eq!(pairing.pairing_distance_nm(), 3.0);
    }

    #[test]
    fn test_invalid_pairing_values_are_rejected() {
        let config = Config::try_parse_from(["airprox", "--window-secs", "0.05"]).unwrap();
        assert_eq!(config.pairing(), Err(PairingError::WindowTooSmall(50)));
    }
}
