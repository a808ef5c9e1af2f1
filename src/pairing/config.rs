// Pairing configuration - how close in space and time two reports must be

use serde::{Deserialize, Serialize};

use super::metric::FlatDistanceMetric;
use crate::constants::FEET_PER_NM;
use crate::error::PairingError;

/// Time slack (ms) folded into the pairing threshold
const THRESHOLD_TIME_MS: f64 = 7_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    time_window_ms: i64,
    pairing_distance_nm: f64,
    time_coef: f64,
    dist_coef: f64,
}

fn check_coefficient(name: &'static str, value: f64) -> Result<(), PairingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PairingError::InvalidCoefficient { name, value })
    }
}

impl PairingConfig {
    /// # Arguments
    /// * `time_window_ms` - How long points remain eligible for pairing; must exceed 100 ms
    /// * `pairing_distance_nm` - Horizontal separation that warrants a closer look
    /// * `time_coef`, `dist_coef` - Metric weights for ms and feet respectively
    pub fn new(
        time_window_ms: i64,
        pairing_distance_nm: f64,
        time_coef: f64,
        dist_coef: f64,
    ) -> Result<Self, PairingError> {
        if time_window_ms <= 100 {
            return Err(PairingError::WindowTooSmall(time_window_ms));
        }
        if !(pairing_distance_nm > 0.0) || !pairing_distance_nm.is_finite() {
            return Err(PairingError::NonPositiveDistance(pairing_distance_nm));
        }
        check_coefficient("time", time_coef)?;
        check_coefficient("distance", dist_coef)?;
        Ok(PairingConfig { time_window_ms, pairing_distance_nm, time_coef, dist_coef })
    }

    /// 13 second window, 10 NM, unit weights
    pub fn standard() -> Self {
        PairingConfig {
            time_window_ms: 13_000,
            pairing_distance_nm: 10.0,
            time_coef: 1.0,
            dist_coef: 1.0,
        }
    }

    /// Re-checks a deserialized configuration
    pub fn validated(self) -> Result<Self, PairingError> {
        Self::new(self.time_window_ms, self.pairing_distance_nm, self.time_coef, self.dist_coef)
    }

    pub fn time_window_ms(&self) -> i64 {
        self.time_window_ms
    }

    pub fn pairing_distance_nm(&self) -> f64 {
        self.pairing_distance_nm
    }

    pub fn time_coef(&self) -> f64 {
        self.time_coef
    }

    pub fn dist_coef(&self) -> f64 {
        self.dist_coef
    }

    pub fn metric(&self) -> FlatDistanceMetric {
        FlatDistanceMetric::new(self.time_coef, self.dist_coef)
    }

    /// Metric distance at which two points pair
    pub fn pairing_threshold(&self) -> f64 {
        self.time_coef * THRESHOLD_TIME_MS + self.dist_coef * self.pairing_distance_nm * FEET_PER_NM
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_threshold() {
        let config = PairingConfig::standard();
        assert_eq!(config.time_window_ms(), 13_000);
        assert!((config.pairing_threshold() - (7_000.0 + 60_761.1)).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(PairingConfig::new(100, 10.0, 1.0, 1.0), Err(PairingError::WindowTooSmall(100)));
        assert_eq!(PairingConfig::new(13_000, 0.0, 1.0, 1.0), Err(PairingError::NonPositiveDistance(0.0)));
        assert!(matches!(
            PairingConfig::new(13_000, 10.0, -1.0, 1.0),
            Err(PairingError::InvalidCoefficient { name: "time", .. })
        ));
        assert!(PairingConfig::new(13_000, 10.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_serde_round_trip_is_revalidated() {
        let json = r#"{"time_window_ms":50,"pairing_distance_nm":10.0,"time_coef":1.0,"dist_coef":1.0}"#;
        let parsed: PairingConfig = serde_json::from_str(json).unwrap();
        assert!(parsed.validated().is_err());

        let text = serde_json::to_string(&PairingConfig::standard()).unwrap();
        let back: PairingConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.validated(), Ok(PairingConfig::standard()));
    }
}
