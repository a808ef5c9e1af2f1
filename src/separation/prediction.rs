// SeparationPrediction - what the geometry of a track pair looks like from one instant
//
// The vertical separation at CPA is extrapolated from the separation series at
// the query time, never read off what actually happened at the CPA time.

use serde::Serialize;

use super::point_pair::SimultaneousPair;
use super::track_pair::TrackPair;
use crate::error::SeparationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeparationPrediction {
    pub time: i64,
    pub time_until_cpa_ms: i64,
    pub lateral_distance_at_cpa_nm: f64,
    pub vertical_separation_at_cpa_ft: f64,
    pub current_lateral_nm: f64,
    pub current_vertical_ft: f64,
    /// Feet per second, positive while closing
    pub vertical_closure_rate_fps: f64,
    /// Knots, positive while closing
    pub lateral_closure_rate_kts: f64,
}

impl SeparationPrediction {
    /// # Arguments
    /// * `pair` - Tracks to examine; both need altitude, speed and course at `time`
    /// * `time` - Query instant inside the pair's overlap
    pub fn new<P: Clone>(pair: &TrackPair<P>, time: i64) -> Result<Self, SeparationError> {
        let points: SimultaneousPair<P> = pair.interpolated_points_at(time)?;
        let cpa = points.closest_point_of_approach()?;
        let series = pair.separation_info()?;

        Ok(SeparationPrediction {
            time,
            time_until_cpa_ms: cpa.time_until_cpa_ms,
            lateral_distance_at_cpa_nm: cpa.distance_at_cpa_nm,
            vertical_separation_at_cpa_ft: series.predicted_vertical_separation(time, cpa.time_until_cpa_ms)?,
            current_lateral_nm: points.lateral_distance(),
            current_vertical_ft: points.altitude_delta()?,
            vertical_closure_rate_fps: series.vertical_closure_rate_at(time)?,
            lateral_closure_rate_kts: series.horizontal_closure_rate_at(time)?,
        })
    }
}

/// Short human-readable duration: "5.123 sec" or "1m 5.123 sec"
pub fn format_duration(ms: i64) -> String {
    let (minutes, rest) = (ms / 60_000, ms % 60_000);
    let text = format!("{}.{:03} sec", rest / 1_000, rest % 1_000);
    if minutes > 0 {
        format!("{}m {}", minutes, text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::project_out;
    use crate::testing::full_point;
    use crate::track::Track;

    // Head-on pair closing at 600 knots from 10 NM, 2000 ft apart vertically with
    // the upper aircraft descending at 10 ft/s until it levels off at `diverge_at`.
    fn head_on_pair(diverge_at: i64) -> TrackPair {
        let track1 = Track::new(
            (0..=90)
                .map(|i| {
                    let t = i * 1_000;
                    let (lat, lon) = project_out(0.0, 0.0, 90.0, 300.0 * t as f64 / 3_600_000.0);
                    full_point(t, lat, lon, 10_000.0, 300.0, 90.0)
                })
                .collect(),
        )
        .unwrap();
        let start = project_out(0.0, 0.0, 90.0, 10.0);
        let track2 = Track::new(
            (0..=90)
                .map(|i| {
                    let t = i * 1_000;
                    let (lat, lon) = project_out(start.0, start.1, 270.0, 300.0 * t as f64 / 3_600_000.0);
                    let alt = 12_000.0 - 10.0 * t.min(diverge_at) as f64 / 1_000.0;
                    full_point(t, lat, lon, alt, 300.0, 270.0)
                })
                .collect(),
        )
        .unwrap();
        TrackPair::new(track1, track2)
    }

    #[test]
    fn test_prediction_uses_projected_not_actual_vertical_separation() {
        let diverging_later = head_on_pair(30_000);
        let never_diverging = head_on_pair(90_000);

        let p1 = SeparationPrediction::new(&diverging_later, 0).unwrap();
        let p2 = SeparationPrediction::new(&never_diverging, 0).unwrap();
        assert_eq!(p1.vertical_separation_at_cpa_ft, p2.vertical_separation_at_cpa_ft);

        // the actual separation at the CPA time differs between the two pairs
        let cpa_time = p1.time_until_cpa_ms;
        let actual1 = diverging_later.separation_info().unwrap().vertical_separation_at(cpa_time).unwrap();
        let actual2 = never_diverging.separation_info().unwrap().vertical_separation_at(cpa_time).unwrap();
        assert!((actual1 - actual2 - 300.0).abs() < 1.0, "{} vs {}", actual1, actual2);
    }

    #[test]
    fn test_prediction_values() {
        let p = SeparationPrediction::new(&head_on_pair(90_000), 0).unwrap();
        // 10 NM closing at 600 knots
        assert!((p.time_until_cpa_ms - 60_000).abs() <= 1, "cpa time: {}", p.time_until_cpa_ms);
        assert!(p.lateral_distance_at_cpa_nm < 1e-3);
        assert!((p.current_vertical_ft - 2_000.0).abs() < 1e-6);
        assert!((p.vertical_closure_rate_fps - 10.0).abs() < 1e-6);
        assert!((p.lateral_closure_rate_kts - 600.0).abs() < 0.5);
        // 2000 ft closing at 10 ft/s for 60 s
        assert!((p.vertical_separation_at_cpa_ft - 1_400.0).abs() < 0.1, "{}", p.vertical_separation_at_cpa_ft);
    }

    #[test]
    fn test_prediction_outside_overlap() {
        assert!(matches!(
            SeparationPrediction::new(&head_on_pair(90_000), 100_000),
            Err(SeparationError::OutsideWindow { .. })
        ));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5_123), "5.123 sec");
        assert_eq!(format_duration(65_123), "1m 5.123 sec");
        assert_eq!(format_duration(0), "0.000 sec");
    }
}
