// AltitudeSmoother - Savitzky-Golay smoothing of a track's altitude profile
//
// The track is resampled at a fixed time step, the resampled altitudes are
// smoothed, and every source point then takes the smoothed altitude
// interpolated at its own time. Points past the last fixed step keep their
// measured altitude.

use tracing::debug;

use super::cleaner::DataCleaner;
use super::savitzky_golay::{FixedStepDigitalFilter, SavitzkyGolayFilter};
use crate::error::FilterConfigError;
use crate::track::{MutableTrack, TimeWindow};

/// Default resampling step (ms)
pub const DEFAULT_ALTITUDE_STEP_MS: i64 = 3_000;

#[derive(Debug, Clone)]
pub struct AltitudeSmoother<F = SavitzkyGolayFilter> {
    time_step_ms: i64,
    filter: F,
}

impl AltitudeSmoother<SavitzkyGolayFilter> {
    /// Smoother with a default-weight Savitzky-Golay filter at `time_step_ms`
    pub fn new(time_step_ms: i64) -> Result<Self, FilterConfigError> {
        if time_step_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "altitude time step", value: time_step_ms as f64 });
        }
        let filter = SavitzkyGolayFilter::new(time_step_ms as f64 / 1_000.0)?;
        Ok(AltitudeSmoother { time_step_ms, filter })
    }
}

impl<F: FixedStepDigitalFilter> AltitudeSmoother<F> {
    /// # Arguments
    /// * `time_step_ms` - Resampling step; must match the step `filter` was built for
    /// * `filter` - Filter reused on every track
    pub fn with_filter(time_step_ms: i64, filter: F) -> Result<Self, FilterConfigError> {
        if time_step_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "altitude time step", value: time_step_ms as f64 });
        }
        Ok(AltitudeSmoother { time_step_ms, filter })
    }

    pub fn time_step_ms(&self) -> i64 {
        self.time_step_ms
    }

    // Fixed-step sample times; the final partial step is left out
    fn sample_times(&self, window: TimeWindow) -> Vec<i64> {
        let mut times = window.stepped_iteration(self.time_step_ms);
        if window.duration() % self.time_step_ms != 0 {
            times.pop();
        }
        times
    }
}

/// Linear interpolation of `values` (sampled at increasing `times`) at `t`
fn interpolate_at(times: &[i64], values: &[f64], t: i64) -> Option<f64> {
    let (&first, &last) = (times.first()?, times.last()?);
    if t < first || t > last {
        return None;
    }
    let hi = times.partition_point(|&s| s < t);
    if times[hi] == t {
        return Some(values[hi]);
    }
    let lo = hi - 1;
    let fraction = (t - times[lo]) as f64 / (times[hi] - times[lo]) as f64;
    Some(values[lo] + fraction * (values[hi] - values[lo]))
}

impl<P, F> DataCleaner<MutableTrack<P>> for AltitudeSmoother<F>
where
    F: FixedStepDigitalFilter + Send + Sync,
{
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        if track.is_empty() {
            return Some(track);
        }
        let points = track.points();
        let window = TimeWindow::new(points[0].time(), points[points.len() - 1].time());
        if window.duration() < 2 * self.time_step_ms {
            return Some(track);
        }

        let source_times: Vec<i64> = track.points().iter().map(|p| p.time()).collect();
        let source_alts: Option<Vec<f64>> = track.points().iter().map(|p| p.altitude()).collect();
        let Some(source_alts) = source_alts else {
            debug!("altitude smoothing skipped: track has missing altitudes");
            return Some(track);
        };

        let fixed_times = self.sample_times(window);
        let raw: Vec<f64> = fixed_times
            .iter()
            .filter_map(|&t| interpolate_at(&source_times, &source_alts, t))
            .collect();
        let smoothed = self.filter.smooth(&raw);

        for p in track.points_mut() {
            if let Some(alt) = interpolate_at(&fixed_times, &smoothed, p.time()) {
                p.set_altitude(Some(alt));
            }
        }
        Some(track)
    }

    fn name(&self) -> &'static str {
        "AltitudeSmoother"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use crate::testing::full_point;

    fn standard() -> AltitudeSmoother {
        AltitudeSmoother::new(DEFAULT_ALTITUDE_STEP_MS).unwrap()
    }

    fn track_of(step_ms: i64, alts: impl Iterator<Item = f64>) -> MutableTrack {
        let points: Vec<Point> = alts
            .enumerate()
            .map(|(i, alt)| full_point(i as i64 * step_ms, 40.0, -75.0 + 0.001 * i as f64, alt, 250.0, 90.0))
            .collect();
        MutableTrack::new(points)
    }

    #[test]
    fn test_noisy_level_track_converges() {
        let track = track_of(3_000, (0..60).map(|i| if i % 2 == 0 { 5_040.0 } else { 4_960.0 }));
        let cleaned = standard().clean(track).unwrap();
        assert_eq!(cleaned.len(), 60);

        let alts: Vec<f64> = cleaned.points().iter().map(|p| p.altitude().unwrap()).collect();
        // 13 sample window; half a window at either edge stays raw
        for (i, alt) in alts.iter().enumerate().skip(6).take(48) {
            assert!((alt - 5_000.0).abs() < 2.0, "altitude {} at {}", alt, i);
        }
        assert_eq!(alts[0], 5_040.0);
        assert_eq!(alts[59], 4_960.0);
    }

    #[test]
    fn test_steady_climb_is_preserved() {
        // source spacing differs from the resampling step
        let track = track_of(2_000, (0..41).map(|i| 3_000.0 + 20.0 * i as f64));
        let cleaned = standard().clean(track).unwrap();
        for (i, p) in cleaned.points().iter().enumerate() {
            let expected = 3_000.0 + 20.0 * i as f64;
            assert!((p.altitude().unwrap() - expected).abs() < 1e-6, "point {}", i);
        }
    }

    #[test]
    fn test_short_track_is_unchanged() {
        let track = track_of(1_000, [5_000.0, 5_100.0, 4_900.0, 5_200.0, 5_000.0].into_iter());
        let cleaned = standard().clean(track.clone()).unwrap();
        assert_eq!(cleaned.points(), track.points());
    }

    #[test]
    fn test_short_signal_after_resampling_is_unchanged() {
        // 11 fixed samples is under the 13 sample window
        let track = track_of(3_000, (0..11).map(|i| if i == 5 { 5_300.0 } else { 5_000.0 }));
        let cleaned = standard().clean(track).unwrap();
        assert_eq!(cleaned.points()[5].altitude(), Some(5_300.0));
    }

    #[test]
    fn test_invalid_time_step() {
        assert!(AltitudeSmoother::new(0).is_err());
        assert!(AltitudeSmoother::new(-3_000).is_err());
        assert_eq!(AltitudeSmoother::new(5_000).unwrap().time_step_ms(), 5_000);
    }
}
