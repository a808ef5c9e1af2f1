// Down-samplers - drop redundant trailing points while keeping a heartbeat

use tracing::debug;

use super::cleaner::DataCleaner;
use crate::constants::FEET_PER_NM;
use crate::error::FilterConfigError;
use crate::track::MutableTrack;

/// Default minimum spacing between retained points (ms)
pub const DEFAULT_MIN_TIME_DELTA_MS: i64 = 4_000;

/// Default minimum movement that justifies keeping a point (NM)
pub const DEFAULT_MIN_DISTANCE_NM: f64 = 10.0 / FEET_PER_NM;

/// Default heartbeat: a point survives at least this often (ms)
pub const DEFAULT_HEARTBEAT_MS: i64 = 30_000;

/// Removes any point closer in time than `min_delta_ms` to the last retained point
#[derive(Debug, Clone, Copy)]
pub struct TimeDownSampler {
    min_delta_ms: i64,
}

impl Default for TimeDownSampler {
    fn default() -> Self {
        TimeDownSampler { min_delta_ms: DEFAULT_MIN_TIME_DELTA_MS }
    }
}

impl TimeDownSampler {
    pub fn new(min_delta_ms: i64) -> Result<Self, FilterConfigError> {
        if min_delta_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "minimum time delta", value: min_delta_ms as f64 });
        }
        Ok(TimeDownSampler { min_delta_ms })
    }
}

impl<P> DataCleaner<MutableTrack<P>> for TimeDownSampler {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        let mut tau: Option<i64> = None;
        let before = track.len();
        track.retain(|p| match tau {
            None => {
                tau = Some(p.time());
                true
            }
            Some(anchor) if p.time() - anchor < self.min_delta_ms => false,
            Some(_) => {
                tau = Some(p.time());
                true
            }
        });
        debug!(removed = before - track.len(), "time down-sampling");
        Some(track)
    }

    fn name(&self) -> &'static str {
        "TimeDownSampler"
    }
}

/// Removes points that have not moved far enough from the anchor point,
/// unless the heartbeat interval has elapsed since that anchor
#[derive(Debug, Clone, Copy)]
pub struct DistanceDownSampler {
    min_distance_nm: f64,
    heartbeat_ms: i64,
}

impl Default for DistanceDownSampler {
    fn default() -> Self {
        DistanceDownSampler {
            min_distance_nm: DEFAULT_MIN_DISTANCE_NM,
            heartbeat_ms: DEFAULT_HEARTBEAT_MS,
        }
    }
}

impl DistanceDownSampler {
    pub fn new(min_distance_nm: f64, heartbeat_ms: i64) -> Result<Self, FilterConfigError> {
        if !(min_distance_nm > 0.0) || !min_distance_nm.is_finite() {
            return Err(FilterConfigError::NonPositive { name: "minimum distance", value: min_distance_nm });
        }
        if heartbeat_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "heartbeat", value: heartbeat_ms as f64 });
        }
        Ok(DistanceDownSampler { min_distance_nm, heartbeat_ms })
    }
}

impl<P> DataCleaner<MutableTrack<P>> for DistanceDownSampler {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        // (time, lat, lon) of the last retained point
        let mut anchor: Option<(i64, f64, f64)> = None;
        let before = track.len();
        track.retain(|p| {
            let Some((t0, lat0, lon0)) = anchor else {
                anchor = Some((p.time(), p.latitude(), p.longitude()));
                return true;
            };
            let too_close_in_space =
                crate::geodesy::distance_nm(lat0, lon0, p.latitude(), p.longitude()) < self.min_distance_nm;
            let too_close_in_time = (p.time() - t0).abs() < self.heartbeat_ms;
            if too_close_in_space && too_close_in_time {
                false
            } else {
                anchor = Some((p.time(), p.latitude(), p.longitude()));
                true
            }
        });
        debug!(removed = before - track.len(), "distance down-sampling");
        Some(track)
    }

    fn name(&self) -> &'static str {
        "DistanceDownSampler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::project_out;
    use crate::testing::simple_point;

    #[test]
    fn test_time_down_sampling() {
        let times = [0, 1_000, 3_999, 4_000, 5_000, 8_500, 9_000, 20_000];
        let track = MutableTrack::new(times.iter().map(|&t| simple_point(t, 1.0, 1.0)).collect());
        let out = TimeDownSampler::default().clean(track).unwrap();
        let kept: Vec<i64> = out.points().iter().map(|p| p.time()).collect();
        assert_eq!(kept, vec![0, 4_000, 8_500, 20_000]);
    }

    #[test]
    fn test_stationary_segment_keeps_heartbeat_points() {
        // seed, 300 moving points, 300 stationary points, 300 more moving points
        let mut points = vec![simple_point(0, 50.0, 50.0)];
        let (mut lat, mut lon) = (50.0, 50.0);
        let step_nm = 1.0 / 60.0;
        let mut t = 0;
        for _ in 0..300 {
            t += 1_000;
            (lat, lon) = project_out(lat, lon, 45.0, step_nm);
            points.push(simple_point(t, lat, lon));
        }
        for _ in 0..300 {
            t += 1_000;
            points.push(simple_point(t, lat, lon));
        }
        for _ in 0..300 {
            t += 1_000;
            (lat, lon) = project_out(lat, lon, 45.0, step_nm);
            points.push(simple_point(t, lat, lon));
        }
        assert_eq!(points.len(), 901);

        let out = DistanceDownSampler::default().clean(MutableTrack::new(points)).unwrap();
        assert_eq!(901 - out.len(), 290);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(TimeDownSampler::new(0).is_err());
        assert!(DistanceDownSampler::new(-1.0, 30_000).is_err());
        assert!(DistanceDownSampler::new(0.01, 0).is_err());
    }
}
