// Early pipeline stages that drop synthetic, duplicate or insufficient data

use tracing::debug;

use super::cleaner::DataCleaner;
use crate::error::FilterConfigError;
use crate::point::Point;
use crate::track::Track;

/// Default minimum spacing between consecutive reports (ms)
pub const DEFAULT_MIN_SPACING_MS: i64 = 500;

/// Default minimum number of points a track must keep
pub const DEFAULT_MIN_TRACK_POINTS: usize = 9;

/// Decides whether a point was synthesised by the sensor rather than measured
pub type CoastedPredicate<P> = Box<dyn Fn(&Point<P>) -> bool + Send + Sync>;

/// Removes coasted points
///
/// Coasting is a property of the surveillance format, so the caller supplies
/// the test. The default test never flags a point.
pub struct CoastedPointRemover<P> {
    is_coasted: CoastedPredicate<P>,
}

impl<P: 'static> CoastedPointRemover<P> {
    pub fn new(is_coasted: impl Fn(&Point<P>) -> bool + Send + Sync + 'static) -> Self {
        CoastedPointRemover { is_coasted: Box::new(is_coasted) }
    }
}

impl<P: 'static> Default for CoastedPointRemover<P> {
    fn default() -> Self {
        CoastedPointRemover { is_coasted: Box::new(|_| false) }
    }
}

impl<P> DataCleaner<Track<P>> for CoastedPointRemover<P> {
    fn clean(&self, track: Track<P>) -> Option<Track<P>> {
        let before = track.len();
        let points: Vec<Point<P>> = track.into_points().into_iter().filter(|p| !(self.is_coasted)(p)).collect();
        if points.len() < before {
            debug!(removed = before - points.len(), "coasted points removed");
        }
        Track::from_filtered(points)
    }

    fn name(&self) -> &'static str {
        "CoastedPointRemover"
    }
}

/// Removes both members of every consecutive pair reported too close in time
///
/// Keeping either member would mean guessing which report is the honest one.
#[derive(Debug, Clone, Copy)]
pub struct HighFrequencyPointRemover {
    min_spacing_ms: i64,
}

impl Default for HighFrequencyPointRemover {
    fn default() -> Self {
        HighFrequencyPointRemover { min_spacing_ms: DEFAULT_MIN_SPACING_MS }
    }
}

impl HighFrequencyPointRemover {
    pub fn new(min_spacing_ms: i64) -> Result<Self, FilterConfigError> {
        if min_spacing_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "minimum spacing", value: min_spacing_ms as f64 });
        }
        Ok(HighFrequencyPointRemover { min_spacing_ms })
    }

    /// Flags, indexed like `points`, for every point lacking enough time spacing
    pub fn crowded_flags<P>(&self, points: &[Point<P>]) -> Vec<bool> {
        let mut flags = vec![false; points.len()];
        for i in 1..points.len() {
            if points[i].time() - points[i - 1].time() < self.min_spacing_ms {
                flags[i - 1] = true;
                flags[i] = true;
            }
        }
        flags
    }
}

impl<P> DataCleaner<Track<P>> for HighFrequencyPointRemover {
    fn clean(&self, track: Track<P>) -> Option<Track<P>> {
        let flags = self.crowded_flags(track.points());
        let removed = flags.iter().filter(|f| **f).count();
        if removed > 0 {
            debug!(removed, "high frequency points removed");
        }
        let points: Vec<Point<P>> = track
            .into_points()
            .into_iter()
            .zip(flags)
            .filter_map(|(p, crowded)| (!crowded).then_some(p))
            .collect();
        Track::from_filtered(points)
    }

    fn name(&self) -> &'static str {
        "HighFrequencyPointRemover"
    }
}

/// Rejects tracks with fewer than `min_points` points
#[derive(Debug, Clone, Copy)]
pub struct SmallTrackRemover {
    min_points: usize,
}

impl Default for SmallTrackRemover {
    fn default() -> Self {
        SmallTrackRemover { min_points: DEFAULT_MIN_TRACK_POINTS }
    }
}

impl SmallTrackRemover {
    pub fn new(min_points: usize) -> Result<Self, FilterConfigError> {
        if min_points == 0 {
            return Err(FilterConfigError::NonPositive { name: "minimum track size", value: 0.0 });
        }
        Ok(SmallTrackRemover { min_points })
    }

    pub fn is_small<P>(&self, track: &Track<P>) -> bool {
        track.len() < self.min_points
    }
}

impl<P> DataCleaner<Track<P>> for SmallTrackRemover {
    fn clean(&self, track: Track<P>) -> Option<Track<P>> {
        (!self.is_small(&track)).then_some(track)
    }

    fn name(&self) -> &'static str {
        "SmallTrackRemover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::simple_point;

    fn track_at(times: &[i64]) -> Track {
        Track::new(times.iter().enumerate().map(|(i, &t)| simple_point(t, 40.0, -75.0 + 0.01 * i as f64)).collect())
            .unwrap()
    }

    #[test]
    fn test_coasted_points_are_removed() {
        let points = (0..6)
            .map(|i| {
                Point::builder()
                    .time(i * 4_000)
                    .lat_long(40.0, -75.0)
                    .payload(i % 2 == 0)
                    .build()
                    .unwrap()
            })
            .collect();
        let track = Track::new(points).unwrap();

        let remover = CoastedPointRemover::new(|p: &Point<bool>| *p.payload());
        let out = remover.clean(track.clone()).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.points().iter().all(|p| !*p.payload()));

        assert_eq!(CoastedPointRemover::<bool>::default().clean(track).unwrap().len(), 6);
    }

    #[test]
    fn test_everything_coasted_is_absent() {
        let remover = CoastedPointRemover::new(|_: &Point| true);
        assert!(remover.clean(track_at(&[0, 1_000])).is_none());
    }

    #[test]
    fn test_high_frequency_removes_both_points() {
        let track = track_at(&[0, 4_000, 4_200, 8_000, 12_000, 12_000, 16_000]);
        let out = HighFrequencyPointRemover::default().clean(track).unwrap();
        let times: Vec<i64> = out.points().iter().map(|p| p.time()).collect();
        assert_eq!(times, vec![0, 8_000, 16_000]);
    }

    #[test]
    fn test_high_frequency_can_empty_a_track() {
        let track = track_at(&[0, 100, 200]);
        assert!(HighFrequencyPointRemover::default().clean(track).is_none());
    }

    #[test]
    fn test_small_track_remover() {
        let remover = SmallTrackRemover::default();
        assert!(remover.clean(track_at(&[0, 1, 2, 3, 4, 5, 6, 7])).is_none());
        assert!(remover.clean(track_at(&[0, 1, 2, 3, 4, 5, 6, 7, 8])).is_some());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(HighFrequencyPointRemover::new(0).is_err());
        assert!(HighFrequencyPointRemover::new(-500).is_err());
        assert!(SmallTrackRemover::new(0).is_err());

        let remover = HighFrequencyPointRemover::new(1_000).unwrap();
        let out = remover.clean(track_at(&[0, 900, 5_000, 10_000])).unwrap();
        assert_eq!(out.len(), 2);
        assert!(SmallTrackRemover::new(3).unwrap().is_small(&track_at(&[0, 1_000])));
    }
}
