// TrackPair - two tracks examined together over their common time span

use std::sync::OnceLock;

use super::point_pair::SimultaneousPair;
use super::time_series::SeparationTimeSeries;
use crate::error::SeparationError;
use crate::track::{TimeWindow, Track};

/// Step used when scanning for any instant of wide separation
const SEPARATION_SCAN_STEP_MS: i64 = 2_000;

#[derive(Debug)]
pub struct TrackPair<P = ()> {
    track1: Track<P>,
    track2: Track<P>,
    separation: OnceLock<SeparationTimeSeries>,
}

impl<P> TrackPair<P> {
    pub fn new(track1: Track<P>, track2: Track<P>) -> Self {
        TrackPair { track1, track2, separation: OnceLock::new() }
    }

    pub fn track1(&self) -> &Track<P> {
        &self.track1
    }

    pub fn track2(&self) -> &Track<P> {
        &self.track2
    }

    pub fn into_tracks(self) -> (Track<P>, Track<P>) {
        (self.track1, self.track2)
    }

    pub fn time_overlap(&self) -> Option<TimeWindow> {
        self.track1.time_window().overlap_with(&self.track2.time_window())
    }

    pub fn overlap_in_time(&self) -> bool {
        self.time_overlap().is_some()
    }

    pub fn overlap_contains(&self, time: i64) -> bool {
        self.time_overlap().is_some_and(|w| w.contains(time))
    }

    /// Overlap sample times every `step_ms`, end included; empty without overlap
    pub fn times_in_overlap(&self, step_ms: i64) -> Vec<i64> {
        self.time_overlap().map(|w| w.stepped_iteration(step_ms)).unwrap_or_default()
    }
}

impl<P: Clone> TrackPair<P> {
    /// Attaches a fixed-step separation series instead of the default dynamic one
    pub fn with_fixed_step_separation(mut self, step_ms: i64) -> Result<Self, SeparationError> {
        let series = SeparationTimeSeries::fixed_step(&self, step_ms)?;
        self.separation = OnceLock::from(series);
        Ok(self)
    }

    /// Both tracks interpolated to `time`, which must fall inside the overlap
    pub fn interpolated_points_at(&self, time: i64) -> Result<SimultaneousPair<P>, SeparationError> {
        let overlap = self.time_overlap().ok_or(SeparationError::NoOverlap)?;
        let outside = || SeparationError::OutsideWindow { time, start: overlap.start, end: overlap.end };
        let p1 = self.track1.interpolated_point(time).ok_or_else(outside)?;
        let p2 = self.track2.interpolated_point(time).ok_or_else(outside)?;
        Ok(SimultaneousPair::new(p1, p2))
    }

    /// Separation series, built with a dynamic step on first use
    pub fn separation_info(&self) -> Result<&SeparationTimeSeries, SeparationError> {
        if let Some(series) = self.separation.get() {
            return Ok(series);
        }
        let series = SeparationTimeSeries::dynamic_step(self)?;
        Ok(self.separation.get_or_init(|| series))
    }

    /// True if the aircraft are ever more than `dist_nm` apart during the overlap
    pub fn separate_by(&self, dist_nm: f64) -> Result<bool, SeparationError> {
        let overlap = self.time_overlap().ok_or(SeparationError::NoOverlap)?;
        for t in overlap.stepped_iteration(SEPARATION_SCAN_STEP_MS) {
            if self.interpolated_points_at(t)?.lateral_distance() > dist_nm {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if any sampled horizontal separation is within `lateral_nm`
    pub fn come_within(&self, lateral_nm: f64) -> Result<bool, SeparationError> {
        Ok(self.separation_info()?.samples().any(|(_, h, _)| h <= lateral_nm))
    }

    /// True if some sample is within both the lateral and the vertical limit
    pub fn come_within_3d(&self, lateral_nm: f64, vertical_ft: f64) -> Result<bool, SeparationError> {
        Ok(self.separation_info()?.samples().any(|(_, h, v)| h <= lateral_nm && v <= vertical_ft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{full_point, straight_track};

    fn parallel_pair(offset_deg: f64) -> TrackPair {
        TrackPair::new(
            straight_track((0.0, 0.0), 90.0, 300.0, 10_000.0, 31, 1_000),
            straight_track((offset_deg, 0.0), 90.0, 300.0, 10_500.0, 31, 1_000),
        )
    }

    #[test]
    fn test_overlap() {
        let a = straight_track((0.0, 0.0), 90.0, 300.0, 10_000.0, 31, 1_000);
        let b = Track::new((10..=50).map(|i| full_point(i * 1_000, 0.1, 0.0, 9_000.0, 300.0, 90.0)).collect()).unwrap();
        let pair = TrackPair::new(a, b);
        assert_eq!(pair.time_overlap(), Some(TimeWindow::new(10_000, 30_000)));
        assert!(pair.overlap_contains(20_000));
        assert!(!pair.overlap_contains(40_000));
        assert_eq!(pair.times_in_overlap(7_000), vec![10_000, 17_000, 24_000, 30_000]);
        assert!(matches!(pair.interpolated_points_at(35_000), Err(SeparationError::OutsideWindow { .. })));

        let p = pair.interpolated_points_at(15_500).unwrap();
        assert_eq!(p.point1().time(), 15_500);
        assert_eq!(p.point2().time(), 15_500);
    }

    #[test]
    fn test_disjoint_tracks() {
        let a = straight_track((0.0, 0.0), 90.0, 300.0, 10_000.0, 5, 1_000);
        let b = Track::new(vec![full_point(60_000, 0.0, 0.0, 0.0, 0.0, 0.0)]).unwrap();
        let pair = TrackPair::new(a, b);
        assert!(!pair.overlap_in_time());
        assert!(pair.times_in_overlap(1_000).is_empty());
        assert_eq!(pair.separate_by(1.0).unwrap_err(), SeparationError::NoOverlap);
        assert_eq!(pair.separation_info().unwrap_err(), SeparationError::NoOverlap);
    }

    #[test]
    fn test_separation_queries() {
        // 0.05 degrees of latitude is about 3 NM
        let pair = parallel_pair(0.05);
        assert!(pair.separate_by(2.5).unwrap());
        assert!(!pair.separate_by(3.5).unwrap());
        assert!(pair.come_within(3.5).unwrap());
        assert!(!pair.come_within(2.5).unwrap());
        assert!(pair.come_within_3d(3.5, 500.0).unwrap());
        assert!(!pair.come_within_3d(3.5, 499.0).unwrap());
    }

    #[test]
    fn test_separate_by_samples_the_end_of_the_overlap() {
        // 21 s overlap: the 2 s scan lands on 20 s, then the final instant
        let track1 = straight_track((0.0, 0.0), 90.0, 300.0, 10_000.0, 22, 1_000);
        let mut points = track1.points().to_vec();
        let last = points.len() - 1;
        let (lat, lon) = points[last].lat_long();
        points[last] = full_point(points[last].time(), lat + 0.1, lon, 10_000.0, 300.0, 90.0);
        let pair = TrackPair::new(track1, Track::new(points).unwrap());

        assert!(pair.separate_by(5.0).unwrap());
        assert!(!pair.separate_by(7.0).unwrap());
    }

    #[test]
    fn test_separation_info_is_computed_once() {
        let pair = parallel_pair(0.05);
        let first = pair.separation_info().unwrap() as *const SeparationTimeSeries;
        let second = pair.separation_info().unwrap() as *const SeparationTimeSeries;
        assert_eq!(first, second);
        assert_eq!(pair.separation_info().unwrap().times()[1], 2_500);
    }

    #[test]
    fn test_fixed_step_separation_replaces_default() {
        let pair = parallel_pair(0.05).with_fixed_step_separation(10_000).unwrap();
        assert_eq!(pair.separation_info().unwrap().times(), &[0, 10_000, 20_000, 30_000]);
    }
}
