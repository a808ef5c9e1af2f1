// Acceleration outliers next to data outages
//
// Sensors tend to emit errant positions right before or right after losing a
// target. Only the points within a short window of an outage (or of either end
// of the track) are inspected; anything between the outage and a physically
// impossible acceleration is discarded.

use std::ops::Range;

use tracing::debug;

use super::cleaner::DataCleaner;
use crate::constants::MS_PER_HOUR;
use crate::geodesy::RectangularMapProjection;
use crate::point::Point;
use crate::track::MutableTrack;

/// Accelerations above this (knots per second) are not physical
pub const ACCELERATION_THRESHOLD_KTS_PER_SEC: f64 = 70.0;

/// How far from an outage points are inspected (ms)
pub const INSPECTION_WINDOW_MS: i64 = 15_000;

/// Consecutive points further apart than this (ms) bracket an outage
pub const DATA_GAP_THRESHOLD_MS: i64 = 10_000;

/// Index ranges of the points just before and just after a timing discontinuity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGap {
    pub preceding: Range<usize>,
    pub following: Range<usize>,
}

impl DataGap {
    fn only_preceding(preceding: Range<usize>) -> Self {
        DataGap { preceding, following: 0..0 }
    }

    fn only_following(following: Range<usize>) -> Self {
        DataGap { preceding: 0..0, following }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AccelerationOutlierDetector {
    threshold_kts_per_sec: f64,
    window_ms: i64,
    gap_ms: i64,
}

impl Default for AccelerationOutlierDetector {
    fn default() -> Self {
        AccelerationOutlierDetector {
            threshold_kts_per_sec: ACCELERATION_THRESHOLD_KTS_PER_SEC,
            window_ms: INSPECTION_WINDOW_MS,
            gap_ms: DATA_GAP_THRESHOLD_MS,
        }
    }
}

impl AccelerationOutlierDetector {
    /// Points in `(end.time - window, end.time]`, ending at index `end`
    fn preceding<P>(&self, points: &[Point<P>], end: usize) -> Range<usize> {
        let start_time = points[end].time() - self.window_ms;
        let lo = points.partition_point(|p| p.time() <= start_time);
        lo.min(end + 1)..end + 1
    }

    /// Points in `[start.time, start.time + window)`, beginning at index `start`
    fn following<P>(&self, points: &[Point<P>], start: usize) -> Range<usize> {
        let end_time = points[start].time() + self.window_ms;
        let hi = points.partition_point(|p| p.time() < end_time);
        start..hi.max(start)
    }

    /// The track head and tail plus one gap per outage
    pub fn data_gaps<P>(&self, points: &[Point<P>]) -> Vec<DataGap> {
        if points.is_empty() {
            return Vec::new();
        }
        let mut gaps = vec![
            DataGap::only_following(self.following(points, 0)),
            DataGap::only_preceding(self.preceding(points, points.len() - 1)),
        ];
        for i in 1..points.len() {
            if points[i].time() > points[i - 1].time() + self.gap_ms {
                gaps.push(DataGap {
                    preceding: self.preceding(points, i - 1),
                    following: self.following(points, i),
                });
            }
        }
        gaps
    }

    fn acceleration<P>(
        projection: &RectangularMapProjection,
        p1: &Point<P>,
        p2: &Point<P>,
        p3: &Point<P>,
    ) -> f64 {
        let (x1, y1) = projection.coordinates(p1.latitude(), p1.longitude());
        let (x2, y2) = projection.coordinates(p2.latitude(), p2.longitude());
        let (x3, y3) = projection.coordinates(p3.latitude(), p3.longitude());

        let hours1 = (p2.time() - p1.time()) as f64 / MS_PER_HOUR;
        let hours2 = (p3.time() - p2.time()) as f64 / MS_PER_HOUR;

        let v1 = ((x2 - x1) / hours1, (y2 - y1) / hours1);
        let v2 = ((x3 - x2) / hours2, (y3 - y2) / hours2);
        let delta_v = (v1.0 - v2.0).hypot(v1.1 - v2.1);

        // half the span, in seconds
        let seconds = (p3.time() - p1.time()) as f64 / 2_000.0;
        (delta_v / seconds).abs()
    }

    /// Flags, indexed like `points`, of every point to discard
    pub fn outlier_flags<P>(&self, points: &[Point<P>]) -> Vec<bool> {
        let mut flags = vec![false; points.len()];
        let Some(first) = points.first() else {
            return flags;
        };
        let projection = RectangularMapProjection::new(first.latitude(), first.longitude());

        for gap in self.data_gaps(points) {
            // before an outage: drop from the first bad triple's last point onwards
            let range = gap.preceding.clone();
            for i in range.start..range.end.saturating_sub(2) {
                let accel = Self::acceleration(&projection, &points[i], &points[i + 1], &points[i + 2]);
                if accel > self.threshold_kts_per_sec {
                    flags[i + 2..range.end].fill(true);
                    break;
                }
            }

            // after an outage: drop everything up to the latest bad triple's first point
            let range = gap.following.clone();
            for i in range.start..range.end.saturating_sub(2) {
                let accel = Self::acceleration(&projection, &points[i], &points[i + 1], &points[i + 2]);
                if accel > self.threshold_kts_per_sec {
                    flags[range.start..=i].fill(true);
                }
            }
        }
        flags
    }
}

impl<P> DataCleaner<MutableTrack<P>> for AccelerationOutlierDetector {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        let flags = self.outlier_flags(track.points());
        let removed = track.remove_flagged(&flags);
        if removed > 0 {
            debug!(removed, "acceleration outliers removed");
        }
        (!track.is_empty()).then_some(track)
    }

    fn name(&self) -> &'static str {
        "AccelerationOutlierDetector"
    }
}
