// TrackFilter - noise reduction by local cubic fits of position against time
//
// Every point gets its own least-squares fit over the neighbours within half a
// window of it, in a flat projection anchored at that point. The fit's value
// at the point's time replaces the measured position; its derivative supplies
// speed and course.

use nalgebra as na;
use na::{DMatrix, DVector};
use tracing::debug;

use super::cleaner::DataCleaner;
use crate::error::FilterConfigError;
use crate::geodesy::{normalize_course, RectangularMapProjection};
use crate::point::Point;
use crate::track::MutableTrack;

/// Default fit window (ms); a second attempt uses twice this width
pub const DEFAULT_FIT_WINDOW_MS: i64 = 60_000;

/// Degree of the local polynomial
pub const FIT_DEGREE: usize = 3;

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Kinematics deduced for one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFit {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kts: f64,
    pub course: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackFilter {
    window_ms: i64,
}

impl Default for TrackFilter {
    fn default() -> Self {
        TrackFilter { window_ms: DEFAULT_FIT_WINDOW_MS }
    }
}

/// Least-squares polynomial coefficients (lowest order first)
fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Option<DVector<f64>> {
    let a = DMatrix::from_fn(xs.len(), degree + 1, |row, col| xs[row].powi(col as i32));
    let b = DVector::from_column_slice(ys);
    let at = a.transpose();
    let normal = &at * &a;
    let inverse = normal.try_inverse()?;
    Some(inverse * at * b)
}

impl TrackFilter {
    pub fn new(window_ms: i64) -> Result<Self, FilterConfigError> {
        if window_ms <= 0 {
            return Err(FilterConfigError::NonPositive { name: "fit window", value: window_ms as f64 });
        }
        Ok(TrackFilter { window_ms })
    }

    /// Fit around `points[index]` using the points within `half_width_ms` of it
    fn fit_with<P>(points: &[Point<P>], index: usize, half_width_ms: i64) -> Option<LocalFit> {
        let center = &points[index];
        let t0 = center.time();
        let lo = points.partition_point(|p| p.time() < t0 - half_width_ms);
        let hi = points.partition_point(|p| p.time() <= t0 + half_width_ms);
        let nearby = &points[lo..hi];
        if nearby.len() < FIT_DEGREE + 2 {
            return None;
        }

        let projection = RectangularMapProjection::new(center.latitude(), center.longitude());
        let mut xs = Vec::with_capacity(nearby.len());
        let mut easts = Vec::with_capacity(nearby.len());
        let mut norths = Vec::with_capacity(nearby.len());
        for p in nearby {
            let (east, north) = projection.coordinates(p.latitude(), p.longitude());
            // seconds relative to the fitted point keep the normal matrix well conditioned
            xs.push((p.time() - t0) as f64 / 1_000.0);
            easts.push(east);
            norths.push(north);
        }

        let east_fit = polyfit(&xs, &easts, FIT_DEGREE)?;
        let north_fit = polyfit(&xs, &norths, FIT_DEGREE)?;

        // value and first derivative at x = 0
        let (east, north) = (east_fit[0], north_fit[0]);
        let (ve, vn) = (east_fit[1], north_fit[1]);
        if ![east, north, ve, vn].iter().all(|v| v.is_finite()) {
            return None;
        }

        let (latitude, longitude) = projection.lat_long(east, north);
        Some(LocalFit {
            latitude,
            longitude,
            speed_kts: (ve.hypot(vn) * SECONDS_PER_HOUR).max(0.0),
            course: normalize_course(ve.atan2(vn).to_degrees()),
        })
    }

    /// Fit for `points[index]`, retrying with a doubled window if the first is too sparse
    pub fn local_fit<P>(&self, points: &[Point<P>], index: usize) -> Option<LocalFit> {
        Self::fit_with(points, index, self.window_ms / 2).or_else(|| Self::fit_with(points, index, self.window_ms))
    }
}

impl<P> DataCleaner<MutableTrack<P>> for TrackFilter {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        if track.len() == 1 {
            track.points_mut()[0].set_speed(Some(0.0));
            return Some(track);
        }

        let fits: Vec<Option<LocalFit>> = (0..track.len()).map(|i| self.local_fit(track.points(), i)).collect();
        let unfit: Vec<bool> = fits.iter().map(Option::is_none).collect();

        for (p, fit) in track.points_mut().iter_mut().zip(&fits) {
            if let Some(fit) = fit {
                p.set_lat_long(fit.latitude, fit.longitude);
                p.set_speed(Some(fit.speed_kts));
                p.set_course(Some(fit.course));
            }
        }
        let dropped = track.remove_flagged(&unfit);
        if dropped > 0 {
            debug!(dropped, "points without enough neighbours for a kinematic fit");
        }
        (!track.is_empty()).then_some(track)
    }

    fn name(&self) -> &'static str {
        "TrackFilter"
    }
}
