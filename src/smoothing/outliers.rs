// Leave-one-out regression tests for altitude and lateral outliers
//
// For every candidate: fit the k nearest-in-time neighbours without the
// candidate, note the fit quality, add the candidate back and refit. A point is
// an outlier only when the fit quality drops sharply AND the candidate misses
// the prediction by more than a minimum correctable error.

use tracing::debug;

use super::cleaner::DataCleaner;
use super::regression::{fit_quality, SimpleRegression};
use crate::error::FilterConfigError;
use crate::geodesy;
use crate::point::Point;
use crate::track::{k_nearest_indices, MutableTrack};

/// Neighbourhood size for altitude regressions (candidate included)
pub const ALTITUDE_SAMPLE_SIZE: usize = 7;

/// Fit-quality drop that marks an altitude outlier
pub const ALTITUDE_FIT_DROP: f64 = 0.5;

/// Smallest altitude error (ft) worth correcting
pub const MIN_CORRECTABLE_ALTITUDE_ERROR_FT: f64 = 300.0;

/// Neighbourhood size for lateral regressions (candidate included)
pub const LATERAL_SAMPLE_SIZE: usize = 9;

/// Drop in combined lat/long fit quality that marks a lateral outlier
pub const LATERAL_FIT_DROP: f64 = 0.3;

/// Smallest lateral error (NM) that counts as an outlier
pub const MIN_QUALIFYING_LATERAL_ERROR_NM: f64 = 0.05;

// Regression x values are seconds relative to the candidate
#[inline]
fn seconds_from(origin: i64, time: i64) -> f64 {
    (time - origin) as f64 / 1_000.0
}

fn validate(k: usize, drop: f64, min_error: f64) -> Result<(), FilterConfigError> {
    if k < 3 {
        return Err(FilterConfigError::NonPositive { name: "sample size above 2", value: k as f64 });
    }
    if !(0.0..=1.0).contains(&drop) {
        return Err(FilterConfigError::NotAFraction { name: "fit drop", value: drop });
    }
    if !(min_error > 0.0) || !min_error.is_finite() {
        return Err(FilterConfigError::NonPositive { name: "minimum error", value: min_error });
    }
    Ok(())
}

/// Corrects altitudes that disagree with a local altitude-vs-time trend
#[derive(Debug, Clone, Copy)]
pub struct VerticalOutlierDetector {
    sample_size: usize,
    fit_drop: f64,
    min_error_ft: f64,
}

impl Default for VerticalOutlierDetector {
    fn default() -> Self {
        VerticalOutlierDetector {
            sample_size: ALTITUDE_SAMPLE_SIZE,
            fit_drop: ALTITUDE_FIT_DROP,
            min_error_ft: MIN_CORRECTABLE_ALTITUDE_ERROR_FT,
        }
    }
}

impl VerticalOutlierDetector {
    pub fn new(sample_size: usize, fit_drop: f64, min_error_ft: f64) -> Result<Self, FilterConfigError> {
        validate(sample_size, fit_drop, min_error_ft)?;
        Ok(VerticalOutlierDetector { sample_size, fit_drop, min_error_ft })
    }

    /// Corrected altitude for the point at `index`, or `None` if it is not an outlier
    pub fn analyze<P>(&self, points: &[Point<P>], index: usize) -> Option<f64> {
        let candidate = &points[index];
        let altitude = candidate.altitude()?;

        let nearby = k_nearest_indices(points, candidate.time(), self.sample_size);
        if nearby.len() < self.sample_size {
            return None;
        }

        let mut regression = SimpleRegression::new();
        for &i in nearby.iter().filter(|&&i| i != index) {
            if let Some(alt) = points[i].altitude() {
                regression.add(seconds_from(candidate.time(), points[i].time()), alt);
            }
        }

        let predicted = regression.predict(0.0);
        if !predicted.is_finite() {
            return None;
        }
        let error = (predicted - altitude).abs();
        let quality_without = fit_quality(&regression);

        regression.add(0.0, altitude);
        let quality_with = fit_quality(&regression);

        let large_drop = quality_without - quality_with > self.fit_drop;
        (large_drop && error > self.min_error_ft).then_some(predicted)
    }

    /// Every outlier's index and corrected altitude, judged against the unmodified points
    pub fn outliers<P>(&self, points: &[Point<P>]) -> Vec<(usize, f64)> {
        (0..points.len())
            .filter_map(|i| self.analyze(points, i).map(|alt| (i, alt)))
            .collect()
    }
}

impl<P> DataCleaner<MutableTrack<P>> for VerticalOutlierDetector {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        let corrections = self.outliers(track.points());
        if !corrections.is_empty() {
            debug!(corrected = corrections.len(), "altitude outliers corrected");
        }
        let points = track.points_mut();
        for (i, alt) in corrections {
            points[i].set_altitude(Some(alt));
        }
        Some(track)
    }

    fn name(&self) -> &'static str {
        "VerticalOutlierDetector"
    }
}

/// Removes points whose position disagrees with local lat/long-vs-time trends
#[derive(Debug, Clone, Copy)]
pub struct LateralOutlierDetector {
    sample_size: usize,
    fit_drop: f64,
    min_error_nm: f64,
}

impl Default for LateralOutlierDetector {
    fn default() -> Self {
        LateralOutlierDetector {
            sample_size: LATERAL_SAMPLE_SIZE,
            fit_drop: LATERAL_FIT_DROP,
            min_error_nm: MIN_QUALIFYING_LATERAL_ERROR_NM,
        }
    }
}

struct LateralRegression {
    lat: SimpleRegression,
    lon: SimpleRegression,
}

impl LateralRegression {
    fn add(&mut self, x: f64, lat: f64, lon: f64) {
        self.lat.add(x, lat);
        self.lon.add(x, lon);
    }

    // Geometric mean of the two fit qualities
    fn combined_quality(&self) -> f64 {
        (fit_quality(&self.lat) * fit_quality(&self.lon)).sqrt()
    }
}

impl LateralOutlierDetector {
    pub fn new(sample_size: usize, fit_drop: f64, min_error_nm: f64) -> Result<Self, FilterConfigError> {
        validate(sample_size, fit_drop, min_error_nm)?;
        Ok(LateralOutlierDetector { sample_size, fit_drop, min_error_nm })
    }

    pub fn is_outlier<P>(&self, points: &[Point<P>], index: usize) -> bool {
        let candidate = &points[index];
        let nearby = k_nearest_indices(points, candidate.time(), self.sample_size);
        if nearby.len() < self.sample_size {
            return false;
        }

        let mut regression = LateralRegression {
            lat: SimpleRegression::new(),
            lon: SimpleRegression::new(),
        };
        for &i in nearby.iter().filter(|&&i| i != index) {
            let p = &points[i];
            regression.add(seconds_from(candidate.time(), p.time()), p.latitude(), p.longitude());
        }

        let predicted_lat = regression.lat.predict(0.0);
        let predicted_lon = regression.lon.predict(0.0);
        if !predicted_lat.is_finite() || !predicted_lon.is_finite() {
            return false;
        }
        let error_nm = geodesy::distance_nm(
            predicted_lat,
            predicted_lon,
            candidate.latitude(),
            candidate.longitude(),
        );

        let quality_without = regression.combined_quality();
        regression.add(0.0, candidate.latitude(), candidate.longitude());
        let quality_with = regression.combined_quality();

        quality_without - quality_with > self.fit_drop && error_nm > self.min_error_nm
    }

    pub fn outlier_flags<P>(&self, points: &[Point<P>]) -> Vec<bool> {
        (0..points.len()).map(|i| self.is_outlier(points, i)).collect()
    }
}

impl<P> DataCleaner<MutableTrack<P>> for LateralOutlierDetector {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        let flags = self.outlier_flags(track.points());
        let removed = track.remove_flagged(&flags);
        if removed > 0 {
            debug!(removed, "lateral outliers removed");
        }
        (!track.is_empty()).then_some(track)
    }

    fn name(&self) -> &'static str {
        "LateralOutlierDetector"
    }
}
