// Geodesy module - spherical-earth navigation helpers
//
// Provides:
// - great-circle distance and initial course between two lat/long positions
// - projection of a position along a course
// - a flat-earth rectangular projection for short-range kinematics
//
// All angles are degrees, all distances nautical miles.

use std::f64::consts::PI;

use crate::constants::{EARTH_RADIUS_NM, NM_PER_DEGREE_LAT};

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Radians to degrees conversion factor
const RTOD: f64 = 180.0 / PI;

/// Returns great-circle distance in nautical miles between two positions
///
/// Uses the haversine form so that separations of a few feet stay accurate.
///
/// # Arguments
/// * `lat0`, `lon0` - First position (latitude, longitude) in degrees
/// * `lat1`, `lon1` - Second position (latitude, longitude) in degrees
///
/// # Returns
/// Distance in nautical miles
pub fn distance_nm(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let phi0 = lat0 * DTOR;
    let phi1 = lat1 * DTOR;
    let dphi = (lat1 - lat0) * DTOR;
    let dlambda = (lon1 - lon0) * DTOR;

    let a = (dphi / 2.0).sin().powi(2)
        + phi0.cos() * phi1.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_NM * a.sqrt().min(1.0).asin()
}

/// Returns the initial great-circle course from the first position to the second
///
/// # Returns
/// Course in degrees clockwise from true north, in `[0, 360)`
pub fn course_deg(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let phi0 = lat0 * DTOR;
    let phi1 = lat1 * DTOR;
    let dlambda = (lon1 - lon0) * DTOR;

    let y = dlambda.sin() * phi1.cos();
    let x = phi0.cos() * phi1.sin() - phi0.sin() * phi1.cos() * dlambda.cos();

    normalize_course(y.atan2(x) * RTOD)
}

/// Moves a position `dist_nm` along `course` (degrees) on a great circle
///
/// Negative distances move backwards along the course.
///
/// # Returns
/// (latitude, longitude) in degrees, longitude wrapped to `[-180, 180)`
pub fn project_out(lat: f64, lon: f64, course: f64, dist_nm: f64) -> (f64, f64) {
    let phi0 = lat * DTOR;
    let lambda0 = lon * DTOR;
    let theta = course * DTOR;
    let delta = dist_nm / EARTH_RADIUS_NM;

    let sin_phi1 = phi0.sin() * delta.cos() + phi0.cos() * delta.sin() * theta.cos();
    let phi1 = sin_phi1.clamp(-1.0, 1.0).asin();
    let lambda1 = lambda0
        + (theta.sin() * delta.sin() * phi0.cos()).atan2(delta.cos() - phi0.sin() * sin_phi1);

    (phi1 * RTOD, wrap_longitude(lambda1 * RTOD))
}

/// Signed difference `a - b` between two courses, in `(-180, 180]`
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// Maps any angle onto `[0, 360)`
pub fn normalize_course(course: f64) -> f64 {
    let c = course.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if c >= 360.0 { 0.0 } else { c }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

/// Midpoint of two nearby positions by simple averaging (handles the antimeridian)
pub fn quick_avg_lat_long(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> (f64, f64) {
    let lat = (lat0 + lat1) / 2.0;
    let lon = if (lon0 - lon1).abs() > 180.0 {
        wrap_longitude((lon0 + lon1) / 2.0 + 180.0)
    } else {
        (lon0 + lon1) / 2.0
    };
    (lat, lon)
}

/// Flat-earth projection anchored at a reference position
///
/// Coordinates are (east, north) in nautical miles. Only accurate within a few
/// tens of miles of the anchor, which is all short-range kinematics need.
#[derive(Debug, Clone, Copy)]
pub struct RectangularMapProjection {
    origin_lat: f64,
    origin_lon: f64,
    nm_per_degree_lon: f64,
}

impl RectangularMapProjection {
    pub fn new(origin_lat: f64, origin_lon: f64) -> Self {
        RectangularMapProjection {
            origin_lat,
            origin_lon,
            nm_per_degree_lon: NM_PER_DEGREE_LAT * (origin_lat * DTOR).cos(),
        }
    }

    /// Projects a position to (east_nm, north_nm)
    pub fn coordinates(&self, lat: f64, lon: f64) -> (f64, f64) {
        let dlon = angle_difference(lon, self.origin_lon);
        (
            dlon * self.nm_per_degree_lon,
            (lat - self.origin_lat) * NM_PER_DEGREE_LAT,
        )
    }

    /// Inverse of [`coordinates`](Self::coordinates)
    pub fn lat_long(&self, east_nm: f64, north_nm: f64) -> (f64, f64) {
        (
            self.origin_lat + north_nm / NM_PER_DEGREE_LAT,
            wrap_longitude(self.origin_lon + east_nm / self.nm_per_degree_lon),
        )
    }
}
