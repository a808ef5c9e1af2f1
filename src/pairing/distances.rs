// Distance estimates between reports taken at slightly different instants

use super::metric::{DistanceMetric, PointDistanceMetric};
use crate::constants::nm_travelled;
use crate::error::PairingError;
use crate::geodesy::project_out;
use crate::point::Point;

/// Dead-reckons `point` to `new_time` along its reported course and speed
///
/// Altitude is held fixed. A point without speed or course only has its
/// timestamp moved.
pub fn project_point_at_new_time<P: Clone>(point: &Point<P>, new_time: i64) -> Point<P> {
    let mut projected = point.clone();
    if let (Some(speed), Some(course)) = (point.speed(), point.course()) {
        let dist = nm_travelled(speed, new_time - point.time());
        let (lat, lon) = project_out(point.latitude(), point.longitude(), course, dist);
        projected.set_lat_long(lat, lon);
    }
    projected.set_time(new_time);
    projected
}

/// 3-D separation in feet after projecting both points to their average time
///
/// # Arguments
/// * `p1`, `p2` - Points to compare; both need an altitude
/// * `max_time_delta_ms` - Largest |t1 - t2| worth extrapolating across
pub fn estimate_distance_in_feet<P: Clone>(
    p1: &Point<P>,
    p2: &Point<P>,
    max_time_delta_ms: i64,
) -> Result<f64, PairingError> {
    let delta = (p1.time() - p2.time()).abs();
    if delta > max_time_delta_ms {
        return Err(PairingError::TimeDeltaTooLarge { delta, limit: max_time_delta_ms });
    }
    let avg_time = p1.time() + (p2.time() - p1.time()) / 2;
    let a = project_point_at_new_time(p1, avg_time);
    let b = project_point_at_new_time(p2, avg_time);
    Ok(PointDistanceMetric::new(0.0, 1.0).distance(&a, &b)?)
}
