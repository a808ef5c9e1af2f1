// Interpolate - synthetic points between two real samples

use crate::error::InterpolationError;
use crate::geodesy::{angle_difference, normalize_course};
use crate::point::Point;

/// Builds a synthetic point at `time` between `p1` and `p2`
///
/// Position is a linear blend of lat/long weighted by the time fraction.
/// Altitude, speed and curvature blend linearly when both endpoints carry a
/// value. Course blends along the shorter arc. A value known at only one
/// endpoint is carried from the nearer endpoint, falling back to the other.
/// A course known at neither endpoint is taken from the path between them.
///
/// # Arguments
/// * `p1` - The earlier point
/// * `p2` - The later point
/// * `time` - Target time in `[p1.time(), p2.time()]`
pub fn interpolate<P: Clone>(
    p1: &Point<P>,
    p2: &Point<P>,
    time: i64,
) -> Result<Point<P>, InterpolationError> {
    let (t1, t2) = (p1.time(), p2.time());
    if t1 > t2 {
        return Err(InterpolationError::PointsOutOfOrder(t1, t2));
    }
    if time < t1 || time > t2 {
        return Err(InterpolationError::TimeOutOfRange { time, start: t1, end: t2 });
    }
    if time == t1 {
        return Ok(p1.clone());
    }
    if time == t2 {
        return Ok(p2.clone());
    }

    let dlat = (p2.latitude() - p1.latitude()).abs();
    let dlon = (p2.longitude() - p1.longitude()).abs();
    if dlat > 90.0 || dlon > 180.0 {
        return Err(InterpolationError::TooFarApart { dlat, dlon });
    }

    let frac = (time - t1) as f64 / (t2 - t1) as f64;
    let (near, far) = if frac < 0.5 { (p1, p2) } else { (p2, p1) };

    let latitude = lerp(p1.latitude(), p2.latitude(), frac);
    let longitude = lerp(p1.longitude(), p2.longitude(), frac);

    let course = match (p1.course(), p2.course()) {
        (Some(c1), Some(c2)) => Some(normalize_course(c1 + frac * angle_difference(c2, c1))),
        _ => near.course().or(far.course()).or_else(|| {
            let moved = p1.lat_long() != p2.lat_long();
            moved.then(|| p1.course_to(p2))
        }),
    };

    let mut builder = near
        .clone()
        .into_builder()
        .time(time)
        .lat_long(latitude, longitude)
        .maybe_altitude(blend(p1.altitude(), p2.altitude(), near.altitude(), far.altitude(), frac))
        .maybe_speed(blend(p1.speed(), p2.speed(), near.speed(), far.speed(), frac))
        .maybe_course(course);

    if let Some(c) = blend(p1.curvature(), p2.curvature(), near.curvature(), far.curvature(), frac) {
        builder = builder.curvature(c);
    }
    if let Some(d) = blend(
        p1.along_track_distance(),
        p2.along_track_distance(),
        near.along_track_distance(),
        far.along_track_distance(),
        frac,
    ) {
        builder = builder.along_track_distance(d);
    }

    // Every input is already finite and in range, so the blend is too
    builder.build().map_err(|_| InterpolationError::TooFarApart { dlat, dlon })
}

#[inline]
fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a + (b - a) * frac
}

fn blend(
    first: Option<f64>,
    second: Option<f64>,
    near: Option<f64>,
    far: Option<f64>,
    frac: f64,
) -> Option<f64> {
    match (first, second) {
        (Some(a), Some(b)) => Some(lerp(a, b, frac)),
        _ => near.or(far),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{moving_point, simple_point};

    #[test]
    fn test_midpoint_blends_everything() {
        let p1 = Point::builder()
            .time(0)
            .lat_long(40.0, -75.0)
            .altitude(1_000.0)
            .speed(200.0)
            .course(350.0)
            .build()
            .unwrap();
        let p2 = Point::builder()
            .time(10_000)
            .lat_long(40.1, -74.8)
            .altitude(2_000.0)
            .speed(300.0)
            .course(10.0)
            .build()
            .unwrap();

        let mid = interpolate(&p1, &p2, 5_000).unwrap();
        assert_eq!(mid.time(), 5_000);
        assert!((mid.latitude() - 40.05).abs() < 1e-12);
        assert!((mid.longitude() + 74.9).abs() < 1e-12);
        assert!((mid.altitude().unwrap() - 1_500.0).abs() < 1e-9);
        assert!((mid.speed().unwrap() - 250.0).abs() < 1e-9);
        // shorter arc through north, not 180
        let course = mid.course().unwrap();
        assert!(course < 1e-9 || (course - 360.0).abs() < 1e-9, "course: {}", course);
    }

    #[test]
    fn test_endpoints_are_returned_unchanged() {
        let p1 = moving_point(0, 40.0, -75.0, 100.0, 90.0);
        let p2 = moving_point(4_000, 40.0, -74.9, 120.0, 90.0);
        assert_eq!(interpolate(&p1, &p2, 0).unwrap(), p1);
        assert_eq!(interpolate(&p1, &p2, 4_000).unwrap(), p2);
    }

    #[test]
    fn test_missing_values_carry_from_nearer_endpoint() {
        let p1 = moving_point(0, 40.0, -75.0, 100.0, 90.0);
        let p2 = simple_point(10_000, 40.0, -74.9);

        let early = interpolate(&p1, &p2, 2_000).unwrap();
        assert_eq!(early.speed(), Some(100.0));
        assert_eq!(early.course(), Some(90.0));

        // p2 is nearer but lacks the values, so p1's are used
        let late = interpolate(&p1, &p2, 8_000).unwrap();
        assert_eq!(late.speed(), Some(100.0));
        assert_eq!(late.altitude(), None);
    }

    #[test]
    fn test_course_from_path_when_unknown() {
        let p1 = simple_point(0, 40.0, -75.0);
        let p2 = simple_point(10_000, 40.0, -74.9);
        let mid = interpolate(&p1, &p2, 5_000).unwrap();
        assert!((mid.course().unwrap() - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let p1 = simple_point(0, 40.0, -75.0);
        let p2 = simple_point(10_000, 40.0, -74.9);
        assert!(matches!(
            interpolate(&p1, &p2, 10_001),
            Err(InterpolationError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            interpolate(&p2, &p1, 5_000),
            Err(InterpolationError::PointsOutOfOrder(10_000, 0))
        ));

        let far = simple_point(10_000, 40.0, 120.0);
        assert!(matches!(
            interpolate(&p1, &far, 5_000),
            Err(InterpolationError::TooFarApart { .. })
        ));
    }
}
