// Shared fixtures for unit tests

use crate::geodesy::project_out;
use crate::point::Point;
use crate::track::Track;

pub(crate) fn simple_point(time: i64, lat: f64, lon: f64) -> Point {
    Point::builder().time(time).lat_long(lat, lon).build().unwrap()
}

pub(crate) fn moving_point(time: i64, lat: f64, lon: f64, speed: f64, course: f64) -> Point {
    Point::builder()
        .time(time)
        .lat_long(lat, lon)
        .speed(speed)
        .course(course)
        .build()
        .unwrap()
}

pub(crate) fn full_point(time: i64, lat: f64, lon: f64, alt: f64, speed: f64, course: f64) -> Point {
    Point::builder()
        .time(time)
        .lat_long(lat, lon)
        .altitude(alt)
        .speed(speed)
        .course(course)
        .build()
        .unwrap()
}

/// Straight, constant-speed flight sampled every `step_ms`
pub(crate) fn straight_track(
    start: (f64, f64),
    course: f64,
    speed_kts: f64,
    altitude: f64,
    n: usize,
    step_ms: i64,
) -> Track {
    let points = (0..n)
        .map(|i| {
            let t = i as i64 * step_ms;
            let dist = speed_kts * t as f64 / 3_600_000.0;
            let (lat, lon) = project_out(start.0, start.1, course, dist);
            full_point(t, lat, lon, altitude, speed_kts, course)
        })
        .collect();
    Track::new(points).unwrap()
}
