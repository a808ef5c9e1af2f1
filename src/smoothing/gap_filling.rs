// Missing-value filling for altitude and speed

use tracing::debug;

use super::cleaner::DataCleaner;
use crate::constants::MS_PER_HOUR;
use crate::point::Point;
use crate::track::MutableTrack;

/// Replaces every non-positive altitude with "no altitude"
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroAltitudeToNull;

impl<P> DataCleaner<MutableTrack<P>> for ZeroAltitudeToNull {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        for p in track.points_mut() {
            if p.altitude().is_some_and(|alt| alt <= 0.0) {
                p.set_altitude(None);
            }
        }
        Some(track)
    }

    fn name(&self) -> &'static str {
        "ZeroAltitudeToNull"
    }
}

/// Fills absent altitudes; rejects tracks with no altitude at all
///
/// Leading and trailing gaps take the nearest known altitude. Interior gaps
/// are interpolated by time fraction between the bracketing known altitudes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillMissingAltitudes;

impl<P> DataCleaner<MutableTrack<P>> for FillMissingAltitudes {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        let known: Vec<(usize, i64, f64)> = track
            .points()
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.altitude().map(|alt| (i, p.time(), alt)))
            .collect();

        let (&(first_idx, _, first_alt), &(last_idx, _, last_alt)) = (known.first()?, known.last()?);

        let points = track.points_mut();
        let mut filled = 0;
        for p in &mut points[..first_idx] {
            p.set_altitude(Some(first_alt));
            filled += 1;
        }
        for p in &mut points[last_idx + 1..] {
            p.set_altitude(Some(last_alt));
            filled += 1;
        }
        for pair in known.windows(2) {
            let (i0, t0, a0) = pair[0];
            let (i1, t1, a1) = pair[1];
            for p in &mut points[i0 + 1..i1] {
                let fraction = if t1 == t0 { 0.0 } else { (p.time() - t0) as f64 / (t1 - t0) as f64 };
                p.set_altitude(Some(a0 + fraction * (a1 - a0)));
                filled += 1;
            }
        }

        if filled > 0 {
            debug!(filled, "missing altitudes filled");
        }
        Some(track)
    }

    fn name(&self) -> &'static str {
        "FillMissingAltitudes"
    }
}

/// Average ground speed (knots) needed to get from `a` to `b`
fn implied_speed<P>(a: &Point<P>, b: &Point<P>) -> f64 {
    let hours = (b.time() - a.time()).abs() as f64 / MS_PER_HOUR;
    a.distance_in_nm_to(b) / hours
}

/// Deduces absent speeds from the positions of neighbouring points
///
/// With both neighbours the estimate is the mean of the a-b, b-c and a-c
/// implied speeds; at either end only the single neighbour is used. Tracks
/// with fewer than two points have nothing to deduce from and are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillMissingSpeeds;

impl<P> DataCleaner<MutableTrack<P>> for FillMissingSpeeds {
    fn clean(&self, mut track: MutableTrack<P>) -> Option<MutableTrack<P>> {
        if track.len() < 2 {
            return None;
        }
        let points = track.points();
        let last = points.len() - 1;
        let deduced: Vec<(usize, f64)> = (0..points.len())
            .filter(|&i| points[i].speed().is_none())
            .map(|i| {
                let speed = match (i.checked_sub(1), (i < last).then_some(i + 1)) {
                    (Some(a), Some(c)) => {
                        (implied_speed(&points[a], &points[i])
                            + implied_speed(&points[i], &points[c])
                            + implied_speed(&points[a], &points[c]))
                            / 3.0
                    }
                    (Some(a), None) => implied_speed(&points[a], &points[i]),
                    (None, Some(c)) => implied_speed(&points[i], &points[c]),
                    (None, None) => f64::NAN,
                };
                (i, speed)
            })
            .collect();

        if !deduced.is_empty() {
            debug!(filled = deduced.len(), "missing speeds deduced");
        }
        let points = track.points_mut();
        for (i, speed) in deduced {
            // simultaneous neighbours give an infinite speed, which stays absent
            points[i].set_speed(Some(speed));
        }
        Some(track)
    }

    fn name(&self) -> &'static str {
        "FillMissingSpeeds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::project_out;
    use crate::point::Point;
    use crate::testing::simple_point;

    fn with_altitude(t: i64, alt: Option<f64>) -> Point {
        Point::builder().time(t).lat_long(40.0, -75.0).maybe_altitude(alt).build().unwrap()
    }

    fn altitudes(track: &MutableTrack) -> Vec<Option<f64>> {
        track.points().iter().map(|p| p.altitude()).collect()
    }

    #[test]
    fn test_zero_altitudes_become_missing() {
        let track = MutableTrack::new(vec![
            with_altitude(0, Some(0.0)),
            with_altitude(1_000, Some(-100.0)),
            with_altitude(2_000, Some(500.0)),
        ]);
        let out = ZeroAltitudeToNull.clean(track).unwrap();
        assert_eq!(altitudes(&out), vec![None, None, Some(500.0)]);
    }

    #[test]
    fn test_fill_missing_altitudes() {
        let track = MutableTrack::new(vec![
            with_altitude(0, None),
            with_altitude(1_000, Some(1_000.0)),
            with_altitude(2_000, None),
            with_altitude(5_000, Some(2_000.0)),
            with_altitude(6_000, None),
        ]);
        let out = FillMissingAltitudes.clean(track).unwrap();
        let alts: Vec<f64> = altitudes(&out).into_iter().map(|a| a.unwrap()).collect();
        assert_eq!(alts[0], 1_000.0);
        assert!((alts[2] - 1_250.0).abs() < 1e-9, "interior: {}", alts[2]);
        assert_eq!(alts[4], 2_000.0);
    }

    #[test]
    fn test_no_altitude_anywhere_is_rejected() {
        let track = MutableTrack::new(vec![with_altitude(0, None), with_altitude(1_000, None)]);
        assert!(FillMissingAltitudes.clean(track).is_none());
    }

    #[test]
    fn test_fill_missing_speeds() {
        // 1 NM every 36 s is 100 knots
        let mut points = Vec::new();
        let (mut lat, mut lon) = (40.0, -75.0);
        for i in 0..4 {
            points.push(simple_point(i * 36_000, lat, lon));
            (lat, lon) = project_out(lat, lon, 90.0, 1.0);
        }
        let out = FillMissingSpeeds.clean(MutableTrack::new(points)).unwrap();
        for p in out.points() {
            let speed = p.speed().unwrap();
            assert!((speed - 100.0).abs() < 1e-4, "speed: {}", speed);
        }
    }

    #[test]
    fn test_known_speeds_are_kept() {
        let points = vec![
            Point::builder().time(0).lat_long(40.0, -75.0).speed(250.0).build().unwrap(),
            simple_point(36_000, 40.0, -74.9),
        ];
        let out = FillMissingSpeeds.clean(MutableTrack::new(points)).unwrap();
        assert_eq!(out.points()[0].speed(), Some(250.0));
        assert!(out.points()[1].speed().is_some());
    }

    #[test]
    fn test_single_point_cannot_fill_speeds() {
        let track = MutableTrack::new(vec![simple_point(0, 40.0, -75.0)]);
        assert!(FillMissingSpeeds.clean(track).is_none());
    }
}
