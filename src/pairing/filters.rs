// Pair predicates - second-stage checks on candidate pairs from the finder

use super::distances::estimate_distance_in_feet;
use super::engine::PointPair;
use crate::constants::FEET_PER_NM;
use crate::error::FilterConfigError;
use crate::point::Point;

/// Decides whether two reports are worth keeping as a pair
pub trait PairPredicate<P> {
    fn test(&self, a: &Point<P>, b: &Point<P>) -> bool;

    fn test_pair(&self, pair: &PointPair<P>) -> bool {
        self.test(&pair.newer, &pair.older)
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, FilterConfigError> {
    if value.is_nan() || value < 0.0 {
        Err(FilterConfigError::Negative { name, value })
    } else {
        Ok(value)
    }
}

/// Accepts pairs inside a cylinder: a horizontal radius and a vertical half-height
#[derive(Debug, Clone, Copy)]
pub struct CylindricalFilter {
    max_horizontal_ft: f64,
    max_vertical_ft: f64,
    allow_missing_altitude: bool,
}

impl CylindricalFilter {
    /// Pairs missing an altitude are rejected
    pub fn new(max_horizontal_ft: f64, max_vertical_ft: f64) -> Result<Self, FilterConfigError> {
        Self::with_missing_altitude(max_horizontal_ft, max_vertical_ft, false)
    }

    /// # Arguments
    /// * `allow_missing_altitude` - Whether a pair with an unknown altitude passes the vertical test
    pub fn with_missing_altitude(
        max_horizontal_ft: f64,
        max_vertical_ft: f64,
        allow_missing_altitude: bool,
    ) -> Result<Self, FilterConfigError> {
        Ok(CylindricalFilter {
            max_horizontal_ft: non_negative("max horizontal distance", max_horizontal_ft)?,
            max_vertical_ft: non_negative("max vertical distance", max_vertical_ft)?,
            allow_missing_altitude,
        })
    }

    fn vertical_ok<P>(&self, a: &Point<P>, b: &Point<P>) -> bool {
        match (a.altitude(), b.altitude()) {
            (Some(x), Some(y)) => (x - y).abs() <= self.max_vertical_ft,
            _ => self.allow_missing_altitude,
        }
    }

    fn horizontal_ok<P>(&self, a: &Point<P>, b: &Point<P>) -> bool {
        a.distance_in_nm_to(b) * FEET_PER_NM <= self.max_horizontal_ft
    }
}

impl<P> PairPredicate<P> for CylindricalFilter {
    fn test(&self, a: &Point<P>, b: &Point<P>) -> bool {
        self.vertical_ok(a, b) && self.horizontal_ok(a, b)
    }
}

/// Accepts pairs whose projected 3-D separation is small
///
/// Both points are dead-reckoned to their average time before measuring, so
/// only pairs close in time can pass.
#[derive(Debug, Clone, Copy)]
pub struct DistanceFilter {
    max_distance_ft: f64,
    max_time_delta_ms: i64,
}

impl DistanceFilter {
    pub fn new(max_distance_ft: f64, max_time_delta_ms: i64) -> Result<Self, FilterConfigError> {
        if max_time_delta_ms < 0 {
            return Err(FilterConfigError::Negative { name: "max time delta", value: max_time_delta_ms as f64 });
        }
        Ok(DistanceFilter { max_distance_ft: non_negative("max distance", max_distance_ft)?, max_time_delta_ms })
    }
}

impl<P: Clone> PairPredicate<P> for DistanceFilter {
    fn test(&self, a: &Point<P>, b: &Point<P>) -> bool {
        if (a.time() - b.time()).abs() > self.max_time_delta_ms {
            return false;
        }
        estimate_distance_in_feet(a, b, self.max_time_delta_ms).is_ok_and(|ft| ft <= self.max_distance_ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::project_out;
    use crate::testing::{full_point, simple_point};

    fn offset_point(time: i64, feet_north: f64, alt: Option<f64>) -> Point {
        let (lat, lon) = project_out(40.0, -75.0, 0.0, feet_north / FEET_PER_NM);
        Point::builder().time(time).lat_long(lat, lon).maybe_altitude(alt).build().unwrap()
    }

    #[test]
    fn test_cylinder_bounds() {
        let filter = CylindricalFilter::new(1_000.0, 500.0).unwrap();
        let origin = offset_point(0, 0.0, Some(10_000.0));

        assert!(filter.test(&origin, &offset_point(0, 900.0, Some(10_400.0))));
        assert!(!filter.test(&origin, &offset_point(0, 1_100.0, Some(10_000.0))));
        assert!(!filter.test(&origin, &offset_point(0, 100.0, Some(10_600.0))));
    }

    #[test]
    fn test_cylinder_missing_altitude() {
        let a = offset_point(0, 0.0, Some(10_000.0));
        let b = offset_point(0, 100.0, None);
        assert!(!CylindricalFilter::new(1_000.0, 500.0).unwrap().test(&a, &b));
        assert!(CylindricalFilter::with_missing_altitude(1_000.0, 500.0, true).unwrap().test(&a, &b));
        // the horizontal test still applies
        let far = offset_point(0, 5_000.0, None);
        assert!(!CylindricalFilter::with_missing_altitude(1_000.0, 500.0, true).unwrap().test(&a, &far));
    }

    #[test]
    fn test_distance_filter() {
        let filter = DistanceFilter::new(100.0, 5_000).unwrap();
        let p1 = full_point(0, 0.0, 0.0, 0.0, 1.0, 90.0);
        let p2 = full_point(1_000, 0.0, 0.0, 77.0, 1.0, 270.0);
        assert!(filter.test(&p1, &p2));

        let p3 = full_point(1_000, 0.0, 0.0, 177.0, 1.0, 270.0);
        assert!(!filter.test(&p1, &p3));

        let late = full_point(6_000, 0.0, 0.0, 0.0, 1.0, 90.0);
        assert!(!filter.test(&p1, &late));

        // no altitude, no estimate
        assert!(!filter.test(&p1, &simple_point(0, 0.0, 0.0)));
    }

    #[test]
    fn test_rejects_negative_limits() {
        assert!(CylindricalFilter::new(-1.0, 500.0).is_err());
        assert!(CylindricalFilter::new(1.0, f64::NAN).is_err());
        assert!(DistanceFilter::new(100.0, -1).is_err());
        assert!(DistanceFilter::new(-100.0, 1).is_err());
    }
}
