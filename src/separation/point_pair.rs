// SimultaneousPair - two aircraft observed (or interpolated) at the same instant
//
// Horizontal vectors use (north, east) components in NM, velocities in knots.

use nalgebra as na;
use na::Vector2;
use serde::Serialize;

use crate::constants::MS_PER_HOUR;
use crate::error::SeparationError;
use crate::geodesy::{angle_difference, quick_avg_lat_long};
use crate::point::Point;

/// When the closest approach happens and how close it gets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosestPointOfApproach {
    pub time_until_cpa_ms: i64,
    pub distance_at_cpa_nm: f64,
}

#[derive(Debug, Clone)]
pub struct SimultaneousPair<P = ()> {
    point1: Point<P>,
    point2: Point<P>,
}

fn required(time: i64, field: &'static str, value: Option<f64>) -> Result<f64, SeparationError> {
    value.ok_or(SeparationError::MissingField { time, field })
}

fn velocity_kts<P>(p: &Point<P>) -> Result<Vector2<f64>, SeparationError> {
    let speed = required(p.time(), "speed", p.speed())?;
    let course = required(p.time(), "course", p.course())?.to_radians();
    Ok(Vector2::new(speed * course.cos(), speed * course.sin()))
}

fn altitude_ft<P>(p: &Point<P>) -> Result<f64, SeparationError> {
    required(p.time(), "altitude", p.altitude())
}

impl<P> SimultaneousPair<P> {
    pub fn new(point1: Point<P>, point2: Point<P>) -> Self {
        SimultaneousPair { point1, point2 }
    }

    pub fn point1(&self) -> &Point<P> {
        &self.point1
    }

    pub fn point2(&self) -> &Point<P> {
        &self.point2
    }

    /// Absolute altitude difference in feet
    pub fn altitude_delta(&self) -> Result<f64, SeparationError> {
        Ok((altitude_ft(&self.point1)? - altitude_ft(&self.point2)?).abs())
    }

    /// Great-circle separation in NM
    pub fn lateral_distance(&self) -> f64 {
        self.point1.distance_in_nm_to(&self.point2)
    }

    /// Absolute ground speed difference in knots
    pub fn speed_delta(&self) -> Result<f64, SeparationError> {
        let s1 = required(self.point1.time(), "speed", self.point1.speed())?;
        let s2 = required(self.point2.time(), "speed", self.point2.speed())?;
        Ok((s1 - s2).abs())
    }

    /// Magnitude of the velocity difference in knots
    pub fn velocity_delta(&self) -> Result<f64, SeparationError> {
        Ok((velocity_kts(&self.point1)? - velocity_kts(&self.point2)?).norm())
    }

    /// Rate (knots) at which the horizontal separation is shrinking; negative when opening
    pub fn horizontal_closure(&self) -> Result<f64, SeparationError> {
        let dp = self.offset_nm();
        let magnitude = dp.norm();
        if magnitude < 0.001 {
            return Ok(0.0);
        }
        let dv = velocity_kts(&self.point1)? - velocity_kts(&self.point2)?;
        Ok(dp.dot(&dv) / magnitude)
    }

    /// Signed course difference `course1 - course2` in `(-180, 180]`
    pub fn course_delta(&self) -> Result<f64, SeparationError> {
        let c1 = required(self.point1.time(), "course", self.point1.course())?;
        let c2 = required(self.point2.time(), "course", self.point2.course())?;
        Ok(angle_difference(c1, c2))
    }

    /// True when both the vertical and lateral separations are inside the limits
    pub fn are_within(&self, max_altitude_ft: f64, max_lateral_nm: f64) -> Result<bool, SeparationError> {
        Ok(self.altitude_delta()? <= max_altitude_ft && self.lateral_distance() <= max_lateral_nm)
    }

    pub fn avg_lat_long(&self) -> (f64, f64) {
        let (lat1, lon1) = self.point1.lat_long();
        let (lat2, lon2) = self.point2.lat_long();
        quick_avg_lat_long(lat1, lon1, lat2, lon2)
    }

    pub fn avg_altitude(&self) -> Result<f64, SeparationError> {
        Ok((altitude_ft(&self.point1)? + altitude_ft(&self.point2)?) / 2.0)
    }

    /// Straight-line closest point of approach from current speeds and courses
    ///
    /// Diverging (or parallel) aircraft have their CPA now, at the current lateral distance.
    pub fn closest_point_of_approach(&self) -> Result<ClosestPointOfApproach, SeparationError> {
        if self.point1.time() != self.point2.time() {
            return Err(SeparationError::DifferentTimes(self.point1.time(), self.point2.time()));
        }
        let dp = self.offset_nm();
        let dv = velocity_kts(&self.point2)? - velocity_kts(&self.point1)?;

        let hours = -dp.dot(&dv) / dv.norm_squared();
        if !hours.is_finite() || hours <= 0.0 {
            return Ok(ClosestPointOfApproach { time_until_cpa_ms: 0, distance_at_cpa_nm: self.lateral_distance() });
        }

        Ok(ClosestPointOfApproach {
            time_until_cpa_ms: (hours * MS_PER_HOUR) as i64,
            distance_at_cpa_nm: (dp + dv * hours).norm(),
        })
    }

    // point1 -> point2
    fn offset_nm(&self) -> Vector2<f64> {
        let dist = self.lateral_distance();
        let course = self.point1.course_to(&self.point2).to_radians();
        Vector2::new(dist * course.cos(), dist * course.sin())
    }
}
