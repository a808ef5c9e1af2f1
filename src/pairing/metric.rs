// Distance metrics for spatio-temporal closeness
//
// Both metrics are a weighted sum of an absolute time delta (ms) and a spatial
// separation (ft). A weighted sum of metrics is a metric, so either can back
// the metric tree.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::FEET_PER_NM;
use crate::error::MetricError;
use crate::point::Point;

/// A true metric over points: symmetric, zero on identical input and obeying
/// the triangle inequality
pub trait DistanceMetric<P> {
    fn distance(&self, a: &Point<P>, b: &Point<P>) -> Result<f64, MetricError>;
}

/// Time delta in ms plus horizontal separation in feet, altitude ignored
#[derive(Debug)]
pub struct FlatDistanceMetric {
    time_coef: f64,
    distance_coef: f64,
    num_calls: AtomicU64,
}

impl FlatDistanceMetric {
    pub fn new(time_coef: f64, distance_coef: f64) -> Self {
        FlatDistanceMetric { time_coef, distance_coef, num_calls: AtomicU64::new(0) }
    }

    pub fn time_coef(&self) -> f64 {
        self.time_coef
    }

    pub fn distance_coef(&self) -> f64 {
        self.distance_coef
    }

    /// Number of distance evaluations so far
    pub fn num_calls(&self) -> u64 {
        self.num_calls.load(Ordering::Relaxed)
    }
}

impl Default for FlatDistanceMetric {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl<P> DistanceMetric<P> for FlatDistanceMetric {
    fn distance(&self, a: &Point<P>, b: &Point<P>) -> Result<f64, MetricError> {
        self.num_calls.fetch_add(1, Ordering::Relaxed);
        let dt = (a.time() - b.time()).abs() as f64;
        let horizontal_ft = a.distance_in_nm_to(b) * FEET_PER_NM;
        Ok(self.distance_coef * horizontal_ft + self.time_coef * dt)
    }
}

/// Time delta in ms plus 3-D separation in feet; both points need an altitude
#[derive(Debug)]
pub struct PointDistanceMetric {
    time_coef: f64,
    distance_coef: f64,
    num_calls: AtomicU64,
}

impl PointDistanceMetric {
    pub fn new(time_coef: f64, distance_coef: f64) -> Self {
        PointDistanceMetric { time_coef, distance_coef, num_calls: AtomicU64::new(0) }
    }

    pub fn time_coef(&self) -> f64 {
        self.time_coef
    }

    pub fn distance_coef(&self) -> f64 {
        self.distance_coef
    }

    pub fn num_calls(&self) -> u64 {
        self.num_calls.load(Ordering::Relaxed)
    }
}

impl Default for PointDistanceMetric {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn required_altitude<P>(p: &Point<P>) -> Result<f64, MetricError> {
    p.altitude().ok_or(MetricError::MissingAltitude { time: p.time() })
}

impl<P> DistanceMetric<P> for PointDistanceMetric {
    fn distance(&self, a: &Point<P>, b: &Point<P>) -> Result<f64, MetricError> {
        self.num_calls.fetch_add(1, Ordering::Relaxed);
        let vertical_ft = (required_altitude(a)? - required_altitude(b)?).abs();
        let dt = (a.time() - b.time()).abs() as f64;
        let horizontal_ft = a.distance_in_nm_to(b) * FEET_PER_NM;
        Ok(self.distance_coef * horizontal_ft.hypot(vertical_ft) + self.time_coef * dt)
    }
}
