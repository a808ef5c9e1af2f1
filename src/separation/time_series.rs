// SeparationTimeSeries - vertical and horizontal separation sampled across a track pair's overlap
//
// Vertical separation is in feet, horizontal in NM. Closure rates are positive
// while the separation is shrinking.

use super::track_pair::TrackPair;
use crate::constants::{MS_PER_HOUR, MS_PER_SECOND};
use crate::error::SeparationError;
use crate::track::TimeWindow;

const FIFTEEN_MILES: f64 = 15.0;
const THIRTY_MILES: f64 = 30.0;
const FIFTY_MILES: f64 = 50.0;

/// Sampling step used by [`SeparationTimeSeries::fixed_step`] callers that have no preference
pub const DEFAULT_TIME_STEP_MS: i64 = 5_000;

/// Finer sampling while the aircraft are close, coarser when far apart
fn dynamic_time_step(horizontal_nm: f64) -> i64 {
    if horizontal_nm < FIFTEEN_MILES {
        2_500
    } else if horizontal_nm < THIRTY_MILES {
        5_000
    } else if horizontal_nm < FIFTY_MILES {
        10_000
    } else {
        20_000
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeparationTimeSeries {
    window: TimeWindow,
    times: Vec<i64>,
    vertical_ft: Vec<f64>,
    horizontal_nm: Vec<f64>,
}

impl SeparationTimeSeries {
    /// # Arguments
    /// * `times` - At least two strictly increasing sample times
    /// * `vertical_ft` - Vertical separation at each time
    /// * `horizontal_nm` - Horizontal separation at each time
    pub fn new(times: Vec<i64>, vertical_ft: Vec<f64>, horizontal_nm: Vec<f64>) -> Result<Self, SeparationError> {
        if times.len() < 2 {
            return Err(SeparationError::TooFewSamples(times.len()));
        }
        if times.len() != vertical_ft.len() || times.len() != horizontal_nm.len() {
            return Err(SeparationError::LengthMismatch);
        }
        if times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeparationError::TimesNotIncreasing);
        }
        let window = TimeWindow::new(times[0], times[times.len() - 1]);
        Ok(SeparationTimeSeries { window, times, vertical_ft, horizontal_nm })
    }

    /// Samples the overlap of `pair` every `step_ms` (the overlap end is always included)
    pub fn fixed_step<P: Clone>(pair: &TrackPair<P>, step_ms: i64) -> Result<Self, SeparationError> {
        if step_ms <= 0 {
            return Err(SeparationError::NonPositiveStep(step_ms));
        }
        let times = pair.times_in_overlap(step_ms);
        let mut vertical = Vec::with_capacity(times.len());
        let mut horizontal = Vec::with_capacity(times.len());
        for &t in &times {
            let points = pair.interpolated_points_at(t)?;
            vertical.push(points.altitude_delta()?);
            horizontal.push(points.lateral_distance());
        }
        Self::new(times, vertical, horizontal)
    }

    /// Samples the overlap of `pair` with a step that shrinks as the aircraft close
    pub fn dynamic_step<P: Clone>(pair: &TrackPair<P>) -> Result<Self, SeparationError> {
        let overlap = pair.time_overlap().ok_or(SeparationError::NoOverlap)?;

        let (mut times, mut vertical, mut horizontal) = (Vec::new(), Vec::new(), Vec::new());
        let mut sample = |t: i64| -> Result<f64, SeparationError> {
            let points = pair.interpolated_points_at(t)?;
            let lateral = points.lateral_distance();
            times.push(t);
            vertical.push(points.altitude_delta()?);
            horizontal.push(lateral);
            Ok(lateral)
        };

        let mut t = overlap.start;
        while t < overlap.end {
            let lateral = sample(t)?;
            t += dynamic_time_step(lateral);
        }
        sample(overlap.end)?;

        Self::new(times, vertical, horizontal)
    }

    pub fn time_window(&self) -> TimeWindow {
        self.window
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// `(time, horizontal_nm, vertical_ft)` for every sample
    pub fn samples(&self) -> impl Iterator<Item = (i64, f64, f64)> + '_ {
        self.times
            .iter()
            .zip(&self.horizontal_nm)
            .zip(&self.vertical_ft)
            .map(|((&t, &h), &v)| (t, h, v))
    }

    pub fn vertical_separation_at(&self, time: i64) -> Result<f64, SeparationError> {
        self.separation_at(&self.vertical_ft, time)
    }

    pub fn horizontal_separation_at(&self, time: i64) -> Result<f64, SeparationError> {
        self.separation_at(&self.horizontal_nm, time)
    }

    /// Vertical closure rate in feet per second
    pub fn vertical_closure_rate_at(&self, time: i64) -> Result<f64, SeparationError> {
        Ok(self.closure_rate_per_ms(&self.vertical_ft, time)? * MS_PER_SECOND)
    }

    /// Horizontal closure rate in knots
    pub fn horizontal_closure_rate_at(&self, time: i64) -> Result<f64, SeparationError> {
        Ok(self.closure_rate_per_ms(&self.horizontal_nm, time)? * MS_PER_HOUR)
    }

    /// Milliseconds until vertical separation reaches zero, if it is shrinking
    pub fn time_until_vertical_closure(&self, time: i64) -> Result<Option<i64>, SeparationError> {
        self.time_until_closure(&self.vertical_ft, time)
    }

    /// Milliseconds until horizontal separation reaches zero, if it is shrinking
    pub fn time_until_horizontal_closure(&self, time: i64) -> Result<Option<i64>, SeparationError> {
        self.time_until_closure(&self.horizontal_nm, time)
    }

    /// Projected vertical separation (ft) when the horizontal separation would close
    pub fn vertical_dist_at_horizontal_closure_time(&self, time: i64) -> Result<Option<f64>, SeparationError> {
        match self.time_until_horizontal_closure(time)? {
            Some(ms) => self.predicted_vertical_separation(time, ms).map(Some),
            None => Ok(None),
        }
    }

    /// Projected horizontal separation (NM) when the vertical separation would close
    pub fn horizontal_dist_at_vertical_closure_time(&self, time: i64) -> Result<Option<f64>, SeparationError> {
        match self.time_until_vertical_closure(time)? {
            Some(ms) => self.predicted_horizontal_separation(time, ms).map(Some),
            None => Ok(None),
        }
    }

    /// Vertical separation `step_ms` after `time`, extrapolating the current closure rate
    pub fn predicted_vertical_separation(&self, time: i64, step_ms: i64) -> Result<f64, SeparationError> {
        self.predicted_separation(&self.vertical_ft, time, step_ms)
    }

    /// Horizontal separation `step_ms` after `time`, extrapolating the current closure rate
    pub fn predicted_horizontal_separation(&self, time: i64, step_ms: i64) -> Result<f64, SeparationError> {
        self.predicted_separation(&self.horizontal_nm, time, step_ms)
    }

    /// Smallest sampled horizontal separation and the first time it occurs
    pub fn minimum_horizontal_separation(&self) -> (f64, i64) {
        let mut best = (self.horizontal_nm[0], self.times[0]);
        for (&h, &t) in self.horizontal_nm.iter().zip(&self.times).skip(1) {
            if h < best.0 {
                best = (h, t);
            }
        }
        best
    }

    fn check_window(&self, time: i64) -> Result<(), SeparationError> {
        if self.window.contains(time) {
            Ok(())
        } else {
            Err(SeparationError::OutsideWindow { time, start: self.window.start, end: self.window.end })
        }
    }

    fn separation_at(&self, values: &[f64], time: i64) -> Result<f64, SeparationError> {
        self.check_window(time)?;
        match self.times.binary_search(&time) {
            Ok(i) => Ok(values[i]),
            Err(i) => {
                let frac = TimeWindow::new(self.times[i - 1], self.times[i]).fraction_of_range(time);
                Ok(values[i - 1] + frac * (values[i] - values[i - 1]))
            }
        }
    }

    // Slope of the segment holding `time`; the last sample uses the final segment
    fn closure_rate_per_ms(&self, values: &[f64], time: i64) -> Result<f64, SeparationError> {
        self.check_window(time)?;
        let idx = match self.times.binary_search(&time) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let i = idx.min(self.times.len() - 2);
        let dt = (self.times[i + 1] - self.times[i]) as f64;
        Ok((values[i] - values[i + 1]) / dt)
    }

    fn time_until_closure(&self, values: &[f64], time: i64) -> Result<Option<i64>, SeparationError> {
        let current = self.separation_at(values, time)?;
        let rate = self.closure_rate_per_ms(values, time)?;
        Ok((rate > 0.0).then(|| (current / rate).round() as i64))
    }

    fn predicted_separation(&self, values: &[f64], time: i64, step_ms: i64) -> Result<f64, SeparationError> {
        if step_ms < 0 {
            return Err(SeparationError::NegativeStep(step_ms));
        }
        let rate = self.closure_rate_per_ms(values, time)?;
        let current = self.separation_at(values, time)?;
        Ok((current - rate * step_ms as f64).abs())
    }
}
