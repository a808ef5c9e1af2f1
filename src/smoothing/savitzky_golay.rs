// Savitzky-Golay smoothing for uniformly time-stepped signals
//
// Convolution coefficients come from a weighted least-squares polynomial fit
// over a fixed odd-length window: C = (J^T W J)^-1 J^T W. Row 0 of C smooths,
// row 1 estimates the first derivative. C is solved once per filter.

use nalgebra as na;
use na::DMatrix;

use crate::error::FilterConfigError;

/// Default polynomial order of the local fit
pub const DEFAULT_ORDER: usize = 1;

/// Default window weights; the centre of the window counts the most
pub const DEFAULT_WEIGHTS: [f64; 13] = [1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 2.0, 2.0, 1.0, 1.0, 1.0];

/// A smoother over a signal sampled at a fixed time step
pub trait FixedStepDigitalFilter {
    /// Noise-reduced copy of `input`
    fn smooth(&self, input: &[f64]) -> Vec<f64>;

    /// First derivative of `input` in units of signal per unit of time step
    fn smooth_derivative(&self, input: &[f64]) -> Vec<f64>;
}

#[derive(Debug, Clone)]
pub struct SavitzkyGolayFilter {
    time_step: f64,
    order: usize,
    smooth_coeff: Vec<f64>,
    deriv_coeff: Vec<f64>,
}

impl SavitzkyGolayFilter {
    /// Filter with the default order and weights
    ///
    /// # Arguments
    /// * `time_step` - Spacing between samples. The derivative is divided by this,
    ///   so pass 1/60 with minute-based signals to get per-minute rates, and so on.
    pub fn new(time_step: f64) -> Result<Self, FilterConfigError> {
        Self::with_weights(time_step, DEFAULT_ORDER, &DEFAULT_WEIGHTS)
    }

    pub fn with_weights(
        time_step: f64,
        order: usize,
        weights: &[f64],
    ) -> Result<Self, FilterConfigError> {
        if !(time_step > 0.0) || !time_step.is_finite() {
            return Err(FilterConfigError::NonPositiveTimeStep(time_step));
        }
        if order < 1 {
            return Err(FilterConfigError::InvalidOrder(order));
        }
        if weights.len() % 2 == 0 {
            return Err(FilterConfigError::EvenWeightCount(weights.len()));
        }
        if weights.len() < order + 1 {
            return Err(FilterConfigError::WindowTooShort { len: weights.len(), order });
        }
        if let Some(&w) = weights.iter().find(|w| !(**w > 0.0) || !w.is_finite()) {
            return Err(FilterConfigError::NonPositive { name: "weight", value: w });
        }

        let c = solve_for_coefficients(weights, order)?;

        Ok(SavitzkyGolayFilter {
            time_step,
            order,
            smooth_coeff: c.row(0).iter().copied().collect(),
            deriv_coeff: c.row(1).iter().copied().collect(),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn window_len(&self) -> usize {
        self.smooth_coeff.len()
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    fn convolve_at(coeff: &[f64], input: &[f64], center: usize) -> f64 {
        let half = coeff.len() / 2;
        coeff
            .iter()
            .zip(&input[center - half..=center + half])
            .map(|(c, x)| c * x)
            .sum()
    }

    // Signals shorter than the window get their mean slope everywhere
    fn average_derivative(&self, input: &[f64]) -> Vec<f64> {
        if input.len() < 2 {
            return vec![0.0; input.len()];
        }
        let total: f64 = input.windows(2).map(|w| w[1] - w[0]).sum();
        let slope = (total / (input.len() - 1) as f64) / self.time_step;
        vec![slope; input.len()]
    }
}

fn solve_for_coefficients(weights: &[f64], order: usize) -> Result<DMatrix<f64>, FilterConfigError> {
    let window = weights.len();
    let cols = order + 1;
    let offset = -((window / 2) as f64);

    let j = DMatrix::from_fn(window, cols, |row, col| (row as f64 + offset).powi(col as i32));
    let w = DMatrix::from_diagonal(&na::DVector::from_column_slice(weights));

    let jt_w = j.transpose() * &w;
    let normal = &jt_w * &j;
    let inverse = normal.try_inverse().ok_or(FilterConfigError::SingularSystem)?;

    Ok(inverse * jt_w)
}

impl FixedStepDigitalFilter for SavitzkyGolayFilter {
    fn smooth(&self, input: &[f64]) -> Vec<f64> {
        let n = self.window_len();
        if input.len() < n {
            return input.to_vec();
        }
        let half = n / 2;
        let mut out = input.to_vec();
        for (i, value) in out.iter_mut().enumerate().take(input.len() - half).skip(half) {
            *value = Self::convolve_at(&self.smooth_coeff, input, i);
        }
        out
    }

    fn smooth_derivative(&self, input: &[f64]) -> Vec<f64> {
        let n = self.window_len();
        if input.len() < n {
            return self.average_derivative(input);
        }
        let half = n / 2;
        let last_interior = input.len() - half - 1;
        let mut out = vec![0.0; input.len()];
        for i in half..=last_interior {
            out[i] = Self::convolve_at(&self.deriv_coeff, input, i) / self.time_step;
        }
        let (head, tail) = (out[half], out[last_interior]);
        out[..half].fill(head);
        out[last_interior + 1..].fill(tail);
        out
    }
}
