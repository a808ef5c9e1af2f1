// Ordinary least-squares fit of y against x with incremental observations
//
// Statistics are recomputed from centred sums on demand, which keeps
// fit-quality stable when x values are large offsets (such as timestamps).

#[derive(Debug, Clone, Default)]
pub struct SimpleRegression {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

struct Moments {
    n: f64,
    x_mean: f64,
    y_mean: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl SimpleRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    fn moments(&self) -> Moments {
        let n = self.xs.len() as f64;
        let x_mean = self.xs.iter().sum::<f64>() / n;
        let y_mean = self.ys.iter().sum::<f64>() / n;
        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for (x, y) in self.xs.iter().zip(&self.ys) {
            let dx = x - x_mean;
            let dy = y - y_mean;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        Moments { n, x_mean, y_mean, sxx, syy, sxy }
    }

    /// NaN with fewer than two observations or no spread in x
    pub fn slope(&self) -> f64 {
        if self.xs.len() < 2 {
            return f64::NAN;
        }
        let m = self.moments();
        if m.sxx == 0.0 {
            return f64::NAN;
        }
        m.sxy / m.sxx
    }

    pub fn intercept(&self) -> f64 {
        if self.xs.len() < 2 {
            return f64::NAN;
        }
        let m = self.moments();
        m.y_mean - (m.sxy / m.sxx) * m.x_mean
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept() + self.slope() * x
    }

    /// Proportion of variance explained (SSR / SST)
    ///
    /// NaN when undefined: fewer than two points, or zero variance in y, which
    /// is the zero-residual case.
    pub fn r_square(&self) -> f64 {
        if self.xs.len() < 2 {
            return f64::NAN;
        }
        let m = self.moments();
        if m.sxx == 0.0 || m.syy == 0.0 {
            return f64::NAN;
        }
        let ssr = m.sxy * m.sxy / m.sxx;
        ssr / m.syy
    }

    /// Residual sum of squares over `n - 2` degrees of freedom
    pub fn mean_square_error(&self) -> f64 {
        if self.xs.len() < 3 {
            return f64::NAN;
        }
        let m = self.moments();
        let sse = (m.syy - m.sxy * m.sxy / m.sxx).max(0.0);
        sse / (m.n - 2.0)
    }
}

/// Fit quality with the undefined (zero residual) case read as a perfect fit
pub fn fit_quality(regression: &SimpleRegression) -> f64 {
    let r2 = regression.r_square();
    if r2.is_finite() { r2 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let mut reg = SimpleRegression::new();
        for i in 0..5 {
            reg.add(i as f64, 3.0 + 2.0 * i as f64);
        }
        assert!((reg.slope() - 2.0).abs() < 1e-12);
        assert!((reg.intercept() - 3.0).abs() < 1e-12);
        assert!((reg.predict(10.0) - 23.0).abs() < 1e-12);
        assert!((reg.r_square() - 1.0).abs() < 1e-12);
        assert!(reg.mean_square_error().abs() < 1e-12);
    }

    #[test]
    fn test_flat_line_is_undefined_but_perfect() {
        let mut reg = SimpleRegression::new();
        for i in 0..5 {
            reg.add(i as f64, 7.0);
        }
        assert!(reg.r_square().is_nan());
        assert_eq!(fit_quality(&reg), 1.0);
        assert!((reg.predict(2.5) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_fit() {
        let mut reg = SimpleRegression::new();
        let ys = [1.0, 3.0, 2.0, 5.0, 4.0];
        for (i, y) in ys.iter().enumerate() {
            reg.add(i as f64, *y);
        }
        // sxx = 10, sxy = 8, syy = 10
        assert!((reg.slope() - 0.8).abs() < 1e-12);
        assert!((reg.r_square() - 0.64).abs() < 1e-12);
        assert!((reg.mean_square_error() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_large_offsets_are_stable() {
        let mut reg = SimpleRegression::new();
        let base = 1.6e12;
        for i in 0..7 {
            reg.add(base + 1_000.0 * i as f64, 5_000.0 + 10.0 * i as f64);
        }
        assert!((reg.r_square() - 1.0).abs() < 1e-9, "r2: {}", reg.r_square());
    }

    #[test]
    fn test_too_few_points() {
        let mut reg = SimpleRegression::new();
        reg.add(1.0, 1.0);
        assert!(reg.predict(1.0).is_nan());
        assert_eq!(fit_quality(&reg), 1.0);
    }
}
