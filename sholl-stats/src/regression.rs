//! Ordinary least-squares line with incremental add/remove of points.

#![allow(clippy::cast_precision_loss)]

/// Simple linear regression `y = intercept + slope * x`.
///
/// Sums are kept in centered form so points can be removed again, which
/// is how regressions are restricted to a sub-range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleRegression {
    sum_x: f64,
    sum_xx: f64,
    sum_y: f64,
    sum_yy: f64,
    sum_xy: f64,
    n: usize,
    x_bar: f64,
    y_bar: f64,
}

impl SimpleRegression {
    /// Creates an empty regression.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    pub fn add(&mut self, x: f64, y: f64) {
        if self.n == 0 {
            self.x_bar = x;
            self.y_bar = y;
        } else {
            let n = self.n as f64;
            let fact1 = 1.0 + n;
            let fact2 = n / (1.0 + n);
            let dx = x - self.x_bar;
            let dy = y - self.y_bar;
            self.sum_xx += dx * dx * fact2;
            self.sum_yy += dy * dy * fact2;
            self.sum_xy += dx * dy * fact2;
            self.x_bar += dx / fact1;
            self.y_bar += dy / fact1;
        }
        self.sum_x += x;
        self.sum_y += y;
        self.n += 1;
    }

    /// Removes one previously added observation.
    pub fn remove(&mut self, x: f64, y: f64) {
        match self.n {
            0 => {}
            1 => self.clear(),
            _ => {
                let n = self.n as f64;
                let fact1 = n - 1.0;
                let fact2 = n / (n - 1.0);
                let dx = x - self.x_bar;
                let dy = y - self.y_bar;
                self.sum_xx -= dx * dx * fact2;
                self.sum_yy -= dy * dy * fact2;
                self.sum_xy -= dx * dy * fact2;
                self.x_bar -= dx / fact1;
                self.y_bar -= dy / fact1;
                self.sum_x -= x;
                self.sum_y -= y;
                self.n -= 1;
            }
        }
    }

    /// Drops all observations.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of observations.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Slope (`NaN` with fewer than two points or no spread in x).
    #[must_use]
    pub fn slope(&self) -> f64 {
        if self.n < 2 || self.sum_xx.abs() < 10.0 * f64::MIN_POSITIVE {
            return f64::NAN;
        }
        self.sum_xy / self.sum_xx
    }

    /// Intercept.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        (self.sum_y - self.slope() * self.sum_x) / self.n as f64
    }

    /// Residual sum of squares.
    #[must_use]
    pub fn sum_squared_errors(&self) -> f64 {
        (self.sum_yy - self.sum_xy * self.sum_xy / self.sum_xx).max(0.0)
    }

    /// Total sum of squares about the mean of y.
    #[must_use]
    pub fn total_sum_squares(&self) -> f64 {
        if self.n < 2 {
            return f64::NAN;
        }
        self.sum_yy
    }

    /// Coefficient of determination.
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        let total = self.total_sum_squares();
        (total - self.sum_squared_errors()) / total
    }

    /// Pearson correlation coefficient, signed like the slope.
    #[must_use]
    pub fn r(&self) -> f64 {
        let r = self.r_squared().sqrt();
        if self.slope() < 0.0 {
            -r
        } else {
            r
        }
    }

    /// Predicted y at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept() + self.slope() * x
    }
}
