//! Generation of evenly spaced sampling radii.

use crate::error::{Error, Result};

/// Ascending, evenly spaced sequence of sampling radii.
///
/// `r_i = start + i * step` for every `i` such that `r_i <= end`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusSeries {
    radii: Vec<f64>,
    step: f64,
}

impl RadiusSeries {
    /// Generates the series for `(start, step, end)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if any value is NaN, `step <= 0`,
    /// `start < 0` or `end < start`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn generate(start: f64, step: f64, end: f64) -> Result<Self> {
        if start.is_nan() || step.is_nan() || end.is_nan() {
            return Err(Error::invalid(format!(
                "radii cannot be NaN: {start}, {step}, {end}"
            )));
        }
        if step <= 0.0 || end < start || start < 0.0 || !end.is_finite() {
            return Err(Error::invalid(format!(
                "invalid radii parameters: start={start}, step={step}, end={end}"
            )));
        }
        let size = ((end - start) / step).floor() as usize + 1;
        let radii = (0..size).map(|i| start + i as f64 * step).collect();
        Ok(Self { radii, step })
    }

    /// Wraps an explicit list of radii.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the list is empty, contains
    /// negative or NaN values, or is not strictly increasing.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::invalid("radii list cannot be empty"));
        }
        if values.iter().any(|r| r.is_nan() || *r < 0.0) {
            return Err(Error::invalid("radii must be non-negative numbers"));
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::invalid("radii must be strictly increasing"));
        }
        let step = if values.len() > 1 {
            (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64
        } else {
            0.0
        };
        Ok(Self {
            radii: values.to_vec(),
            step,
        })
    }

    /// Returns the radii as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.radii
    }

    /// Number of radii.
    #[must_use]
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// True if the series holds no radii.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Spacing between consecutive radii (mean spacing for explicit lists).
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// First radius.
    #[must_use]
    pub fn first(&self) -> Option<f64> {
        self.radii.first().copied()
    }

    /// Last radius.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.radii.last().copied()
    }

    /// Iterates over the radii.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.radii.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_basic() {
        let series = RadiusSeries::generate(10.0, 10.0, 50.0).unwrap();
        assert_eq!(series.as_slice(), &[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_generate_stops_below_end() {
        let series = RadiusSeries::generate(0.0, 3.0, 10.0).unwrap();
        assert_eq!(series.as_slice(), &[0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_generate_single_radius() {
        let series = RadiusSeries::generate(5.0, 1.0, 5.0).unwrap();
        assert_eq!(series.as_slice(), &[5.0]);
    }

    #[test]
    fn test_generate_rejects_invalid() {
        assert!(RadiusSeries::generate(10.0, 0.0, 20.0).is_err());
        assert!(RadiusSeries::generate(10.0, -1.0, 20.0).is_err());
        assert!(RadiusSeries::generate(20.0, 1.0, 10.0).is_err());
        assert!(RadiusSeries::generate(f64::NAN, 1.0, 10.0).is_err());
        assert!(matches!(
            RadiusSeries::generate(0.0, 1.0, f64::NAN),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_series_properties() {
        let (start, step, end) = (1.5, 0.25, 7.3);
        let series = RadiusSeries::generate(start, step, end).unwrap();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = ((end - start) / step).floor() as usize + 1;
        assert_eq!(series.len(), expected);
        assert_eq!(series.first(), Some(start));
        assert!(series.as_slice().windows(2).all(|w| w[1] > w[0]));
        assert!(series.last().unwrap() <= end);
    }

    #[test]
    fn test_from_values() {
        let series = RadiusSeries::from_values(&[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series.step() - 1.5).abs() < f64::EPSILON);
        assert!(RadiusSeries::from_values(&[2.0, 1.0]).is_err());
        assert!(RadiusSeries::from_values(&[]).is_err());
    }
}
