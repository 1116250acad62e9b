//! Sholl profile: an ordered radius → intersection-count mapping.

use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Hemishell, SpanIntegration};
use crate::error::{Error, Result};
use crate::point::Point;
use crate::raster::{Calibration, Threshold};

/// Dimensionality of the data a profile was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimensions {
    /// Not recorded (e.g. imported tables).
    #[default]
    Unknown,
    /// Planar image.
    TwoD,
    /// Volume.
    ThreeD,
}

/// Where a profile's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Source {
    /// Not recorded.
    #[default]
    Unset,
    /// Sampled from a segmented raster.
    Image,
    /// Imported from tabular data.
    Table,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            Self::Image => f.write_str("image"),
            Self::Table => f.write_str("table"),
        }
    }
}

/// Metadata describing how a profile was obtained.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfileProperties {
    /// Free-form label (usually the image title or file name).
    pub identifier: Option<String>,
    /// Data origin.
    pub source: Source,
    /// 2D or 3D.
    pub dimensions: Dimensions,
    /// Focal point in calibrated units.
    pub center: Option<Point>,
    /// Spatial calibration of the sampled raster.
    pub calibration: Option<Calibration>,
    /// Foreground window used while sampling.
    pub threshold: Option<Threshold>,
    /// Hemishell restriction used while sampling.
    pub hemishell: Hemishell,
    /// Samples per radius (2D).
    pub n_spans: usize,
    /// Combination of repeated samples (2D).
    pub span_integration: SpanIntegration,
}

/// One radius of a profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfileEntry {
    /// Sampling radius (calibrated units).
    pub radius: f64,
    /// Number of intersections at `radius`.
    pub count: f64,
    /// Representative intersection points, if recorded.
    pub points: Option<HashSet<Point>>,
}

impl ProfileEntry {
    /// Creates an entry without point data.
    #[must_use]
    pub fn new(radius: f64, count: f64) -> Self {
        Self {
            radius,
            count,
            points: None,
        }
    }

    /// Creates an entry whose count is the number of points.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_points(radius: f64, points: HashSet<Point>) -> Self {
        Self {
            radius,
            count: points.len() as f64,
            points: Some(points),
        }
    }
}

/// Radius-ordered collection of [`ProfileEntry`] values with unique radii.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile {
    entries: Vec<ProfileEntry>,
    properties: ProfileProperties,
}

impl Profile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from parallel radius and count slices.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the slices differ in length or
    /// contain invalid values, and [`Error::DuplicateRadius`] on repeated
    /// radii.
    pub fn from_data(radii: &[f64], counts: &[f64]) -> Result<Self> {
        if radii.len() != counts.len() {
            return Err(Error::invalid(format!(
                "{} radii but {} counts",
                radii.len(),
                counts.len()
            )));
        }
        let mut profile = Self::new();
        for (&radius, &count) in radii.iter().zip(counts) {
            profile.add(radius, count)?;
        }
        Ok(profile)
    }

    /// Adds a count without point data.
    ///
    /// # Errors
    /// See [`Profile::add_entry`].
    pub fn add(&mut self, radius: f64, count: f64) -> Result<()> {
        self.add_entry(ProfileEntry::new(radius, count))
    }

    /// Inserts an entry, keeping the profile sorted by radius.
    ///
    /// NaN counts are accepted so they can be trimmed later.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for a negative/NaN radius or a
    /// negative count, and [`Error::DuplicateRadius`] if the radius is
    /// already present.
    pub fn add_entry(&mut self, entry: ProfileEntry) -> Result<()> {
        if entry.radius.is_nan() || entry.radius < 0.0 {
            return Err(Error::invalid(format!(
                "radius must be non-negative: {}",
                entry.radius
            )));
        }
        if entry.count < 0.0 {
            return Err(Error::invalid(format!(
                "count must be non-negative: {}",
                entry.count
            )));
        }
        match self
            .entries
            .binary_search_by(|e| e.radius.total_cmp(&entry.radius))
        {
            Ok(_) => Err(Error::DuplicateRadius(entry.radius)),
            Err(pos) => {
                self.entries.insert(pos, entry);
                Ok(())
            }
        }
    }

    /// Entries in ascending radius order.
    #[must_use]
    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the profile has no entries or every count is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == self.zero_counts()
    }

    /// Number of entries with a zero count.
    #[must_use]
    pub fn zero_counts(&self) -> usize {
        self.entries.iter().filter(|e| e.count == 0.0).count()
    }

    /// Radii in ascending order.
    #[must_use]
    pub fn radii(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.radius).collect()
    }

    /// Counts in radius order.
    #[must_use]
    pub fn counts(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.count).collect()
    }

    /// True if any entry carries intersection points.
    #[must_use]
    pub fn has_points(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.points.as_ref().is_some_and(|p| !p.is_empty()))
    }

    /// Smallest radius.
    #[must_use]
    pub fn start_radius(&self) -> Option<f64> {
        self.entries.first().map(|e| e.radius)
    }

    /// Largest radius.
    #[must_use]
    pub fn end_radius(&self) -> Option<f64> {
        self.entries.last().map(|e| e.radius)
    }

    /// Mean spacing between consecutive radii (0 with fewer than two entries).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn step_size(&self) -> f64 {
        match (self.start_radius(), self.end_radius()) {
            (Some(first), Some(last)) if self.entries.len() > 1 => {
                (last - first) / (self.entries.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Count of the first entry whose radius lies in `[radius - step, radius + step)`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn count_at_radius(&self, radius: f64) -> Option<f64> {
        let step = self.step_size();
        self.entries
            .iter()
            .find(|e| {
                if step > 0.0 {
                    e.radius >= radius - step && e.radius < radius + step
                } else {
                    e.radius == radius
                }
            })
            .map(|e| e.count)
    }

    /// Removes entries at radius zero or with a zero count.
    pub fn trim_zero_entries(&mut self) {
        self.entries.retain(|e| e.radius != 0.0 && e.count != 0.0);
    }

    /// Removes entries with a NaN count.
    pub fn trim_nan_counts(&mut self) {
        self.entries.retain(|e| !e.count.is_nan());
    }

    /// Copy with zero and NaN entries removed; `self` is left untouched.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let mut copy = self.clone();
        copy.trim_zero_entries();
        copy.trim_nan_counts();
        copy
    }

    /// Rescales the profile: radii by the isotropic factor
    /// `cbrt(x * y * z)`, points and center per axis.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the isotropic factor is not
    /// positive.
    pub fn scale(&mut self, x_scale: f64, y_scale: f64, z_scale: f64) -> Result<()> {
        let isotropic = (x_scale * y_scale * z_scale).cbrt();
        if isotropic.is_nan() || isotropic <= 0.0 {
            return Err(Error::invalid(format!(
                "invalid scaling factors: {x_scale}, {y_scale}, {z_scale}"
            )));
        }
        if let Some(center) = self.properties.center.as_mut() {
            *center = center.scaled(x_scale, y_scale, z_scale);
        }
        for entry in &mut self.entries {
            entry.radius *= isotropic;
            if let Some(points) = entry.points.take() {
                entry.points = Some(
                    points
                        .into_iter()
                        .map(|p| p.scaled(x_scale, y_scale, z_scale))
                        .collect(),
                );
            }
        }
        Ok(())
    }

    /// Profile metadata.
    #[must_use]
    pub fn properties(&self) -> &ProfileProperties {
        &self.properties
    }

    /// Mutable profile metadata.
    pub fn properties_mut(&mut self) -> &mut ProfileProperties {
        &mut self.properties
    }

    /// Replaces the metadata.
    #[must_use]
    pub fn with_properties(mut self, properties: ProfileProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Shortcut for `properties().dimensions`.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.properties.dimensions
    }

    /// True if the profile was sampled from a planar image.
    #[must_use]
    pub fn is_2d(&self) -> bool {
        self.properties.dimensions == Dimensions::TwoD
    }

    /// Shortcut for `properties().identifier`.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.properties.identifier.as_deref()
    }

    /// Sets the identifier.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.properties.identifier = Some(identifier.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile::from_data(&[10.0, 20.0, 30.0, 40.0, 50.0], &[5.0, 8.0, 6.0, 3.0, 1.0]).unwrap()
    }

    #[test]
    fn test_entries_stay_sorted() {
        let mut profile = Profile::new();
        profile.add(30.0, 1.0).unwrap();
        profile.add(10.0, 2.0).unwrap();
        profile.add(20.0, 3.0).unwrap();
        assert_eq!(profile.radii(), vec![10.0, 20.0, 30.0]);
        assert_eq!(profile.counts(), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_duplicate_radius_rejected() {
        let mut profile = sample();
        assert_eq!(profile.add(20.0, 4.0), Err(Error::DuplicateRadius(20.0)));
        assert_eq!(profile.len(), 5);
        assert!(profile.add(-1.0, 1.0).is_err());
        assert!(profile.add(60.0, -1.0).is_err());
    }

    #[test]
    fn test_step_and_lookup() {
        let profile = sample();
        assert!((profile.step_size() - 10.0).abs() < f64::EPSILON);
        assert_eq!(profile.count_at_radius(21.0), Some(8.0));
        assert_eq!(profile.count_at_radius(100.0), None);
        assert_eq!(profile.start_radius(), Some(10.0));
        assert_eq!(profile.end_radius(), Some(50.0));
    }

    #[test]
    fn test_trimmed_leaves_original() {
        let mut profile = sample();
        profile.add(0.0, 3.0).unwrap();
        profile.add(60.0, 0.0).unwrap();
        profile.add(70.0, f64::NAN).unwrap();
        let trimmed = profile.trimmed();
        assert_eq!(trimmed.len(), 5);
        assert_eq!(profile.len(), 8);
        assert_eq!(profile.zero_counts(), 1);
    }

    #[test]
    fn test_is_empty_with_zero_counts() {
        assert!(Profile::new().is_empty());
        let zeros = Profile::from_data(&[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert!(zeros.is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn test_scale() {
        let mut profile = Profile::new();
        let points: HashSet<Point> = [Point::new(1.0, 1.0, 1.0)].into_iter().collect();
        profile
            .add_entry(ProfileEntry::with_points(2.0, points))
            .unwrap();
        profile.properties_mut().center = Some(Point::new(1.0, 2.0, 3.0));
        profile.scale(2.0, 2.0, 2.0).unwrap();
        assert!((profile.radii()[0] - 4.0).abs() < 1e-12);
        assert!(profile.has_points());
        assert_eq!(
            profile.properties().center,
            Some(Point::new(2.0, 4.0, 6.0))
        );
        assert!(profile.scale(0.0, 1.0, 1.0).is_err());
    }
}
