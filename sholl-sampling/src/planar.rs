//! Circle sampling of a single image plane.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

use std::collections::HashSet;

use log::{debug, info};
use sholl_core::{
    Point, Profile, ProfileEntry, Raster, RasterPoint, Result, SamplingConfig, SpanIntegration,
};

use crate::bounds::Bounds;
use crate::circle::points_on_circle;
use crate::control::SamplingControl;
use crate::grouping::group_planar;

/// Combines repeated samples taken around one nominal radius.
///
/// An empty sample set yields 0.
#[allow(clippy::float_cmp)]
#[must_use]
pub fn combine_spans(samples: &[f64], integration: SpanIntegration) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    match integration {
        SpanIntegration::Mean => samples.iter().sum::<f64>() / samples.len() as f64,
        SpanIntegration::Median => {
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
        SpanIntegration::Mode => {
            // sorted ascending, so the first run of maximal length is the
            // smallest most frequent value
            let (mut best, mut best_len) = (sorted[0], 0usize);
            let mut i = 0;
            while i < sorted.len() {
                let run = sorted[i..].iter().take_while(|v| **v == sorted[i]).count();
                if run > best_len {
                    best = sorted[i];
                    best_len = run;
                }
                i += run;
            }
            best
        }
    }
}

/// Counts intersections on the plane `center.z` for every radius.
///
/// Each nominal radius is sampled `n_spans` times at integer radii
/// `R, R-1, ...` starting from `R = round(r / voxel + n_spans / 2)`, stopping
/// early below one pixel. The per-sample group counts are combined with the
/// configured [`SpanIntegration`]; the entry's points are the union of all
/// representatives in calibrated units.
///
/// # Errors
/// Propagates profile insertion errors (duplicate radii).
pub fn sample_planar<R: Raster + ?Sized>(
    raster: &R,
    center: RasterPoint,
    radii: &[f64],
    bounds: &Bounds,
    config: &SamplingConfig,
    control: &SamplingControl,
) -> Result<Profile> {
    let cal = raster.calibration();
    let voxel_size = cal.isotropic_size(1);
    let n_spans = config.n_spans.max(1);
    let z = center.z;
    let slice = usize::try_from(z).unwrap_or(0);

    let is_foreground = |x: i32, y: i32| -> bool {
        bounds.contains_xy(x, y)
            && match (usize::try_from(x), usize::try_from(y)) {
                (Ok(ux), Ok(uy)) => config.threshold.contains(raster.value(ux, uy, slice)),
                _ => false,
            }
    };
    let spike_filter = config.spike_suppression.then_some(&is_foreground);

    debug!(
        "sampling {} radii on slice {z}, {n_spans} sample(s) per radius",
        radii.len()
    );
    control.start(radii.len());

    let mut profile = Profile::new();
    for &radius in radii {
        if control.is_cancelled() {
            info!(
                "sampling cancelled after {} of {} radii",
                profile.len(),
                radii.len()
            );
            break;
        }

        let mut int_radius = (radius / voxel_size + (n_spans / 2) as f64).round() as i32;
        let mut samples = Vec::with_capacity(n_spans);
        let mut points: HashSet<Point> = HashSet::new();
        for _ in 0..n_spans {
            if int_radius < 1 {
                break;
            }
            let foreground: Vec<RasterPoint> = points_on_circle(
                RasterPoint::new(center.x, center.y, z),
                int_radius,
                bounds,
            )
            .into_iter()
            .filter(|p| is_foreground(p.x, p.y))
            .collect();
            let groups = group_planar(&foreground, spike_filter);
            samples.push(groups.len() as f64);
            points.extend(groups.iter().map(|p| p.to_world(&cal)));
            int_radius -= 1;
        }

        let count = combine_spans(&samples, config.span_integration);
        profile.add_entry(ProfileEntry {
            radius,
            count,
            points: Some(points),
        })?;
        control.advance();
    }
    Ok(profile)
}
