//! Parallel spherical-shell sampling of a volume.

use std::collections::HashSet;

use log::{debug, info};
use rayon::prelude::*;
use sholl_core::{Error, Point, Profile, ProfileEntry, Raster, Result};

use crate::control::SamplingControl;
use crate::grouping::group_sequential;
use crate::shell::ShellSampler;

/// Number of workers used when none is configured.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

fn sample_chunk<R: Raster + ?Sized>(
    sampler: &ShellSampler<'_, R>,
    radii: &[f64],
    control: &SamplingControl,
) -> Vec<ProfileEntry> {
    let mut entries = Vec::with_capacity(radii.len());
    for &radius in radii {
        if control.is_cancelled() {
            break;
        }
        let voxels = sampler.sample(radius);
        let points: HashSet<Point> = group_sequential(&voxels)
            .iter()
            .map(|p| p.to_world(sampler.calibration()))
            .collect();
        entries.push(ProfileEntry::with_points(radius, points));
        control.advance();
    }
    entries
}

/// Counts shell intersections for every radius.
///
/// Radii are split into `workers` contiguous chunks of
/// `ceil(len / workers)` radii; each chunk is processed sequentially by one
/// worker into its own buffer and the buffers are merged in radius order.
/// With one worker everything runs on the calling thread.
///
/// # Errors
/// Returns [`Error::ThreadPool`] if the worker pool cannot be created.
pub fn sample_volume<R: Raster + ?Sized>(
    sampler: &ShellSampler<'_, R>,
    radii: &[f64],
    workers: usize,
    control: &SamplingControl,
) -> Result<Profile> {
    let workers = workers.max(1);
    let chunk_size = radii.len().div_ceil(workers).max(1);
    debug!(
        "sampling {} shells with {workers} worker(s), {chunk_size} radii per chunk",
        radii.len()
    );
    control.start(radii.len());

    let chunks: Vec<Vec<ProfileEntry>> = if workers == 1 {
        vec![sample_chunk(sampler, radii, control)]
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        pool.install(|| {
            radii
                .par_chunks(chunk_size)
                .map(|chunk| sample_chunk(sampler, chunk, control))
                .collect()
        })
    };

    let mut profile = Profile::new();
    for entry in chunks.into_iter().flatten() {
        profile.add_entry(entry)?;
    }
    if control.is_cancelled() {
        info!(
            "sampling cancelled after {} of {} shells",
            profile.len(),
            radii.len()
        );
    }
    Ok(profile)
}
