//! sholl CLI
//!
//! Samples segmented images into Sholl profiles and computes profile
//! statistics. Results are printed to stdout as JSON.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::needless_pass_by_value
)]

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use thiserror::Error;

use report::{SampleReport, StatsReport};
use sholl_core::{
    tabular, Calibration, Hemishell, RasterPoint, SamplingConfig, SpanIntegration, VoxelGrid,
};
use sholl_sampling::ProfileAssembler;
use sholl_stats::{
    Integrator, LinearProfileStats, NormalizedProfileStats, Normalizer, RegressionMethod,
};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Sholl(#[from] sholl_core::Error),
}

/// Combination of repeated samples per radius.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Integration {
    Mean,
    Median,
    Mode,
}

impl From<Integration> for SpanIntegration {
    fn from(value: Integration) -> Self {
        match value {
            Integration::Mean => Self::Mean,
            Integration::Median => Self::Median,
            Integration::Mode => Self::Mode,
        }
    }
}

/// Quadrature used for the mean value of the fit.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quadrature {
    Simpson,
    Romberg,
}

impl From<Quadrature> for Integrator {
    fn from(value: Quadrature) -> Self {
        match value {
            Quadrature::Simpson => Self::Simpson,
            Quadrature::Romberg => Self::Romberg,
        }
    }
}

/// Sholl analysis of segmented neuronal arbors.
#[derive(Parser)]
#[command(name = "sholl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a segmented 2D image into a Sholl profile
    Sample {
        /// Input image (any format the decoder understands)
        #[arg(long)]
        image: PathBuf,

        /// Focal point in pixels, as X,Y
        #[arg(long, value_parser = parse_center)]
        center: (i32, i32),

        /// First radius (defaults to one pixel)
        #[arg(long)]
        start: Option<f64>,

        /// Radius step (defaults to one pixel)
        #[arg(long)]
        step: Option<f64>,

        /// Last radius (defaults to the farthest image corner)
        #[arg(long)]
        end: Option<f64>,

        /// Lower bound of the foreground window
        #[arg(long, default_value = "1")]
        lower: f64,

        /// Upper bound of the foreground window
        #[arg(long, default_value = "255")]
        upper: f64,

        /// Samples per radius
        #[arg(long, default_value = "1")]
        spans: usize,

        /// How repeated samples are combined
        #[arg(long, value_enum, default_value = "mean")]
        integration: Integration,

        /// Restrict sampling to one half: north, south, east, west or none
        #[arg(long, default_value = "none")]
        hemishell: Hemishell,

        /// Keep single-pixel diagonal artifacts
        #[arg(long)]
        no_spike_suppression: bool,

        /// Physical pixel size
        #[arg(long, default_value = "1.0")]
        pixel_size: f64,

        /// Unit of the pixel size
        #[arg(long, default_value = "pixels")]
        unit: String,
    },

    /// Compute statistics of a profile stored as CSV
    Stats {
        /// Input CSV with a header line
        #[arg(long)]
        input: PathBuf,

        /// Heading of the radius column
        #[arg(long, default_value = "Radius")]
        radii_col: String,

        /// Heading of the count column
        #[arg(long, default_value = "Inters.")]
        counts_col: String,

        /// Fit a polynomial of this degree
        #[arg(long, conflicts_with = "best_fit")]
        degree: Option<usize>,

        /// Choose the polynomial degree with the best adjusted R²
        #[arg(long)]
        best_fit: bool,

        /// Lowest degree tried by --best-fit
        #[arg(long, default_value = "2")]
        min_degree: usize,

        /// Highest degree tried by --best-fit
        #[arg(long, default_value = "8")]
        max_degree: usize,

        /// Minimum R² accepted by --best-fit
        #[arg(long, default_value = "0.7")]
        r2_cutoff: f64,

        /// Minimum KS p-value accepted by --best-fit
        #[arg(long, default_value = "0.05")]
        p_cutoff: f64,

        /// Minimum number of points required for fitting
        #[arg(long)]
        min_fit_points: Option<usize>,

        /// Quadrature used for the mean value of the fit
        #[arg(long, value_enum, default_value = "simpson")]
        integrator: Quadrature,

        /// Normalizer: area, perimeter, annulus, volume, surface or shell
        #[arg(long)]
        normalizer: Option<Normalizer>,

        /// Regression method: auto, semi-log or log-log
        #[arg(long, default_value = "auto")]
        method: RegressionMethod,

        /// Count threshold of the enclosing radius
        #[arg(long, default_value = "1.0")]
        cutoff: f64,

        /// Explicit primary branch count for the ramification index
        #[arg(long)]
        primary_branches: Option<f64>,
    },
}

fn parse_center(s: &str) -> std::result::Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("invalid X '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("invalid Y '{y}': {e}"))?;
    Ok((x, y))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Sample {
            image,
            center,
            start,
            step,
            end,
            lower,
            upper,
            spans,
            integration,
            hemishell,
            no_spike_suppression,
            pixel_size,
            unit,
        } => {
            let mut config = SamplingConfig::new()
                .with_threshold(lower, upper)
                .with_spans(spans, integration.into())
                .with_hemishell(hemishell)
                .with_spike_suppression(!no_spike_suppression);
            config.start_radius = start;
            config.step_size = step;
            config.end_radius = end;
            let calibration = Calibration::new(pixel_size, pixel_size, 1.0).with_unit(unit);
            let report = sample(&image, center, config, calibration)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Stats {
            input,
            radii_col,
            counts_col,
            degree,
            best_fit,
            min_degree,
            max_degree,
            r2_cutoff,
            p_cutoff,
            min_fit_points,
            integrator,
            normalizer,
            method,
            cutoff,
            primary_branches,
        } => {
            let text = fs::read_to_string(&input)?;
            let profile = tabular::parse_csv(&text, &radii_col, &counts_col, None)?;
            info!("read {} rows from {}", profile.len(), input.display());

            let mut stats = LinearProfileStats::new(&profile)?;
            if let Some(n) = min_fit_points {
                stats.set_min_fit_points(n);
            }
            stats.set_primary_branches(primary_branches);
            if let Some(degree) = degree {
                if let Err(e) = stats.fit_polynomial(degree) {
                    warn!("polynomial fit skipped: {e}");
                }
            } else if best_fit {
                match stats.find_best_fit(min_degree, max_degree, r2_cutoff, p_cutoff) {
                    Ok(degree) => debug!("best fit degree: {degree}"),
                    Err(e) => warn!("best fit skipped: {e}"),
                }
            }

            let normalized = normalizer
                .map(|n| NormalizedProfileStats::with_method(&profile, n, method))
                .transpose()?;
            let report = StatsReport::new(&stats, integrator.into(), cutoff, normalized.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn sample(
    path: &Path,
    center: (i32, i32),
    config: SamplingConfig,
    calibration: Calibration,
) -> Result<SampleReport> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    info!("loaded {}x{} image {}", width, height, path.display());

    let grid = VoxelGrid::from_vec(width as usize, height as usize, 1, gray.into_raw())?
        .with_calibration(calibration);
    let center = RasterPoint::planar(center.0, center.1);
    let mut profile = ProfileAssembler::new(&grid, center, config)?.assemble()?;
    if let Some(name) = path.file_name() {
        profile.set_identifier(name.to_string_lossy());
    }
    Ok(SampleReport::new(&profile))
}
