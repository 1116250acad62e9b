#![allow(clippy::uninlined_format_args)]
use approx::{assert_abs_diff_eq, assert_relative_eq};
use sholl_core::{Dimensions, Error, Profile, ProfileProperties};
use sholl_stats::{
    CountSource, Integrator, LinearProfileStats, NormalizedProfileStats, Normalizer,
    RegressionMethod,
};

const RADII: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];
const COUNTS: [f64; 5] = [5.0, 8.0, 6.0, 3.0, 1.0];

fn planar(radii: &[f64], counts: &[f64]) -> Profile {
    Profile::from_data(radii, counts)
        .unwrap()
        .with_properties(ProfileProperties {
            dimensions: Dimensions::TwoD,
            ..ProfileProperties::default()
        })
}

/// Skewed arbor-like profile with 15 radii.
fn arbor() -> LinearProfileStats {
    let radii: Vec<f64> = (1..=15).map(|i| 10.0 * f64::from(i)).collect();
    let counts = [
        3.0, 6.0, 9.0, 12.0, 13.0, 14.0, 12.0, 11.0, 9.0, 7.0, 6.0, 4.0, 3.0, 2.0, 1.0,
    ];
    LinearProfileStats::from_data(&radii, &counts).unwrap()
}

#[test]
fn test_descriptive_statistics() {
    let stats = LinearProfileStats::new(&planar(&RADII, &COUNTS)).unwrap();
    let sampled = stats.sampled();
    assert_relative_eq!(sampled.mean(), 4.6);
    assert_relative_eq!(sampled.sum(), 23.0);
    assert_relative_eq!(sampled.max(), 8.0);
    let maxima = sampled.maxima();
    assert_eq!(maxima.len(), 1);
    assert_relative_eq!(maxima[0].radius, 20.0);
    assert_relative_eq!(sampled.median(), 5.0);
    assert_eq!(sampled.intersecting_radii(), 5);
    assert_relative_eq!(sampled.centroid().radius, 30.0);
    assert_relative_eq!(stats.primary_branches(), 5.0);
    assert_relative_eq!(stats.ramification_index(CountSource::Sampled).unwrap(), 1.6);
}

#[test]
fn test_small_dataset_refuses_fit() {
    let mut stats = LinearProfileStats::new(&planar(&RADII, &COUNTS)).unwrap();
    assert!(matches!(
        stats.fit_polynomial(2),
        Err(Error::InsufficientData(_))
    ));
    assert!(!stats.is_fitted());

    stats.set_min_fit_points(3);
    stats.fit_polynomial(2).unwrap();
    assert_eq!(stats.fitted_counts().unwrap().len(), 5);
    let r2 = stats.r_squared().unwrap();
    assert!((0.0..=1.0).contains(&r2), "r2 = {}", r2);
}

#[test]
fn test_empty_profile_is_rejected() {
    let empty = Profile::default();
    assert!(matches!(
        LinearProfileStats::new(&empty),
        Err(Error::InsufficientData(_))
    ));
    assert!(matches!(
        NormalizedProfileStats::new(&empty, Normalizer::Area),
        Err(Error::InsufficientData(_))
    ));
    let zeros = planar(&[1.0, 2.0], &[0.0, 0.0]);
    assert!(matches!(
        NormalizedProfileStats::new(&zeros, Normalizer::Area),
        Err(Error::InsufficientData(_))
    ));
}

#[test]
fn test_fitted_accessors_require_fit() {
    let stats = arbor();
    assert!(matches!(stats.fitted_counts(), Err(Error::FitNotPerformed)));
    assert!(matches!(stats.fitted(), Err(Error::FitNotPerformed)));
    assert!(matches!(stats.r_squared(), Err(Error::FitNotPerformed)));
    assert!(matches!(stats.critical_point(), Err(Error::FitNotPerformed)));
    assert!(matches!(
        stats.mean_value(Integrator::Simpson),
        Err(Error::FitNotPerformed)
    ));
    assert!(matches!(
        stats.ramification_index(CountSource::Fitted),
        Err(Error::FitNotPerformed)
    ));
    assert!(stats.view(CountSource::Sampled).is_ok());
}

#[test]
fn test_fit_is_idempotent() {
    let mut stats = arbor();
    stats.fit_polynomial(4).unwrap();
    let first = stats.fit().unwrap().clone();
    stats.fit_polynomial(4).unwrap();
    assert_eq!(stats.fit().unwrap(), &first);
}

#[test]
fn test_interpolating_fit_is_perfect() {
    let radii = [1.0, 2.0, 3.5, 4.0, 5.5, 6.0, 8.0];
    let counts = [2.0, 5.0, 4.0, 7.0, 3.0, 6.0, 1.0];
    let mut stats = LinearProfileStats::from_data(&radii, &counts).unwrap();
    stats.fit_polynomial(radii.len() - 1).unwrap();
    assert_abs_diff_eq!(stats.r_squared().unwrap(), 1.0, epsilon = 1e-6);
    for (f, c) in stats.fitted_counts().unwrap().iter().zip(counts) {
        assert_abs_diff_eq!(*f, c, epsilon = 1e-5);
    }
}

#[test]
fn test_fitted_metrics() {
    let mut stats = arbor();
    stats.fit_polynomial(3).unwrap();
    let cp = stats.critical_point().unwrap();
    assert!(cp.radius > 40.0 && cp.radius < 80.0, "{:?}", cp);
    assert!(cp.count >= stats.fitted().unwrap().max());

    let mean = stats.mean_value(Integrator::Simpson).unwrap();
    let romberg = stats.mean_value(Integrator::Romberg).unwrap();
    assert_relative_eq!(mean, romberg, epsilon = 1e-6);
    assert!(mean > 0.0 && mean < cp.count);

    let r2 = stats.r_squared().unwrap();
    assert!(stats.adjusted_r_squared().unwrap() <= r2);
    let p = stats.ks_test().unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_relative_eq!(
        stats.ramification_index(CountSource::Fitted).unwrap(),
        cp.count / stats.fitted_counts().unwrap()[0]
    );
    assert_eq!(stats.polynomial_as_string().unwrap(), "3rd deg.");
}

#[test]
fn test_best_fit_restores_winner() {
    let mut stats = arbor();
    let degree = stats.find_best_fit(2, 6, 0.5, 0.0).unwrap();
    assert!((2..=6).contains(&degree));
    assert_eq!(stats.polynomial_degree().unwrap(), degree);
    let best = stats.adjusted_r_squared().unwrap();
    for other in 2..=6 {
        let mut probe = arbor();
        probe.fit_polynomial(other).unwrap();
        assert!(probe.adjusted_r_squared().unwrap() <= best + 1e-12);
    }

    stats.fit_polynomial(2).unwrap();
    assert!(stats.find_best_fit(2, 6, 1.1, 0.0).is_err());
    assert_eq!(stats.polynomial_degree().unwrap(), 2);
}

#[test]
fn test_index_lookups() {
    let stats = LinearProfileStats::new(&planar(&RADII, &COUNTS)).unwrap();
    assert_eq!(stats.index_of_radius(35.0), Some(2));
    assert_eq!(stats.index_of_radius(5.0), None);
    assert_eq!(
        stats.index_of_inters(CountSource::Sampled, 7.0).unwrap(),
        Some(2)
    );
    assert_relative_eq!(stats.step_size(), 10.0);
    assert_relative_eq!(stats.start_radius(), 10.0);
    assert_relative_eq!(stats.end_radius(), 50.0);
}

#[test]
fn test_semi_log_profile_selects_semi_log() {
    let k = 0.15;
    let radii: Vec<f64> = (1..=20).map(f64::from).collect();
    let counts: Vec<f64> = radii
        .iter()
        .map(|r| 50.0 * Normalizer::Area.factor(*r, 1.0) * (-k * r).exp())
        .collect();
    let stats = NormalizedProfileStats::new(&planar(&radii, &counts), Normalizer::Area).unwrap();
    assert_eq!(stats.method(), RegressionMethod::SemiLog);
    assert!(stats.determination_ratio() >= 1.0);
    assert_relative_eq!(stats.r_squared(), 1.0, epsilon = 1e-10);
    assert_relative_eq!(stats.sholl_decay(), k, epsilon = 1e-10);
    assert_relative_eq!(stats.intercept(), 50.0_f64.ln(), epsilon = 1e-9);
    assert_relative_eq!(stats.r(), -1.0, epsilon = 1e-10);
}

#[test]
fn test_power_law_profile_selects_log_log() {
    let radii: Vec<f64> = (1..=20).map(f64::from).collect();
    let counts: Vec<f64> = radii
        .iter()
        .map(|r| 10.0 * Normalizer::Area.factor(*r, 1.0) * r.powf(-1.7))
        .collect();
    let stats = NormalizedProfileStats::new(&planar(&radii, &counts), Normalizer::Area).unwrap();
    assert_eq!(stats.method(), RegressionMethod::LogLog);
    assert!(stats.determination_ratio() < 1.0);
    assert_relative_eq!(stats.sholl_decay(), 1.7, epsilon = 1e-10);
}

#[test]
fn test_restricted_regression() {
    // exponential decay with an outlier at the last radius
    let radii: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut counts: Vec<f64> = radii
        .iter()
        .map(|r| 1000.0 * Normalizer::Area.factor(*r, 1.0) * (-0.3 * r).exp())
        .collect();
    counts[9] *= 5.0;
    let mut stats = NormalizedProfileStats::with_method(
        &planar(&radii, &counts),
        Normalizer::Area,
        RegressionMethod::SemiLog,
    )
    .unwrap();
    assert!(stats.r_squared() < 1.0 - 1e-6);

    stats.restrict_to_range(1.0, 9.0);
    assert_eq!(stats.regression().n(), 9);
    assert_relative_eq!(stats.r_squared(), 1.0, epsilon = 1e-10);
    assert_relative_eq!(stats.sholl_decay(), 0.3, epsilon = 1e-10);

    stats.restrict_to_range(2.5, 9.5);
    assert_eq!(stats.regression().n(), 8);

    stats.restrict_to_percentile(10.0, 90.0);
    assert!(stats.regression().n() < 10);

    stats.reset_regression();
    assert_eq!(stats.regression().n(), 10);
    assert_eq!(stats.fitted_y_values().len(), 10);
}

#[test]
fn test_volumetric_normalizers() {
    let radii: Vec<f64> = (1..=12).map(f64::from).collect();
    let counts: Vec<f64> = radii
        .iter()
        .map(|r| 5.0 * Normalizer::SphericalShell.factor(*r, 1.0) * (-0.2 * r).exp())
        .collect();
    let profile = Profile::from_data(&radii, &counts)
        .unwrap()
        .with_properties(ProfileProperties {
            dimensions: Dimensions::ThreeD,
            ..ProfileProperties::default()
        });
    let stats = NormalizedProfileStats::with_method(
        &profile,
        Normalizer::SphericalShell,
        RegressionMethod::SemiLog,
    )
    .unwrap();
    assert!(stats.is_3d_normalizer());
    assert_eq!(stats.normalizer_description(), "Spherical shell");
    assert_relative_eq!(stats.sholl_decay(), 0.2, epsilon = 1e-10);
}
