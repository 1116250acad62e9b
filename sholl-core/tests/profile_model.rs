use approx::assert_relative_eq;
use sholl_core::{tabular, Error, Profile, RadiusSeries, SamplingConfig, SpanIntegration};

#[test]
fn test_radius_series_consecutive_differences() {
    let series = RadiusSeries::generate(0.5, 0.5, 10.0).unwrap();
    assert_eq!(series.len(), 20);
    assert_eq!(series.first(), Some(0.5));
    for pair in series.as_slice().windows(2) {
        assert_relative_eq!(pair[1] - pair[0], 0.5, epsilon = 1e-12);
    }
}

#[test]
fn test_table_import_feeds_profile() {
    let text = "Radius (mm)\tInters.\n0\t0\n1.5\t3\n3.0\t4\n4.5\t0\n6.0\t2\n";
    let profile = tabular::parse_csv(text, "Radius (mm)", "Inters.", None).unwrap();
    assert_eq!(profile.len(), 5);
    assert_relative_eq!(profile.step_size(), 1.5);

    let trimmed = profile.trimmed();
    assert_eq!(trimmed.radii(), vec![1.5, 3.0, 6.0]);
    assert_eq!(profile.len(), 5);
    assert_eq!(
        profile.properties().calibration.as_ref().map(|c| c.unit.as_str()),
        Some("mm")
    );
}

#[test]
fn test_duplicate_rows_are_rejected() {
    let text = "r,n\n1,2\n1,3\n";
    assert_eq!(
        tabular::parse_csv(text, "r", "n", None),
        Err(Error::DuplicateRadius(1.0))
    );
}

#[test]
fn test_mismatched_columns() {
    assert!(matches!(
        Profile::from_data(&[1.0, 2.0], &[1.0]),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_config_defaults() {
    let config = SamplingConfig::default();
    assert_eq!(config.n_spans, 1);
    assert_eq!(config.span_integration, SpanIntegration::Mean);
    assert!(config.spike_suppression);
    assert!(config.skip_single_voxels);
    assert!(config.workers.is_none());
}
