#![allow(clippy::uninlined_format_args)]
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn sholl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sholl"))
        .args(args)
        .output()
        .expect("failed to run sholl")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn write_csv(dir: &TempDir, name: &str, rows: &[(f64, f64)]) -> String {
    let mut text = String::from("Radius,Inters.\n");
    for (r, c) in rows {
        text.push_str(&format!("{},{}\n", r, c));
    }
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn write_arms(path: &Path) {
    let mut img = image::GrayImage::new(41, 41);
    for i in 20..41 {
        img.put_pixel(20, i, image::Luma([255]));
        img.put_pixel(i, 20, image::Luma([255]));
    }
    img.save(path).unwrap();
}

#[test]
fn test_sample_two_arms() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arms.png");
    write_arms(&path);

    let out = sholl(&[
        "sample",
        "--image",
        path.to_str().unwrap(),
        "--center",
        "20,20",
        "--start",
        "3",
        "--step",
        "1",
        "--end",
        "15",
    ]);
    let report = json(&out);
    let counts = report["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 13);
    assert!(counts.iter().all(|c| c.as_f64() == Some(2.0)), "{:?}", counts);
    assert_eq!(report["properties"]["dimensions"], "TwoD");
    assert_eq!(report["properties"]["identifier"], "arms.png");
}

#[test]
fn test_sample_rejects_center_outside_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arms.png");
    write_arms(&path);
    let out = sholl(&[
        "sample",
        "--image",
        path.to_str().unwrap(),
        "--center",
        "50,50",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid parameter"));
}

#[test]
fn test_stats_with_fit_and_normalization() {
    let dir = TempDir::new().unwrap();
    let counts = [3.0, 6.0, 9.0, 12.0, 13.0, 14.0, 12.0, 11.0, 9.0, 7.0, 6.0, 4.0];
    let rows: Vec<(f64, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| (10.0 * (i as f64 + 1.0), *c))
        .collect();
    let csv = write_csv(&dir, "profile.csv", &rows);

    let report = json(&sholl(&[
        "stats",
        "--input",
        &csv,
        "--degree",
        "3",
        "--normalizer",
        "annulus",
        "--method",
        "semi-log",
    ]));
    assert_eq!(report["n"], 12);
    assert_eq!(report["sampled"]["max"], 14.0);
    assert_eq!(report["sampled"]["sum"], 106.0);
    assert_eq!(report["fit"]["degree"], 3);
    assert_eq!(report["fit"]["description"], "3rd deg.");
    let r2 = report["fit"]["r_squared"].as_f64().unwrap();
    assert!(r2 > 0.9 && r2 <= 1.0, "{}", r2);
    assert_eq!(report["normalized"]["normalizer"], "Annulus");
    assert_eq!(report["normalized"]["method"], "Semi-log");
}

#[test]
fn test_stats_skips_fit_on_small_profile() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        &dir,
        "small.csv",
        &[(10.0, 5.0), (20.0, 8.0), (30.0, 6.0), (40.0, 3.0), (50.0, 1.0)],
    );
    let report = json(&sholl(&["stats", "--input", &csv, "--degree", "2"]));
    assert!(report["fit"].is_null());
    assert_eq!(report["sampled"]["mean"], 4.6);

    let relaxed = json(&sholl(&[
        "stats",
        "--input",
        &csv,
        "--degree",
        "2",
        "--min-fit-points",
        "3",
    ]));
    assert_eq!(relaxed["fit"]["degree"], 2);
}

#[test]
fn test_stats_reports_missing_column() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir, "profile.csv", &[(1.0, 2.0), (2.0, 3.0)]);
    let out = sholl(&["stats", "--input", &csv, "--radii-col", "Distance"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("parse error"));
}
