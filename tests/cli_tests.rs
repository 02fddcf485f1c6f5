//! CLI integration tests
//!
//! These run the `flk` binary against copies of the fixtures in a temporary
//! directory, so config discovery never sees a real flamekit.toml.

use flamekit::parser::parse_flames;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Temp dir holding a copy of `fixture`.
fn workspace(fixture: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("should create temp dir");
    let path = temp.path().join(fixture);
    fs::copy(fixture_path(fixture), &path).expect("should copy fixture");
    (temp, path)
}

fn flk(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flk"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("HOME", dir)
        .output()
        .expect("Failed to execute flk")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ========== fmt ==========

#[test]
fn test_fmt_migrates_legacy_file_in_place() {
    let (temp, path) = workspace("apophysis.flame");
    let output = flk(temp.path(), &["fmt", "apophysis.flame"]);
    assert!(output.status.success(), "fmt failed: {}", stderr(&output));
    assert!(stderr(&output).contains("formatted"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<flames version=\"flamekit "));
    assert!(!text.contains("zoom="));
    assert!(!text.contains("symmetry="));
    assert!(temp.path().join("apophysis.bak").exists());
}

#[test]
fn test_fmt_check_reports_without_writing() {
    let (temp, path) = workspace("apophysis.flame");
    let before = fs::read_to_string(&path).unwrap();
    let output = flk(temp.path(), &["fmt", "--check", "apophysis.flame"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("needs formatting"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_fmt_glob_and_output() {
    let (temp, _) = workspace("spiral.flame");
    let output = flk(temp.path(), &["fmt", "*.flame", "-o", "out/spiral.flame", "--no-backup"]);
    assert!(output.status.success(), "fmt failed: {}", stderr(&output));
    let written = fs::read_to_string(temp.path().join("out/spiral.flame")).unwrap();
    assert_eq!(parse_flames(&written).unwrap().len(), 2);
}

#[test]
fn test_fmt_unmatched_glob_is_invalid_args() {
    let temp = TempDir::new().unwrap();
    let output = flk(temp.path(), &["fmt", "*.flame"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_fmt_missing_file_is_error() {
    let temp = TempDir::new().unwrap();
    let output = flk(temp.path(), &["fmt", "missing.flame"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot read"));
}

// ========== info / variations ==========

#[test]
fn test_info_text() {
    let (temp, _) = workspace("spiral.flame");
    let output = flk(temp.path(), &["info", "spiral.flame"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("2 flame(s) (needs conversion)"));
    assert!(out.contains("xforms:     2 + final"));
    assert!(out.contains("variations: linear, spherical, julia, blob"));
}

#[test]
fn test_info_json() {
    let (temp, _) = workspace("apophysis.flame");
    let output = flk(temp.path(), &["info", "--json", "apophysis.flame"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("info --json should print JSON");
    assert_eq!(report["needs_conversion"], true);
    let flame = &report["flames"][0];
    assert_eq!(flame["name"], "sunflower");
    assert_eq!(flame["xforms"], 3);
    assert_eq!(flame["final"], true);
    assert_eq!(flame["legacy"], false);
}

#[test]
fn test_variations_lists_catalog() {
    let temp = TempDir::new().unwrap();
    let output = flk(temp.path(), &["variations"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("  0 linear\n"));
    assert_eq!(out.lines().count(), flamekit::variations::VARIATIONS.len());
}

// ========== palette ==========

#[test]
fn test_palette_seed_and_preview() {
    let (temp, path) = workspace("spiral.flame");
    let output = flk(temp.path(), &["palette", "spiral.flame", "--seed", "ff0000", "--preview", "strip.png"]);
    assert!(output.status.success(), "palette failed: {}", stderr(&output));

    let flames = parse_flames(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(flames.iter().all(|f| f.gradient[128] == [255, 0, 0]));
    let strip = image::open(temp.path().join("strip.png")).unwrap().to_rgb8();
    assert_eq!(strip.width(), 256);
    assert_eq!(strip.get_pixel(128, 0).0, [255, 0, 0]);
}

#[test]
fn test_palette_reverse_to_output() {
    let (temp, path) = workspace("spiral.flame");
    let output = flk(temp.path(), &["palette", "spiral.flame", "--reverse", "-o", "reversed.flame"]);
    assert!(output.status.success());

    let original = parse_flames(&fs::read_to_string(&path).unwrap()).unwrap();
    let reversed = parse_flames(&fs::read_to_string(temp.path().join("reversed.flame")).unwrap()).unwrap();
    assert_eq!(reversed[0].gradient[0], original[0].gradient[255]);
}

#[test]
fn test_palette_bad_seed_is_invalid_args() {
    let (temp, _) = workspace("spiral.flame");
    let output = flk(temp.path(), &["palette", "spiral.flame", "--seed", "red"]);
    assert_eq!(output.status.code(), Some(2));
}

// ========== symmetry / new ==========

#[test]
fn test_symmetry_adds_xforms() {
    let (temp, path) = workspace("spiral.flame");
    let output = flk(temp.path(), &["symmetry", "spiral.flame", "--kind", "-3"]);
    assert!(output.status.success(), "symmetry failed: {}", stderr(&output));

    let flames = parse_flames(&fs::read_to_string(&path).unwrap()).unwrap();
    // one reflection plus two rotations
    assert_eq!(flames[0].xforms().len(), 5);
    assert_eq!(flames[1].xforms().len(), 4);
}

#[test]
fn test_new_uses_config_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("flamekit.toml"), "[defaults]\nsize = [300, 200]\n").unwrap();
    let output = flk(temp.path(), &["new", "batch.flame", "-n", "2", "--xforms", "4", "--seed", "9"]);
    assert!(output.status.success(), "new failed: {}", stderr(&output));

    let flames = parse_flames(&fs::read_to_string(temp.path().join("batch.flame")).unwrap()).unwrap();
    assert_eq!(flames.len(), 2);
    assert_eq!(flames[0].name, "batch_001");
    assert_eq!(flames[0].size, (300, 200));
    assert_eq!(flames[1].xforms().len(), 4);
}

#[test]
fn test_new_quality_flag() {
    let temp = TempDir::new().unwrap();
    let output = flk(temp.path(), &["new", "q.flame", "--quality", "250", "--log-level", "debug"]);
    assert!(output.status.success(), "new failed: {}", stderr(&output));
    let flames = parse_flames(&fs::read_to_string(temp.path().join("q.flame")).unwrap()).unwrap();
    assert_eq!(flames[0].extra.number("quality"), 250.0);
}

#[test]
fn test_non_positive_quality_is_invalid_args() {
    let temp = TempDir::new().unwrap();
    let output = flk(temp.path(), &["new", "q.flame", "--quality", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("defaults.quality"));
    assert!(!temp.path().join("q.flame").exists());
}

#[test]
fn test_invalid_config_is_error() {
    let (temp, _) = workspace("spiral.flame");
    fs::write(temp.path().join("flamekit.toml"), "[palette]\ndist = 500\n").unwrap();
    let output = flk(temp.path(), &["info", "spiral.flame"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("palette.dist"));
}
