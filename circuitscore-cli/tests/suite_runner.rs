//! Suite loading, case execution and report output against real files.

use circuitscore::CircuitError;
use circuitscore_cli::prelude::*;
use circuitscore_cli::{load_session, RunnerError};
use std::fs;
use std::path::{Path, PathBuf};

fn circuits_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../circuits")
}

/// Copy the sample documents into a fresh temp dir.
fn sample_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["library.json", "nor.json", "and.json", "and_tuning.json", "crosstalk.json"] {
        fs::copy(circuits_dir().join(name), dir.path().join(name)).unwrap();
    }
    dir
}

#[test]
fn bundled_suite_passes() {
    let config = ScoringConfig::load(circuits_dir().join("suite.yaml")).unwrap();
    let results = ScoringRunner::new(config).run_all();
    let samples = &results["samples"];
    assert_eq!(samples.failed, 0, "{:?}", samples.cases);
    assert_eq!(samples.passed, 3);
    for case in samples.cases.values() {
        assert!(case.score.unwrap() >= 0.9);
        assert_eq!(case.outputs.len(), 1);
    }
}

#[test]
fn base_dir_is_relative_to_config_file() {
    let dir = sample_dir();
    let yaml = r#"
global:
  base_dir: "."
suites:
  s:
    cases:
      nor:
        library: library.json
        mapping: nor.json
"#;
    let path = dir.path().join("suite.yaml");
    fs::write(&path, yaml).unwrap();

    let config = ScoringConfig::load(&path).unwrap();
    assert_eq!(config.global.base_dir, dir.path().join("."));
    let result = ScoringRunner::new(config).run_all();
    assert_eq!(result["s"].passed, 1);
}

#[test]
fn default_config_finds_bundled_circuits_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut config = ScoringConfig::default_config();
    config.global.base_dir = repo_root.join(&config.global.base_dir);

    let results = ScoringRunner::new(config).run_all();
    let samples = &results["samples"];
    assert_eq!(samples.failed, 0, "{:?}", samples.cases);
    assert_eq!(samples.passed, 3);
}

#[test]
fn failing_cases_are_recorded_not_raised() {
    let dir = sample_dir();
    let mut config = ScoringConfig::default_config();
    config.global.base_dir = dir.path().to_path_buf();
    let suite = config.suites.get_mut("samples").unwrap();
    suite.cases.insert(
        "crosstalk".into(),
        ScoringCase {
            description: String::new(),
            library: "library.json".into(),
            mapping: "crosstalk.json".into(),
            tuning: None,
            min_score: None,
        },
    );
    suite.cases.insert(
        "missing".into(),
        ScoringCase {
            description: String::new(),
            library: "library.json".into(),
            mapping: "nope.json".into(),
            tuning: None,
            min_score: None,
        },
    );
    suite.cases.get_mut("nor").unwrap().min_score = Some(1.5);

    let results = ScoringRunner::new(config).run_all();
    let samples = &results["samples"];
    assert_eq!(samples.passed, 2);
    assert_eq!(samples.failed, 3);

    let crosstalk = &samples.cases["crosstalk"];
    assert_eq!(crosstalk.score, None);
    assert_eq!(
        crosstalk.error.as_deref(),
        Some(CircuitError::CrossTalkDetected("PhlF".into()).to_string().as_str())
    );
    assert!(samples.cases["missing"].error.as_ref().unwrap().contains("nope.json"));

    // Scored, but below an unreachable threshold.
    let nor = &samples.cases["nor"];
    assert!(!nor.passed);
    assert!(nor.score.is_some() && nor.error.is_none());
}

#[test]
fn load_session_applies_tuning() {
    let dir = circuits_dir();
    let untuned = load_session(&dir.join("library.json"), &dir.join("and.json"), None).unwrap();
    let tuned = load_session(
        &dir.join("library.json"),
        &dir.join("and.json"),
        Some(&dir.join("and_tuning.json")),
    )
    .unwrap();
    assert!(tuned.library().gate("P3_PhlF").unwrap().is_tuned());
    assert_ne!(tuned.score().unwrap(), untuned.score().unwrap());
}

#[test]
fn bad_json_names_the_file() {
    let dir = sample_dir();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{\"gates\": [").unwrap();
    let err = load_session(&dir.path().join("library.json"), &broken, None).unwrap_err();
    assert!(matches!(err, RunnerError::Json { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn default_config_round_trips_through_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    let config = ScoringConfig::default_config();
    config.save(&path).unwrap();

    let mut loaded = ScoringConfig::load(&path).unwrap();
    assert_eq!(loaded.global.base_dir, dir.path().join("circuits"));
    loaded.global.base_dir = config.global.base_dir.clone();
    assert_eq!(loaded, config);
}

#[test]
fn suite_report_saves_json() {
    let config = ScoringConfig::load(circuits_dir().join("suite.yaml")).unwrap();
    let report = SuiteReport::new(ScoringRunner::new(config).run_all());
    assert_eq!(report.summary.total_cases, 3);
    assert!(report.summary.mean_score.unwrap() > 0.9);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/report.json");
    report.save_json(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["summary"]["passed"], 3);
    assert!(json["suites"]["samples"]["cases"]["and"]["outputs"][0]["separation"].is_number());
}

#[test]
fn score_report_records_sources() {
    let dir = circuits_dir();
    let library = dir.join("library.json");
    let mapping = dir.join("nor.json");
    let session = load_session(&library, &mapping, None).unwrap();
    let report = ScoreReport::new(&library, &mapping, None, session.evaluate().unwrap());
    assert!(report.mapping.ends_with("nor.json"));
    assert!(report.tuning.is_none());
    assert_eq!(report.outputs[0].output, "y");

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("score.json");
    report.save_json(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!((json["score"].as_f64().unwrap() - report.score).abs() < 1e-12);
}
