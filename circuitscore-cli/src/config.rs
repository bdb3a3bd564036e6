//! YAML-based scoring suite configuration.
//!
//! A suite file groups named scoring cases. Each case points at a library,
//! a mapping and optionally a tuning document, all JSON, and may override
//! the pass threshold.
//!
//! # Configuration Structure
//!
//! ```yaml
//! global:
//!   base_dir: "."
//!   min_score: 0.5
//!
//! suites:
//!   samples:
//!     description: "Reference circuits"
//!     cases:
//!       and:
//!         description: "a AND b from three inverters"
//!         library: library.json
//!         mapping: and.json
//!         tuning: and_tuning.json
//!         min_score: 0.9
//! ```
//!
//! Relative `base_dir` values are resolved against the directory holding the
//! suite file, and case paths against `base_dir`.
//!
//! ```rust
//! use circuitscore_cli::config::ScoringConfig;
//!
//! let config = ScoringConfig::default_config();
//! assert!(config.suites.contains_key("samples"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    pub suites: BTreeMap<String, ScoringSuite>,
}

/// Settings shared by every case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Pass threshold for cases that do not set their own.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

fn default_base_dir() -> PathBuf { PathBuf::from(".") }
fn default_min_score() -> f64 { 0.5 }

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            min_score: default_min_score(),
        }
    }
}

/// A named group of cases (e.g. "samples", "regressions").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSuite {
    #[serde(default)]
    pub description: String,
    pub cases: BTreeMap<String, ScoringCase>,
}

/// One library + mapping (+ tuning) combination to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCase {
    #[serde(default)]
    pub description: String,
    pub library: PathBuf,
    pub mapping: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl ScoringCase {
    /// Threshold this case must reach, falling back to the global one.
    pub fn threshold(&self, global: &GlobalConfig) -> f64 {
        self.min_score.unwrap_or(global.min_score)
    }
}

impl ScoringConfig {
    /// Load configuration from a YAML file.
    ///
    /// A relative `base_dir` is rebased onto the file's own directory so the
    /// suite can be run from anywhere.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&contents)?;
        if config.global.base_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.global.base_dir = parent.join(&config.global.base_dir);
            }
        }
        Ok(config)
    }

    /// Write the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Resolve a case path against `global.base_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.global.base_dir.join(path)
        }
    }

    /// Default suite over the bundled sample circuits, run from the repo root.
    pub fn default_config() -> Self {
        Self {
            global: GlobalConfig {
                base_dir: PathBuf::from("circuits"),
                ..Default::default()
            },
            suites: default_suites(),
        }
    }
}

fn case(description: &str, mapping: &str, tuning: Option<&str>, min_score: f64) -> ScoringCase {
    ScoringCase {
        description: description.to_string(),
        library: PathBuf::from("library.json"),
        mapping: PathBuf::from(mapping),
        tuning: tuning.map(PathBuf::from),
        min_score: Some(min_score),
    }
}

fn default_suites() -> BTreeMap<String, ScoringSuite> {
    let mut cases = BTreeMap::new();
    cases.insert(
        "nor".to_string(),
        case("NOT(a OR b), promoter OR into P3_PhlF", "nor.json", None, 0.9),
    );
    cases.insert(
        "and".to_string(),
        case("a AND b from three inverters", "and.json", None, 0.9),
    );
    cases.insert(
        "and_tuned".to_string(),
        case("and with a stronger output promoter", "and.json", Some("and_tuning.json"), 0.9),
    );

    let mut suites = BTreeMap::new();
    suites.insert(
        "samples".to_string(),
        ScoringSuite {
            description: "Reference circuits on the bundled library".to_string(),
            cases,
        },
    );
    suites
}
