//! Case execution and orchestration.
//!
//! [`load_session`] turns the three JSON documents of a scoring run into a
//! mapped (and possibly tuned) [`ScoringSession`]. [`ScoringRunner`] drives
//! every case of a [`ScoringConfig`] through it and collects results.
//!
//! ```rust,ignore
//! use circuitscore_cli::{config::ScoringConfig, runner::ScoringRunner};
//!
//! let config = ScoringConfig::load("circuits/suite.yaml").unwrap();
//! let results = ScoringRunner::new(config).run_all();
//! for (suite_name, suite) in &results {
//!     println!("{}: {}/{} passed", suite_name, suite.passed, suite.passed + suite.failed);
//! }
//! ```

use crate::config::{ScoringCase, ScoringConfig, ScoringSuite};
use crate::report::{CaseResult, SuiteResult};
use circuitscore::data::{LibraryData, MappingData, TuningData};
use circuitscore::{CircuitError, ScoringSession};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Read and deserialize one JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, RunnerError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| RunnerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the library, map the circuit and apply the tuning, if any.
pub fn load_session(
    library: &Path,
    mapping: &Path,
    tuning: Option<&Path>,
) -> Result<ScoringSession, RunnerError> {
    let library_data: LibraryData = load_json(library)?;
    let mapping_data: MappingData = load_json(mapping)?;

    let mut session = ScoringSession::from_data(&library_data)?;
    session.map(&mapping_data)?;
    if let Some(path) = tuning {
        let tuning_data: TuningData = load_json(path)?;
        session.tune(&tuning_data)?;
    }
    debug!(
        library = %library.display(),
        mapping = %mapping.display(),
        gates = session.library().len(),
        "loaded session"
    );
    Ok(session)
}

/// Runs every case of a suite configuration.
pub struct ScoringRunner {
    config: ScoringConfig,
}

impl ScoringRunner {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Run all suites.
    pub fn run_all(&self) -> BTreeMap<String, SuiteResult> {
        self.config
            .suites
            .iter()
            .map(|(name, suite)| (name.clone(), self.run_suite(name, suite)))
            .collect()
    }

    /// Run one suite. Case failures are recorded, never propagated.
    pub fn run_suite(&self, suite_name: &str, suite: &ScoringSuite) -> SuiteResult {
        let mut cases = BTreeMap::new();
        let mut passed = 0;
        let mut failed = 0;

        for (case_name, case) in &suite.cases {
            let threshold = case.threshold(&self.config.global);
            let result = match self.run_case(case) {
                Ok(result) => result,
                Err(e) => {
                    warn!(suite = suite_name, case = %case_name, error = %e, "case failed");
                    CaseResult::from_error(threshold, e.to_string())
                }
            };
            if result.passed {
                passed += 1;
            } else {
                failed += 1;
            }
            cases.insert(case_name.clone(), result);
        }

        SuiteResult {
            description: suite.description.clone(),
            passed,
            failed,
            cases,
        }
    }

    /// Score a single case against its threshold.
    pub fn run_case(&self, case: &ScoringCase) -> Result<CaseResult, RunnerError> {
        let library = self.config.resolve(&case.library);
        let mapping = self.config.resolve(&case.mapping);
        let tuning = case.tuning.as_deref().map(|p| self.config.resolve(p));

        let session = load_session(&library, &mapping, tuning.as_deref())?;
        let breakdown = session.evaluate()?;
        Ok(CaseResult::from_breakdown(
            case.threshold(&self.config.global),
            breakdown,
        ))
    }
}
