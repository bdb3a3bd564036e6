//! # CircuitScore CLI Library
//!
//! File loading, suite configuration and reporting around the
//! [`circuitscore`] scorer. The `gls-score-circuit` binary is a thin layer
//! over these modules; they can also be used directly:
//!
//! ```toml
//! [dependencies]
//! circuitscore-cli = { path = "../circuitscore-cli" }
//! ```
//!
//! ### Scoring files
//!
//! ```rust,ignore
//! use circuitscore_cli::runner::load_session;
//! use std::path::Path;
//!
//! let session = load_session(
//!     Path::new("circuits/library.json"),
//!     Path::new("circuits/and.json"),
//!     Some(Path::new("circuits/and_tuning.json")),
//! )?;
//! println!("score = {:.4}", session.score()?);
//! ```
//!
//! ### Suites
//!
//! ```rust,ignore
//! use circuitscore_cli::prelude::*;
//!
//! let config = ScoringConfig::load("circuits/suite.yaml")?;
//! let report = SuiteReport::new(ScoringRunner::new(config).run_all());
//! report.print_summary();
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! gls-score-circuit score -l library.json -m mapping.json [-t tuning.json]
//! gls-score-circuit truth-table -l library.json -m mapping.json
//! gls-score-circuit --config circuits/suite.yaml run --suite samples
//! gls-score-circuit --config circuits/suite.yaml list
//! gls-score-circuit --config suite.yaml init
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - YAML suite configuration
//! - [`runner`] - JSON loading and case orchestration
//! - [`report`] - JSON and terminal reporting

pub mod config;
pub mod report;
pub mod runner;

pub use config::{ConfigError, GlobalConfig, ScoringCase, ScoringConfig, ScoringSuite};
pub use report::{CaseResult, ReportSummary, ScoreReport, SuiteReport, SuiteResult};
pub use runner::{load_json, load_session, RunnerError, ScoringRunner};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::{GlobalConfig, ScoringCase, ScoringConfig, ScoringSuite};
    pub use crate::report::{CaseResult, ScoreReport, SuiteReport, SuiteResult};
    pub use crate::runner::{load_session, ScoringRunner};
}
