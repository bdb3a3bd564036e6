//! Score report generation and display.
//!
//! - [`ScoreReport`] - one scored mapping, as printed by `score`
//! - [`SuiteReport`] - every suite of a `run`
//!   - [`SuiteResult`] - results for one suite
//!     - [`CaseResult`] - score, threshold and per-output separation of a case
//!
//! Both reports print a colored terminal summary, a detailed per-output
//! table, and save as pretty JSON:
//!
//! ```rust,ignore
//! let report = SuiteReport::new(runner.run_all());
//! report.print_summary();
//! report.print_detailed();
//! report.save_json("report.json").unwrap();
//! ```

use circuitscore::{OutputSeparation, ResponseBounds, ResponseTable, ScoreBreakdown, TruthTable};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Result of scoring one mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub timestamp: String,
    pub library: String,
    pub mapping: String,
    pub tuning: Option<String>,
    pub score: f64,
    pub bounds: ResponseBounds,
    pub outputs: Vec<OutputSeparation>,
}

/// Full suite run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Timestamp of the run.
    pub timestamp: String,
    /// Git commit hash (if available).
    pub git_commit: Option<String>,
    pub suites: BTreeMap<String, SuiteResult>,
    pub summary: ReportSummary,
}

/// Summary of all case results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_cases: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    /// Mean score over the cases that produced one.
    pub mean_score: Option<f64>,
}

/// Result for a single suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub description: String,
    pub passed: usize,
    pub failed: usize,
    pub cases: BTreeMap<String, CaseResult>,
}

/// Result for a single case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub passed: bool,
    pub score: Option<f64>,
    pub min_score: f64,
    pub error: Option<String>,
    pub outputs: Vec<OutputSeparation>,
}

impl CaseResult {
    pub fn from_breakdown(min_score: f64, breakdown: ScoreBreakdown) -> Self {
        Self {
            passed: breakdown.score >= min_score,
            score: Some(breakdown.score),
            min_score,
            error: None,
            outputs: breakdown.outputs,
        }
    }

    pub fn from_error(min_score: f64, error: String) -> Self {
        Self {
            passed: false,
            score: None,
            min_score,
            error: Some(error),
            outputs: vec![],
        }
    }
}

impl ScoreReport {
    pub fn new(
        library: &Path,
        mapping: &Path,
        tuning: Option<&Path>,
        breakdown: ScoreBreakdown,
    ) -> Self {
        Self {
            timestamp: chrono_lite_timestamp(),
            library: library.display().to_string(),
            mapping: mapping.display().to_string(),
            tuning: tuning.map(|p| p.display().to_string()),
            score: breakdown.score,
            bounds: breakdown.bounds,
            outputs: breakdown.outputs,
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        write_json(path.as_ref(), self)
    }

    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(60).bold());
        println!("{}", " CIRCUIT SCORE ".bold().on_blue());
        println!("{}", "═".repeat(60).bold());
        println!("Library:  {}", self.library.dimmed());
        println!("Mapping:  {}", self.mapping.dimmed());
        if let Some(ref tuning) = self.tuning {
            println!("Tuning:   {}", tuning.dimmed());
        }
        println!("Bounds:   [{:.4}, {:.4}]", self.bounds.min, self.bounds.max);
        println!("{}", "─".repeat(60));
        println!("Score:    {}", format!("{:.6}", self.score).bold());
        println!("{}\n", "═".repeat(60).bold());
    }

    pub fn print_detailed(&self) {
        print_output_table(self.outputs.iter().map(|o| (None, o)));
    }
}

impl SuiteReport {
    pub fn new(suites: BTreeMap<String, SuiteResult>) -> Self {
        let mut total = 0;
        let mut passed = 0;
        let mut failed = 0;
        let mut scores = vec![];

        for suite in suites.values() {
            total += suite.passed + suite.failed;
            passed += suite.passed;
            failed += suite.failed;
            scores.extend(suite.cases.values().filter_map(|c| c.score));
        }

        let pass_rate = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };
        let mean_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            timestamp: chrono_lite_timestamp(),
            git_commit: get_git_commit(),
            suites,
            summary: ReportSummary {
                total_cases: total,
                passed,
                failed,
                pass_rate,
                mean_score,
            },
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        write_json(path.as_ref(), self)
    }

    /// Print human-readable summary to terminal.
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(60).bold());
        println!("{}", " CIRCUIT SCORING REPORT ".bold().on_blue());
        println!("{}", "═".repeat(60).bold());

        if let Some(ref commit) = self.git_commit {
            println!("Git commit: {}", commit.dimmed());
        }
        println!("Timestamp:  {}", self.timestamp.dimmed());
        println!();

        for (suite_name, suite) in &self.suites {
            let status = if suite.failed == 0 {
                "PASS".green().bold()
            } else {
                "FAIL".red().bold()
            };

            println!(
                "[{}] {} - {} ({}/{})",
                status,
                suite_name.bold(),
                suite.description.dimmed(),
                suite.passed,
                suite.passed + suite.failed
            );

            for (case_name, case) in &suite.cases {
                let case_status = if case.passed { "✓".green() } else { "✗".red() };
                match case.score {
                    Some(score) => println!(
                        "  {} {} | score {:.4} (min {:.2})",
                        case_status, case_name, score, case.min_score
                    ),
                    None => println!("  {} {}", case_status, case_name),
                }
                if let Some(ref err) = case.error {
                    println!("    {} {}", "Error:".red(), err);
                }
            }
            println!();
        }

        println!("{}", "─".repeat(60));
        let overall_status = if self.summary.failed == 0 {
            "ALL CASES PASSED".green().bold()
        } else {
            format!("{} CASES FAILED", self.summary.failed).red().bold()
        };
        println!(
            "{} | {}/{} passed ({:.1}%)",
            overall_status,
            self.summary.passed,
            self.summary.total_cases,
            self.summary.pass_rate * 100.0
        );
        println!("{}\n", "═".repeat(60).bold());
    }

    /// Print the per-output separation table of every scored case.
    pub fn print_detailed(&self) {
        let rows: Vec<(String, &OutputSeparation)> = self
            .suites
            .iter()
            .flat_map(|(suite_name, suite)| {
                suite.cases.iter().flat_map(move |(case_name, case)| {
                    case.outputs
                        .iter()
                        .map(move |o| (format!("{suite_name}/{case_name}"), o))
                })
            })
            .collect();
        print_output_table(rows.iter().map(|(label, o)| (Some(label.as_str()), *o)));
    }
}

fn print_output_table<'a>(outputs: impl Iterator<Item = (Option<&'a str>, &'a OutputSeparation)>) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct OutputRow {
        case: String,
        output: String,
        #[tabled(rename = "On min")]
        on_min: String,
        #[tabled(rename = "Off max")]
        off_max: String,
        #[tabled(rename = "Separation")]
        separation: String,
    }

    let rows: Vec<OutputRow> = outputs
        .map(|(case, o)| OutputRow {
            case: case.unwrap_or("-").to_string(),
            output: o.output.clone(),
            on_min: format!("{:.4}", o.on_min),
            off_max: format!("{:.4}", o.off_max),
            separation: format!("{:.4}", o.separation),
        })
        .collect();

    if !rows.is_empty() {
        println!("\nPer-output separation:\n{}", Table::new(rows));
    }
}

/// Print the ideal truth table next to the continuous responses, row by row.
pub fn print_signal_tables(
    inputs: &[String],
    rows: &[Vec<bool>],
    truth: &TruthTable,
    responses: Option<&ResponseTable>,
) {
    let bit = |b: bool| if b { "1" } else { "0" };
    let header: Vec<String> = inputs
        .iter()
        .chain(truth.columns.iter())
        .cloned()
        .chain(
            responses
                .into_iter()
                .flat_map(|r| r.columns.iter().map(|c| format!("{c} level"))),
        )
        .collect();
    println!("{}", header.join("\t").bold());

    for (i, (row, ideal)) in rows.iter().zip(&truth.rows).enumerate() {
        let mut cells: Vec<String> = row.iter().map(|&b| bit(b).to_string()).collect();
        cells.extend(ideal.iter().map(|&b| bit(b).to_string()));
        if let Some(levels) = responses.and_then(|r| r.rows.get(i)) {
            cells.extend(levels.iter().map(|l| format!("{l:.4}")));
        }
        println!("{}", cells.join("\t"));
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, json)
}

/// Seconds since the Unix epoch.
fn chrono_lite_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

/// Try to get the current git commit hash.
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}
