//! Genetic circuit scoring CLI.
//!
//! Score how well a gate assignment reproduces its circuit's truth table.
//!
//! # Usage
//!
//! ```bash
//! # Score one mapping
//! gls-score-circuit score -l library.json -m mapping.json -t tuning.json
//!
//! # Show the ideal truth table and the predicted output levels
//! gls-score-circuit truth-table -l library.json -m mapping.json
//!
//! # Run every case in a suite file
//! gls-score-circuit --config circuits/suite.yaml run
//!
//! # List suites and cases
//! gls-score-circuit --config circuits/suite.yaml list
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use circuitscore_cli::{
    config::ScoringConfig,
    report::{print_signal_tables, ScoreReport, SuiteReport},
    runner::{load_session, ScoringRunner},
};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gls-score-circuit")]
#[command(about = "Score genetic gate assignments against a circuit's truth table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to suite config YAML
    #[arg(short, long, default_value = "suite.yaml", global = true)]
    config: PathBuf,

    /// Output JSON report path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Show the per-output separation table
    #[arg(long, short = 'd', global = true)]
    detailed: bool,

    /// Log debug events (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single mapping
    Score {
        /// Gate library JSON
        #[arg(short, long)]
        library: PathBuf,

        /// Circuit mapping JSON
        #[arg(short, long)]
        mapping: PathBuf,

        /// Tuning JSON (optional)
        #[arg(short, long)]
        tuning: Option<PathBuf>,
    },

    /// Print the truth table and predicted output levels of a mapping
    TruthTable {
        #[arg(short, long)]
        library: PathBuf,

        #[arg(short, long)]
        mapping: PathBuf,

        #[arg(short, long)]
        tuning: Option<PathBuf>,
    },

    /// Run the cases of a suite config
    Run {
        /// Suite to run (or 'all')
        #[arg(short, long, default_value = "all")]
        suite: String,

        /// Specific case to run within the suite
        #[arg(long)]
        case: Option<String>,
    },

    /// List suites and cases
    List,

    /// Write a default suite config
    Init,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Score {
            library,
            mapping,
            tuning,
        } => score(&cli, library, mapping, tuning.as_deref()),
        Commands::TruthTable {
            library,
            mapping,
            tuning,
        } => truth_table(library, mapping, tuning.as_deref()),
        Commands::Run { suite, case } => run_suites(&cli, suite, case.as_deref()),
        Commands::List => list_cases(&cli),
        Commands::Init => init_config(&cli),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_target(false))
        .init();
}

fn score(cli: &Cli, library: &Path, mapping: &Path, tuning: Option<&Path>) -> anyhow::Result<()> {
    let session = load_session(library, mapping, tuning)
        .with_context(|| format!("Failed to score {}", mapping.display()))?;
    let breakdown = session.evaluate()?;

    let report = ScoreReport::new(library, mapping, tuning, breakdown);
    report.print_summary();

    if cli.detailed {
        report.print_detailed();
    }

    if let Some(ref path) = cli.report {
        report
            .save_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn truth_table(library: &Path, mapping: &Path, tuning: Option<&Path>) -> anyhow::Result<()> {
    let session = load_session(library, mapping, tuning)
        .with_context(|| format!("Failed to load {}", mapping.display()))?;
    let circuit = session
        .circuit()
        .context("mapping was not installed")?;

    // A circuit that is valid logically may still lack usable constants.
    let responses = match session.responses() {
        Ok(table) => Some(table),
        Err(e) => {
            println!("{} No response levels: {}", "⚠".yellow(), e);
            None
        }
    };

    print_signal_tables(
        circuit.inputs().names(),
        circuit.inputs().rows(),
        circuit.truth_table(),
        responses.as_ref(),
    );
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ScoringConfig> {
    if path.exists() {
        ScoringConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
    } else {
        let config = ScoringConfig::default_config();
        println!(
            "  {} {} not found, using defaults from {}",
            "⚠".yellow(),
            path.display(),
            config.global.base_dir.display()
        );
        Ok(config)
    }
}

fn run_suites(cli: &Cli, suite: &str, case: Option<&str>) -> anyhow::Result<()> {
    println!("{} Loading configuration...", "▶".blue());
    let mut config = load_config(&cli.config)?;

    if suite != "all" {
        let mut selected = config
            .suites
            .remove(suite)
            .ok_or_else(|| anyhow::anyhow!("Suite '{}' not found", suite))?;

        if let Some(case_name) = case {
            let case_config = selected
                .cases
                .remove(case_name)
                .ok_or_else(|| anyhow::anyhow!("Case '{}' not found in suite '{}'", case_name, suite))?;
            selected.cases.clear();
            selected.cases.insert(case_name.to_string(), case_config);
        }

        config.suites.clear();
        config.suites.insert(suite.to_string(), selected);
    } else if case.is_some() {
        anyhow::bail!("--case needs --suite");
    }

    println!("{} Scoring from {}...\n", "▶".blue(), config.global.base_dir.display());
    let runner = ScoringRunner::new(config);
    let report = SuiteReport::new(runner.run_all());
    report.print_summary();

    if cli.detailed {
        report.print_detailed();
    }

    if let Some(ref path) = cli.report {
        report
            .save_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    // Exit with non-zero code if any case failed
    if report.summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn list_cases(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;

    println!("{}", "Available Suites".bold());
    println!("{}", "─".repeat(50));

    for (suite_name, suite) in &config.suites {
        println!("\n{} - {}", suite_name.bold().blue(), suite.description.dimmed());

        for (case_name, case) in &suite.cases {
            println!("  • {} - {}", case_name.green(), case.description.dimmed());
            println!("    Library: {}", case.library.display());
            println!("    Mapping: {}", case.mapping.display());
            if let Some(ref tuning) = case.tuning {
                println!("    Tuning:  {}", tuning.display());
            }
            println!("    Min score: {:.2}", case.threshold(&config.global));
        }
    }

    Ok(())
}

fn init_config(cli: &Cli) -> anyhow::Result<()> {
    let path = &cli.config;
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    ScoringConfig::default_config()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Created default config at: {}", "✓".green(), path.display());
    println!("\nPoint base_dir at the directory holding your library and mapping JSON files.");

    Ok(())
}
