//! `relnorm` command line.
//!
//! ```text
//! relnorm analyze orders.csv --target 3NF --format human
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::process;
use tracing::Level;

use relnorm::config::{DetectorConfig, EngineConfig, PlannerConfig};
use relnorm::engine::NormalizationEngine;
use relnorm::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ResultFormatter};
use relnorm::logging::setup::{init_logging, LoggingConfig};
use relnorm::logging::LogConfig;
use relnorm::model::NormalForm;
use relnorm::sources::{CsvOptions, CsvSource};

#[derive(Debug, Parser)]
#[command(name = "relnorm", version, about = "Detect dependencies and normalize flat tables")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze one CSV file
    Analyze(AnalyzeArgs),
}

#[derive(Debug, clap::Args)]
struct AnalyzeArgs {
    /// CSV file to analyze
    path: String,

    /// Table name (default: file stem in PascalCase)
    #[arg(long)]
    table: Option<String>,

    /// Highest normal form to reach
    #[arg(long, default_value = "5NF")]
    target: NormalForm,

    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Largest FD determinant searched
    #[arg(long)]
    max_lhs: Option<usize>,

    /// Minimum determination coefficient for an FD
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Splits allowed per run
    #[arg(long)]
    step_budget: Option<usize>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Rows read at most
    #[arg(long)]
    max_rows: Option<usize>,

    /// Print every row of every table
    #[arg(long)]
    detailed: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Human,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let logging = LoggingConfig::default()
        .with_relnorm_level(level)
        .with_json_format(cli.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("failed to initialize logging: {e}");
    }

    let outcome = match cli.command {
        Command::Analyze(args) => analyze(args, cli.verbose).await,
    };
    if let Err(e) = outcome {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn analyze(args: AnalyzeArgs, verbose: u8) -> Result<()> {
    let mut detector = DetectorConfig::default();
    if let Some(size) = args.max_lhs {
        detector = detector.with_max_lhs_size(size);
    }
    if let Some(confidence) = args.min_confidence {
        detector = detector.with_min_confidence(confidence);
    }
    let mut planner = PlannerConfig::default().with_target(args.target);
    if let Some(budget) = args.step_budget {
        planner = planner.with_step_budget(budget);
    }
    let log = if verbose > 0 {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let config = EngineConfig::default()
        .with_detector(detector)
        .with_planner(planner)
        .with_log(log);
    let engine = NormalizationEngine::new(config).context("invalid configuration")?;

    let delimiter = u8::try_from(args.delimiter)
        .context("delimiter must be a single-byte character")?;
    let source = CsvSource::with_options(
        args.path.clone(),
        CsvOptions {
            delimiter,
            max_rows: args.max_rows,
            table_name: args.table,
            ..Default::default()
        },
    )?;
    let result = engine
        .analyze_source(&source)
        .await
        .with_context(|| format!("failed to analyze {}", args.path))?;

    let formatter_config = if args.detailed {
        FormatterConfig::detailed()
    } else {
        FormatterConfig::default()
    };
    let output = match args.format {
        OutputFormat::Json => JsonFormatter::with_config(formatter_config).format(&result)?,
        OutputFormat::Human => HumanFormatter::with_config(formatter_config).format(&result)?,
    };
    println!("{output}");
    Ok(())
}
