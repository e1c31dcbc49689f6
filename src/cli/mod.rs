//! Kolosal Chrono CLI Module
//!
//! Command-line interface for running the feature pipeline over CSV files.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::imputation::ValueImputeStrategy;
use crate::pipeline::{FeaturePipeline, OutputFormatter};
use crate::selection::SelectorModel;
use crate::timeseries::{classify_timestep, TimeSeriesDataset};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kolosal-chrono")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Time series gap filling, window features and feature selection")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the feature pipeline on a CSV file
    Run {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Timestep column name
        #[arg(long)]
        timestep: String,

        /// Value columns, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        values: Vec<String>,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON config file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Value imputation strategy (last, zero, linear)
        #[arg(long)]
        impute: Option<String>,

        /// Largest rolling window
        #[arg(long)]
        max_window_size: Option<usize>,

        /// Number of features to keep
        #[arg(long)]
        max_features: Option<usize>,

        /// Importance model (XGB)
        #[arg(long)]
        selector: Option<String>,

        /// Select features separately for each value column
        #[arg(long)]
        per_column: bool,
    },

    /// Show data information
    Info {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Timestep column to classify
        #[arg(long)]
        timestep: Option<String>,
    },
}

/// Options of the `run` command
pub struct RunArgs<'a> {
    pub data: &'a Path,
    pub timestep: &'a str,
    pub values: &'a [String],
    pub target: &'a str,
    pub output: &'a Path,
    pub config: Option<&'a Path>,
    pub impute: Option<&'a str>,
    pub max_window_size: Option<usize>,
    pub max_features: Option<usize>,
    pub selector: Option<&'a str>,
    pub per_column: bool,
}

/// Config file (or defaults) with command-line overrides applied
pub fn resolve_config(args: &RunArgs<'_>) -> anyhow::Result<PipelineConfig> {
    let mut config = match args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(name) = args.impute {
        config = config.with_impute_missing_steps(name.parse::<ValueImputeStrategy>()?);
    }
    if let Some(size) = args.max_window_size {
        config = config.with_max_window_size(size);
    }
    if let Some(n) = args.max_features {
        config = config.with_max_features(n);
    }
    if let Some(name) = args.selector {
        config = config.with_selector_model(name.parse::<SelectorModel>()?);
    }
    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(args: &RunArgs<'_>) -> anyhow::Result<()> {
    section("Run");
    let config = resolve_config(args)?;

    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new().load_csv(args.data)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run(&format!(
        "Building features {}",
        dim(&format!("(windows 1..={}, keep {})", config.max_window_size, config.max_features))
    ));
    let start = Instant::now();
    if args.per_column {
        let pipeline = FeaturePipeline::new(args.timestep, args.values.to_vec(), args.target, config);
        let result = pipeline.execute(df, true, Some(args.output))?;
        step_done(&format!("{} rows × {} cols in {:?}", result.height(), result.width(), start.elapsed()));
    } else {
        let dataset = TimeSeriesDataset::new(df, args.timestep)?;
        let result = dataset.process_timeseries_features(args.values, args.target, &config)?;
        step_done(&format!("{} rows × {} cols in {:?}", result.height(), result.width(), start.elapsed()));

        step_run(&format!("Saving → {}", args.output.display()));
        OutputFormatter::new(result).save_to_csv(args.output)?;
        step_done("");
    }

    println!();
    println!("  {:<16} {}", muted("Output"), args.output.display().to_string().white().bold());
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path, timestep: Option<&str>) -> anyhow::Result<()> {
    section("Data Info");

    let mut df = DataLoader::new().load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    if let Some(column) = timestep {
        match classify_timestep(&mut df, column) {
            Ok(kind) => println!("  {:<12} {} ({})", muted("Timestep"), column, kind.to_string().cyan()),
            Err(e) => println!("  {:<12} {}", muted("Timestep"), e.to_string().red()),
        }
    }
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args<'a>(values: &'a [String]) -> RunArgs<'a> {
        RunArgs {
            data: Path::new("in.csv"),
            timestep: "t",
            values,
            target: "y",
            output: Path::new("out.csv"),
            config: None,
            impute: None,
            max_window_size: None,
            max_features: None,
            selector: None,
            per_column: false,
        }
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "kolosal-chrono", "run", "-d", "in.csv", "--timestep", "t", "-v", "a,b", "-t", "y", "-o", "out.csv",
            "--max-features", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { values, max_features, per_column, .. } => {
                assert_eq!(values, vec!["a", "b"]);
                assert_eq!(max_features, Some(3));
                assert!(!per_column);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let values = vec!["a".to_string()];
        let mut args = run_args(&values);
        args.impute = Some("linear");
        args.max_window_size = Some(4);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.impute_missing_steps, ValueImputeStrategy::Linear);
        assert_eq!(config.max_window_size, 4);
        assert_eq!(config.max_features, 10);
    }

    #[test]
    fn test_bad_override_rejected() {
        let values = vec!["a".to_string()];
        let mut args = run_args(&values);
        args.selector = Some("RF");
        assert!(resolve_config(&args).is_err());
    }
}
