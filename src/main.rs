//! Kolosal Chrono - Main Entry Point
//!
//! Runs the time series feature pipeline over CSV files.

use clap::Parser;
use kolosal_chrono::cli::{cmd_info, cmd_run, Cli, Commands, RunArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_chrono=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            timestep,
            values,
            target,
            output,
            config,
            impute,
            max_window_size,
            max_features,
            selector,
            per_column,
        } => {
            cmd_run(&RunArgs {
                data: &data,
                timestep: &timestep,
                values: &values,
                target: &target,
                output: &output,
                config: config.as_deref(),
                impute: impute.as_deref(),
                max_window_size,
                max_features,
                selector: selector.as_deref(),
                per_column,
            })?;
        }
        Commands::Info { data, timestep } => {
            cmd_info(&data, timestep.as_deref())?;
        }
    }

    Ok(())
}
