//! fallprep CLI entry point.

use anyhow::Result;
use clap::Parser;
use fallprep_cli::cli::{Cli, Commands};
use fallprep_cli::commands::{
    run_align, run_census, run_check_sync, run_info, run_validate, run_window,
};
use observability::ObservabilityConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "fallprep starting");

    let result = match &cli.command {
        Commands::Align(args) => run_align(args).await.map(drop),
        Commands::CheckSync(args) => run_check_sync(args).await.map(drop),
        Commands::Census(args) => run_census(args).await.map(drop),
        Commands::Window(args) => run_window(args).map(drop),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging and the optional metrics exporter
fn init_observability(cli: &Cli) -> Result<()> {
    let (default_log_level, respect_env) = if cli.quiet {
        ("warn", false)
    } else {
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        (level, true)
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
        respect_env,
    })
}
