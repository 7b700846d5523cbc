use anyhow::{Context, Result};
use pghandoff::{
    config::{example_config, load_config, DEFAULT_CONFIG_FILE},
    core::validate_transfer,
    observability::{init_logging, shutdown_logging, Rotation},
    platform::SystemRunner,
    service::TransferPipeline,
    state::ReportStore,
};
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--print-config" => {
                println!("{}", example_config());
                return Ok(());
            }
            _ => {
                // Assume it's a config file path
            }
        }
    }

    let exit_code = run_transfer()?;
    std::process::exit(exit_code);
}

#[tokio::main(flavor = "current_thread")]
async fn run_transfer() -> Result<i32> {
    let args: Vec<String> = std::env::args().collect();

    let config_path = if args.len() > 1 && !args[1].starts_with("--") {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    };

    let config = load_config(&config_path).await
        .context("Failed to load configuration")?;

    init_logging(
        &config.log_level,
        config.log_directory.as_deref(),
        Rotation::from(config.log_rotation),
    )?;

    info!("pghandoff v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path.display());

    let validation = validate_transfer(&config).await
        .context("Invalid configuration")?;

    for warning in &validation.warnings {
        warn!("Validation warning: {}", warning);
    }

    let pipeline = TransferPipeline::new(&config, SystemRunner::new());
    let report = pipeline.run().await;

    if let Some(elapsed) = report.elapsed() {
        info!(
            "Run finished: {} in {}.{:03}s ({} readiness checks)",
            report.outcome,
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000,
            report.probe_attempts
        );
    }

    if let Some(report_path) = &config.report_path {
        let store = ReportStore::new(report_path.clone());
        match store.save(&report).await {
            Ok(()) => info!("Run report written to {}", store.path().display()),
            Err(e) => warn!("Failed to write run report: {:#}", e),
        }
    }

    shutdown_logging();
    Ok(report.exit_code())
}

fn print_help() {
    println!("pghandoff v{} - PostgreSQL dump and load handoff", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("  pghandoff [CONFIG_FILE]     Wait for the source, dump it, load the dump into the destination");
    println!("  pghandoff --print-config    Print an example configuration");
    println!("  pghandoff --help            Show this help");
    println!();
    println!("CONFIG_FILE defaults to {}.", DEFAULT_CONFIG_FILE);
    println!();
    println!("ENVIRONMENT:");
    println!("  PGHANDOFF_SOURCE_PASSWORD        Source database password");
    println!("  PGHANDOFF_DESTINATION_PASSWORD   Destination database password");
    println!("  RUST_LOG                         Log filter, overrides log_level");
    println!();
    println!("EXIT CODES:");
    println!("  0  success");
    println!("  1  a database never became ready, or the configuration is invalid");
    println!("  2  dump failed");
    println!("  3  load failed");
}
