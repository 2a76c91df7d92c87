//! # Syslog Flood - Main Application Entry Point
//!
//! # Disclaimer
//!
//! - The software generates synthetic traffic for testing log pipelines you operate.
//! - Point it only at collectors you own or are authorized to load.

use std::process;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syslog_flood::cli::{handle_pre_execution_commands, parse_arguments, process_cli_config};
use syslog_flood::config::{load_config, Config, SimulatorConfig};
use syslog_flood::error::Result;
use syslog_flood::simulation::{spawn_signal_handler, Simulation};

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn initialize_configuration(matches: &clap::ArgMatches) -> Result<Config> {
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let base_config = load_config(config_path)?;

    process_cli_config(matches, base_config)
}

async fn run_application() -> Result<()> {
    setup_logging();
    let matches = parse_arguments();

    if handle_pre_execution_commands(&matches) {
        return Ok(());
    }

    // Validation happens here; the engine only receives a frozen config
    let config = initialize_configuration(&matches)?;
    let simulator_config = SimulatorConfig::from_config(&config)?;

    let simulation = Simulation::new(simulator_config).await;
    spawn_signal_handler(simulation.cancel_token());
    simulation.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_application().await {
        error!("Application error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syslog_flood::cli::build_command;

    #[test]
    fn test_initialize_configuration_defaults() {
        let matches = build_command().try_get_matches_from(["syslog-flood"]).unwrap();
        let config = initialize_configuration(&matches).unwrap();
        assert!(SimulatorConfig::from_config(&config).is_ok());
    }

    #[test]
    fn test_initialize_configuration_rejects_unconfirmed_unthrottled() {
        let matches = build_command()
            .try_get_matches_from(["syslog-flood", "--speed", "unthrottled"])
            .unwrap();
        let config = initialize_configuration(&matches).unwrap();
        assert!(SimulatorConfig::from_config(&config).is_err());
    }

    #[test]
    fn test_initialize_configuration_missing_explicit_file() {
        let matches = build_command()
            .try_get_matches_from(["syslog-flood", "--config", "no_such_dir/flood.yaml"])
            .unwrap();
        assert!(initialize_configuration(&matches).is_err());
    }

    #[tokio::test]
    async fn test_setup_logging() {
        // This test just ensures setup_logging doesn't panic
        setup_logging();
    }
}
