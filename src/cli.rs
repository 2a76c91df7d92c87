//! Command-line interface handling
//!
//! This module replaces interactive prompting with flags: every choice the
//! operator makes is parsed and validated here, and the engine only ever
//! sees a complete configuration.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::str::FromStr;
use tracing::info;

use crate::config::{Config, LogFormat, SpeedPreset};
use crate::constants::{defaults, speed, MAX_LIVE_PERCENTAGE, MIN_LIVE_PERCENTAGE};
use crate::error::{ConfigError, MapError, Result};

/// Build the command definition
pub fn build_command() -> Command {
    Command::new("Syslog Flood - Synthetic Security Log Generator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Emits synthetic security-appliance syslog traffic to a collector over UDP")
        .arg(
            Arg::new("collector")
                .long("collector")
                .short('c')
                .value_name("HOST")
                .help(format!("Collector host or IP (default: {})", defaults::COLLECTOR_HOST)),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .help(format!("Collector UDP port (default: {})", defaults::COLLECTOR_PORT)),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .value_name("URL")
                .help(format!("URL of a newline-delimited list of live IPv4 addresses (default: {})", defaults::SOURCE_URL)),
        )
        .arg(
            Arg::new("live-percentage")
                .long("live-percentage")
                .short('l')
                .value_name("PCT")
                .help(format!(
                    "Share of events using live source addresses, {} to {} (default: {})",
                    MIN_LIVE_PERCENTAGE, MAX_LIVE_PERCENTAGE, defaults::LIVE_PERCENTAGE
                )),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_name("FORMAT")
                .help("Log format name or number 1-8 (see --list-formats, default: cisco-asa)"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .short('s')
                .value_name("SPEED")
                .help("Pacing preset: snail, slow, medium, fast, super-fast, unthrottled or 1-6 (default: medium)"),
        )
        .arg(
            Arg::new("confirm-unthrottled")
                .long("confirm-unthrottled")
                .help("Allow the unthrottled preset, which sends with no delay at all")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .short('d')
                .value_name("SECONDS")
                .help("Run duration in seconds (default: until Ctrl+C)"),
        )
        .arg(
            Arg::new("stats-interval")
                .long("stats-interval")
                .value_name("SECONDS")
                .help(format!("Seconds between progress reports (default: {})", defaults::STATS_INTERVAL)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("YAML configuration file path"),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List supported log formats and speed presets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Render events without sending any datagrams")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments and return matches
pub fn parse_arguments() -> ArgMatches {
    build_command().get_matches()
}

/// Process CLI arguments and merge with config
pub fn process_cli_config(matches: &ArgMatches, mut config: Config) -> Result<Config> {
    if let Some(collector) = matches.get_one::<String>("collector") {
        config.collector.host = collector.clone();
    }

    if let Some(port_str) = matches.get_one::<String>("port") {
        config.collector.port = parse_positive_number(port_str, "port")?;
    }

    if let Some(url) = matches.get_one::<String>("url") {
        config.source.url = url.clone();
    }

    if let Some(pct_str) = matches.get_one::<String>("live-percentage") {
        config.traffic.live_ip_percentage = parse_percentage(pct_str)?;
    }

    if let Some(format_str) = matches.get_one::<String>("format") {
        config.traffic.format = LogFormat::from_str(format_str)?;
    }

    if let Some(speed_str) = matches.get_one::<String>("speed") {
        config.traffic.speed = SpeedPreset::from_str(speed_str)?;
    }

    if matches.get_flag("confirm-unthrottled") {
        config.safety.confirm_unthrottled = true;
    }

    if let Some(duration_str) = matches.get_one::<String>("duration") {
        config.traffic.duration = Some(parse_positive_number(duration_str, "duration")?);
    }

    if let Some(interval_str) = matches.get_one::<String>("stats-interval") {
        config.monitoring.stats_interval = parse_positive_number(interval_str, "stats-interval")?;
    }

    let cli_dry_run = matches.get_flag("dry-run");
    if cli_dry_run || config.safety.dry_run {
        config.safety.dry_run = true;
        if cli_dry_run {
            info!("🔍 DRY-RUN MODE ENABLED (CLI) - No datagrams will be sent");
        } else {
            info!("🔍 DRY-RUN MODE ENABLED (CONFIG) - No datagrams will be sent");
        }
    }

    Ok(config)
}

/// Check if any pre-execution commands were requested
pub fn handle_pre_execution_commands(matches: &ArgMatches) -> bool {
    if matches.get_flag("list-formats") {
        print_formats();
        return true;
    }
    false
}

/// Parse positive numbers with field context
pub fn parse_positive_number<T>(value_str: &str, field: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value = value_str.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value_str.to_string(),
        reason: e.to_string(),
    })?;

    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value_str.to_string(),
            reason: "must be greater than 0".to_string(),
        }.into());
    }

    Ok(value)
}

/// Parse a percentage, accepting an optional trailing `%`. Range checks
/// happen during config validation.
pub fn parse_percentage(value_str: &str) -> Result<f64> {
    value_str
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_config_error("live-percentage")
}

fn print_formats() {
    println!("Log formats:");
    for (i, format) in LogFormat::ALL.iter().enumerate() {
        println!("  {} - {} ({})", i + 1, format, format.key());
    }

    println!("Speed presets:");
    for (i, preset) in SpeedPreset::ALL.iter().enumerate() {
        let bounds = match preset {
            SpeedPreset::Snail => Some(speed::SNAIL),
            SpeedPreset::Slow => Some(speed::SLOW),
            SpeedPreset::Medium => Some(speed::MEDIUM),
            SpeedPreset::Fast => Some(speed::FAST),
            SpeedPreset::SuperFast => Some(speed::SUPER_FAST),
            SpeedPreset::Unthrottled => None,
        };
        match bounds {
            Some((min, max)) => println!("  {} - {} ({}-{}s)", i + 1, preset, min, max),
            None => println!("  {} - {} (no delay, requires --confirm-unthrottled)", i + 1, preset),
        }
    }
}
