use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::constants::{
    defaults, speed, DEFAULT_CONFIG_FILE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_SEND_TIMEOUT_MS,
    MAX_IP_COUNT, PRIVATE_IP_COUNT,
};
use crate::error::{ConfigError, Result};
use crate::validation::{
    validate_collector_host, validate_live_percentage, validate_pacing, validate_source_url,
};

/// Configuration structures for YAML config file support
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub collector: CollectorConfig,
    pub source: SourceConfig,
    pub traffic: TrafficConfig,
    pub safety: SafetyConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CollectorConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub max_addresses: usize,
    pub private_addresses: usize,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrafficConfig {
    pub live_ip_percentage: f64,
    pub format: LogFormat,
    pub speed: SpeedPreset,
    pub duration: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafetyConfig {
    pub confirm_unthrottled: bool,
    pub dry_run: bool,
    pub send_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub stats_interval: u64,
}

/// Log template emitted for every event of a run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum LogFormat {
    CiscoAsa,
    SnareWindows,
    WindowsXml,
    Aws,
    Nessus,
    Netflow,
    #[serde(rename = "estreamer")]
    EStreamer,
    #[serde(rename = "checkpoint")]
    CheckPoint,
}

impl LogFormat {
    pub const ALL: [LogFormat; 8] = [
        LogFormat::CiscoAsa,
        LogFormat::SnareWindows,
        LogFormat::WindowsXml,
        LogFormat::Aws,
        LogFormat::Nessus,
        LogFormat::Netflow,
        LogFormat::EStreamer,
        LogFormat::CheckPoint,
    ];

    /// Short key used on the command line and in statistics.
    pub fn key(&self) -> &'static str {
        match self {
            LogFormat::CiscoAsa => "cisco-asa",
            LogFormat::SnareWindows => "snare-windows",
            LogFormat::WindowsXml => "windows-xml",
            LogFormat::Aws => "aws",
            LogFormat::Nessus => "nessus",
            LogFormat::Netflow => "netflow",
            LogFormat::EStreamer => "estreamer",
            LogFormat::CheckPoint => "checkpoint",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::CiscoAsa => write!(f, "Cisco ASA"),
            LogFormat::SnareWindows => write!(f, "Snare Windows 2008 Event log"),
            LogFormat::WindowsXml => write!(f, "MS Windows Event Logging XML"),
            LogFormat::Aws => write!(f, "AWS"),
            LogFormat::Nessus => write!(f, "Nessus"),
            LogFormat::Netflow => write!(f, "Netflow"),
            LogFormat::EStreamer => write!(f, "eStreamer"),
            LogFormat::CheckPoint => write!(f, "Check Point"),
        }
    }
}

/// Accepts format keys, display names and the 1-8 menu numbers,
/// ignoring case, spaces, dashes and underscores.
impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "1" | "ciscoasa" | "asa" => Ok(LogFormat::CiscoAsa),
            "2" | "snarewindows" | "snare" | "snarewindows2008eventlog" => Ok(LogFormat::SnareWindows),
            "3" | "windowsxml" | "xml" | "mswindowseventloggingxml" => Ok(LogFormat::WindowsXml),
            "4" | "aws" => Ok(LogFormat::Aws),
            "5" | "nessus" => Ok(LogFormat::Nessus),
            "6" | "netflow" => Ok(LogFormat::Netflow),
            "7" | "estreamer" => Ok(LogFormat::EStreamer),
            "8" | "checkpoint" => Ok(LogFormat::CheckPoint),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: s.to_string(),
                reason: "unknown log format (see --list-formats)".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Named pacing presets offered to the operator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum SpeedPreset {
    Snail,
    Slow,
    Medium,
    Fast,
    SuperFast,
    Unthrottled,
}

impl SpeedPreset {
    pub const ALL: [SpeedPreset; 6] = [
        SpeedPreset::Snail,
        SpeedPreset::Slow,
        SpeedPreset::Medium,
        SpeedPreset::Fast,
        SpeedPreset::SuperFast,
        SpeedPreset::Unthrottled,
    ];

    pub fn pacing(&self) -> PacingPolicy {
        let (min_secs, max_secs) = match self {
            SpeedPreset::Snail => speed::SNAIL,
            SpeedPreset::Slow => speed::SLOW,
            SpeedPreset::Medium => speed::MEDIUM,
            SpeedPreset::Fast => speed::FAST,
            SpeedPreset::SuperFast => speed::SUPER_FAST,
            SpeedPreset::Unthrottled => return PacingPolicy::Unthrottled,
        };
        PacingPolicy::Interval { min_secs, max_secs }
    }
}

impl fmt::Display for SpeedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedPreset::Snail => write!(f, "Snail"),
            SpeedPreset::Slow => write!(f, "Slow"),
            SpeedPreset::Medium => write!(f, "Medium"),
            SpeedPreset::Fast => write!(f, "Fast"),
            SpeedPreset::SuperFast => write!(f, "Super Fast"),
            SpeedPreset::Unthrottled => write!(f, "Unthrottled"),
        }
    }
}

impl FromStr for SpeedPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "1" | "snail" => Ok(SpeedPreset::Snail),
            "2" | "slow" => Ok(SpeedPreset::Slow),
            "3" | "medium" => Ok(SpeedPreset::Medium),
            "4" | "fast" => Ok(SpeedPreset::Fast),
            "5" | "superfast" => Ok(SpeedPreset::SuperFast),
            "6" | "unthrottled" | "max" => Ok(SpeedPreset::Unthrottled),
            _ => Err(ConfigError::InvalidValue {
                field: "speed".to_string(),
                value: s.to_string(),
                reason: "must be snail, slow, medium, fast, super-fast or unthrottled".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SpeedPreset {
    type Error = ConfigError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Delay applied between two consecutive events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacingPolicy {
    Interval { min_secs: f64, max_secs: f64 },
    Unthrottled,
}

impl PacingPolicy {
    /// Returns `None` when no delay applies. An interval whose upper bound
    /// is zero, negative or not finite behaves like `Unthrottled`; the lower
    /// bound is clamped into `0..=max`.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Duration> {
        let PacingPolicy::Interval { min_secs, max_secs } = *self else {
            return None;
        };
        if !max_secs.is_finite() || max_secs <= 0.0 {
            return None;
        }

        let min_secs = if min_secs.is_finite() { min_secs.clamp(0.0, max_secs) } else { 0.0 };
        if min_secs >= max_secs {
            return Some(Duration::from_secs_f64(max_secs));
        }
        Some(Duration::from_secs_f64(rng.gen_range(min_secs..=max_secs)))
    }

    pub fn is_unthrottled(&self) -> bool {
        self.upper_bound().is_zero()
    }

    pub fn upper_bound(&self) -> Duration {
        match *self {
            PacingPolicy::Unthrottled => Duration::ZERO,
            PacingPolicy::Interval { max_secs, .. } if max_secs.is_finite() && max_secs > 0.0 => {
                Duration::from_secs_f64(max_secs)
            }
            PacingPolicy::Interval { .. } => Duration::ZERO,
        }
    }
}

impl fmt::Display for PacingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingPolicy::Interval { min_secs, max_secs } => {
                write!(f, "{}-{}s between events", min_secs, max_secs)
            }
            PacingPolicy::Unthrottled => write!(f, "unthrottled"),
        }
    }
}

/// Validated, immutable settings for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub collector_host: String,
    pub collector_port: u16,
    pub source_url: String,
    pub live_ip_percentage: f64,
    pub format: LogFormat,
    pub pacing: PacingPolicy,
    pub max_addresses: usize,
    pub private_addresses: usize,
    pub fetch_timeout: Duration,
    pub send_timeout: Duration,
    pub duration: Option<Duration>,
    pub dry_run: bool,
    pub stats_interval: Duration,
}

impl SimulatorConfig {
    /// Validate a raw configuration and freeze it for the engine.
    pub fn from_config(config: &Config) -> Result<Self> {
        validate_collector_host(&config.collector.host)?;
        validate_source_url(&config.source.url)?;
        validate_live_percentage(config.traffic.live_ip_percentage)?;

        let pacing = config.traffic.speed.pacing();
        validate_pacing(&pacing, config.safety.confirm_unthrottled)?;

        if config.source.private_addresses == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.private_addresses".to_string(),
                value: "0".to_string(),
                reason: "at least one private address is required".to_string(),
            }.into());
        }

        Ok(Self {
            collector_host: config.collector.host.trim().to_string(),
            collector_port: config.collector.port,
            source_url: config.source.url.clone(),
            live_ip_percentage: config.traffic.live_ip_percentage,
            format: config.traffic.format,
            pacing,
            max_addresses: config.source.max_addresses,
            private_addresses: config.source.private_addresses,
            fetch_timeout: Duration::from_secs(config.source.fetch_timeout_secs),
            send_timeout: Duration::from_millis(config.safety.send_timeout_ms),
            duration: config.traffic.duration.map(Duration::from_secs),
            dry_run: config.safety.dry_run,
            stats_interval: Duration::from_secs(config.monitoring.stats_interval.max(1)),
        })
    }
}

/// Load configuration from YAML file. Without an explicit path the default
/// file is used when present; an explicit path that does not exist is an error.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_file = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

    if !Path::new(config_file).exists() {
        if config_path.is_some() {
            return Err(ConfigError::FileNotFound(config_file.to_string()).into());
        }
        info!("Config file {} not found, using defaults", config_file);
        return Ok(get_default_config());
    }

    let config_str = std::fs::read_to_string(config_file)?;

    serde_yaml::from_str(&config_str)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", config_file, e)).into())
}

pub fn get_default_config() -> Config {
    Config {
        collector: CollectorConfig {
            host: defaults::COLLECTOR_HOST.to_string(),
            port: defaults::COLLECTOR_PORT,
        },
        source: SourceConfig {
            url: defaults::SOURCE_URL.to_string(),
            max_addresses: MAX_IP_COUNT,
            private_addresses: PRIVATE_IP_COUNT,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        },
        traffic: TrafficConfig {
            live_ip_percentage: defaults::LIVE_PERCENTAGE,
            format: LogFormat::CiscoAsa,
            speed: SpeedPreset::Medium,
            duration: None,
        },
        safety: SafetyConfig {
            confirm_unthrottled: false,
            dry_run: false,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
        },
        monitoring: MonitoringConfig {
            stats_interval: defaults::STATS_INTERVAL,
        },
    }
}
