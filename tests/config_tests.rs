//! Configuration module tests
//!
//! Tests for configuration loading, format/speed parsing and the validated
//! simulator configuration.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;
use syslog_flood::config::*;
use syslog_flood::error::{ConfigError, SyslogFloodError};
use tempfile::NamedTempFile;

#[test]
fn test_default_config_values() {
    let config = get_default_config();

    assert_eq!(config.collector.host, "192.168.1.100");
    assert_eq!(config.collector.port, 514);
    assert_eq!(config.source.url, "http://example.com/iplist");
    assert_eq!(config.source.max_addresses, 20000);
    assert_eq!(config.source.private_addresses, 50);
    assert_eq!(config.traffic.live_ip_percentage, 10.0);
    assert_eq!(config.traffic.format, LogFormat::CiscoAsa);
    assert_eq!(config.traffic.speed, SpeedPreset::Medium);
    assert!(config.traffic.duration.is_none());
    assert!(!config.safety.confirm_unthrottled);
    assert!(!config.safety.dry_run);
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("1"), Ok(LogFormat::CiscoAsa));
    assert_eq!(LogFormat::from_str("cisco-asa"), Ok(LogFormat::CiscoAsa));
    assert_eq!(LogFormat::from_str("Cisco ASA"), Ok(LogFormat::CiscoAsa));
    assert_eq!(LogFormat::from_str("2"), Ok(LogFormat::SnareWindows));
    assert_eq!(LogFormat::from_str("Snare Windows 2008 Event log"), Ok(LogFormat::SnareWindows));
    assert_eq!(LogFormat::from_str("MS Windows Event Logging XML"), Ok(LogFormat::WindowsXml));
    assert_eq!(LogFormat::from_str("AWS"), Ok(LogFormat::Aws));
    assert_eq!(LogFormat::from_str("5"), Ok(LogFormat::Nessus));
    assert_eq!(LogFormat::from_str("netflow"), Ok(LogFormat::Netflow));
    assert_eq!(LogFormat::from_str("eStreamer"), Ok(LogFormat::EStreamer));
    assert_eq!(LogFormat::from_str("Check_Point"), Ok(LogFormat::CheckPoint));

    assert!(LogFormat::from_str("9").is_err());
    assert!(LogFormat::from_str("").is_err());
    assert!(LogFormat::from_str("splunk").is_err());
}

#[test]
fn test_log_format_display_and_key_roundtrip() {
    for format in LogFormat::ALL {
        assert_eq!(LogFormat::from_str(&format.to_string()), Ok(format));
        assert_eq!(LogFormat::from_str(format.key()), Ok(format));
    }
}

#[test]
fn test_speed_preset_parsing() {
    assert_eq!(SpeedPreset::from_str("1"), Ok(SpeedPreset::Snail));
    assert_eq!(SpeedPreset::from_str("slow"), Ok(SpeedPreset::Slow));
    assert_eq!(SpeedPreset::from_str("Super Fast"), Ok(SpeedPreset::SuperFast));
    assert_eq!(SpeedPreset::from_str("super-fast"), Ok(SpeedPreset::SuperFast));
    assert_eq!(SpeedPreset::from_str("6"), Ok(SpeedPreset::Unthrottled));
    assert!(SpeedPreset::from_str("warp").is_err());
}

#[test]
fn test_speed_preset_bounds() {
    let expected = [
        (SpeedPreset::Snail, 5.0, 120.0),
        (SpeedPreset::Slow, 2.0, 5.0),
        (SpeedPreset::Medium, 1.0, 2.0),
        (SpeedPreset::Fast, 0.5, 1.0),
        (SpeedPreset::SuperFast, 0.1, 0.5),
    ];

    for (preset, min, max) in expected {
        assert_eq!(preset.pacing(), PacingPolicy::Interval { min_secs: min, max_secs: max });
    }
    assert_eq!(SpeedPreset::Unthrottled.pacing(), PacingPolicy::Unthrottled);
}

#[test]
fn test_implicit_config_file_fallback() {
    // No syslog_flood_config.yaml ships with the crate
    let config = load_config(None).unwrap();
    assert_eq!(config.collector.port, 514);
    assert_eq!(config.traffic.format, LogFormat::CiscoAsa);
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let result = load_config(Some("definitely_nonexistent_file.yaml"));
    assert!(matches!(
        result,
        Err(SyslogFloodError::Config(ConfigError::FileNotFound(ref path))) if path == "definitely_nonexistent_file.yaml"
    ));
}

#[test]
fn test_load_config_from_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
collector:
  host: 10.0.0.5
  port: 5514
source:
  url: http://127.0.0.1:8080/ips
  max_addresses: 100
  private_addresses: 10
  fetch_timeout_secs: 2
traffic:
  live_ip_percentage: 25.0
  format: checkpoint
  speed: super-fast
  duration: 60
safety:
  confirm_unthrottled: false
  dry_run: true
  send_timeout_ms: 500
monitoring:
  stats_interval: 10
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.collector.host, "10.0.0.5");
    assert_eq!(config.collector.port, 5514);
    assert_eq!(config.traffic.format, LogFormat::CheckPoint);
    assert_eq!(config.traffic.speed, SpeedPreset::SuperFast);
    assert_eq!(config.traffic.duration, Some(60));
    assert!(config.safety.dry_run);

    let sim = SimulatorConfig::from_config(&config).unwrap();
    assert_eq!(sim.max_addresses, 100);
    assert_eq!(sim.private_addresses, 10);
    assert_eq!(sim.fetch_timeout, Duration::from_secs(2));
    assert_eq!(sim.send_timeout, Duration::from_millis(500));
    assert_eq!(sim.duration, Some(Duration::from_secs(60)));
    assert_eq!(sim.pacing, PacingPolicy::Interval { min_secs: 0.1, max_secs: 0.5 });
}

#[test]
fn test_yaml_accepts_cli_spellings() {
    let yaml = r#"
collector: { host: 10.0.0.5, port: 514 }
source: { url: "http://127.0.0.1/ips", max_addresses: 10, private_addresses: 5, fetch_timeout_secs: 1 }
traffic: { live_ip_percentage: 5.0, format: "7", speed: Super Fast, duration: null }
safety: { confirm_unthrottled: false, dry_run: true, send_timeout_ms: 100 }
monitoring: { stats_interval: 5 }
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.traffic.format, LogFormat::EStreamer);
    assert_eq!(config.traffic.speed, SpeedPreset::SuperFast);

    let bad = yaml.replace("format: \"7\"", "format: splunk");
    let err = serde_yaml::from_str::<Config>(&bad).unwrap_err();
    assert!(err.to_string().contains("unknown log format"));
}

#[test]
fn test_load_invalid_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "collector: [this is not: valid").unwrap();

    let result = load_config(file.path().to_str());
    assert!(matches!(result, Err(SyslogFloodError::Config(ConfigError::ParseError(_)))));
}

#[test]
fn test_default_yaml_roundtrip() {
    let yaml = serde_yaml::to_string(&get_default_config()).unwrap();
    assert!(yaml.contains("format: cisco-asa"));
    assert!(yaml.contains("speed: medium"));

    let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.collector.host, "192.168.1.100");
}

#[test]
fn test_simulator_config_from_defaults() {
    let sim = SimulatorConfig::from_config(&get_default_config()).unwrap();
    assert_eq!(sim.collector_port, 514);
    assert_eq!(sim.pacing, PacingPolicy::Interval { min_secs: 1.0, max_secs: 2.0 });
    assert_eq!(sim.format, LogFormat::CiscoAsa);
    assert!(!sim.dry_run);
}

#[test]
fn test_simulator_config_percentage_bounds() {
    let mut config = get_default_config();

    for ok in [0.1, 50.0, 99.99] {
        config.traffic.live_ip_percentage = ok;
        assert!(SimulatorConfig::from_config(&config).is_ok(), "{} should pass", ok);
    }

    for bad in [0.0, 0.05, 100.0, -1.0, f64::NAN] {
        config.traffic.live_ip_percentage = bad;
        assert!(
            matches!(SimulatorConfig::from_config(&config), Err(SyslogFloodError::Validation(_))),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_simulator_config_unthrottled_requires_confirmation() {
    let mut config = get_default_config();
    config.traffic.speed = SpeedPreset::Unthrottled;
    assert!(SimulatorConfig::from_config(&config).is_err());

    config.safety.confirm_unthrottled = true;
    let sim = SimulatorConfig::from_config(&config).unwrap();
    assert_eq!(sim.pacing, PacingPolicy::Unthrottled);
}

#[test]
fn test_simulator_config_requires_private_addresses() {
    let mut config = get_default_config();
    config.source.private_addresses = 0;
    assert!(matches!(
        SimulatorConfig::from_config(&config),
        Err(SyslogFloodError::Config(ConfigError::InvalidValue { .. }))
    ));
}
