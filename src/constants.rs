//! Application constants and configuration values
//!
//! This module centralizes address ranges, port sets, pacing presets,
//! limits and other constants used throughout the application.

// Configuration file constants
pub const DEFAULT_CONFIG_FILE: &str = "syslog_flood_config.yaml";

// Address pool limits
pub const MAX_IP_COUNT: usize = 20000;
pub const PRIVATE_IP_COUNT: usize = 50;

/// The three RFC1918 blocks as inclusive (start, end) octet tuples.
pub const RFC1918_RANGES: &[([u8; 4], [u8; 4])] = &[
    ([10, 0, 0, 0], [10, 255, 255, 255]),
    ([172, 16, 0, 0], [172, 31, 255, 255]),
    ([192, 168, 0, 0], [192, 168, 255, 255]),
];

// Port ranges
pub const EPHEMERAL_PORT_MIN: u16 = 1024;
pub const EPHEMERAL_PORT_MAX: u16 = 65535;
pub const COMMON_PORTS: &[u16] = &[80, 443, 389, 53, 22];
pub const SYSLOG_PORT: u16 = 514;

// Live traffic percentage bounds
pub const MIN_LIVE_PERCENTAGE: f64 = 0.1;
pub const MAX_LIVE_PERCENTAGE: f64 = 99.99;

// Timing constants
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_STATS_INTERVAL: u64 = 30;

// Speed presets, (min, max) seconds between events
pub mod speed {
    pub const SNAIL: (f64, f64) = (5.0, 120.0);
    pub const SLOW: (f64, f64) = (2.0, 5.0);
    pub const MEDIUM: (f64, f64) = (1.0, 2.0);
    pub const FAST: (f64, f64) = (0.5, 1.0);
    pub const SUPER_FAST: (f64, f64) = (0.1, 0.5);
}

// Ranges for the cosmetic fields embedded in rendered messages
pub mod cosmetic {
    pub const CONNECTION_ID_MIN: u32 = 1000;
    pub const CONNECTION_ID_MAX: u32 = 9_999_999;
    pub const EVENT_ID_MIN: u32 = 1000;
    pub const EVENT_ID_MAX: u32 = 99999;
    pub const BYTES_MIN: u32 = 1000;
    pub const BYTES_MAX: u32 = 999_999;
    pub const PACKETS_MIN: u32 = 1000;
    pub const PACKETS_MAX: u32 = 9999;
}

// Default configuration values
pub mod defaults {
    use super::*;

    pub const COLLECTOR_HOST: &str = "192.168.1.100";
    pub const COLLECTOR_PORT: u16 = SYSLOG_PORT;
    pub const SOURCE_URL: &str = "http://example.com/iplist";
    pub const LIVE_PERCENTAGE: f64 = 10.0;
    pub const STATS_INTERVAL: u64 = DEFAULT_STATS_INTERVAL;
}

// Error message constants
pub mod error_messages {
    pub const PERCENTAGE_OUT_OF_RANGE: &str = "must be between 0.1 and 99.99";
    pub const UNTHROTTLED_NOT_CONFIRMED: &str =
        "unthrottled mode can exhaust local and collector resources; pass --confirm-unthrottled to enable it";
    pub const EMPTY_COLLECTOR: &str = "collector host must not be empty";
    pub const INVALID_URL_SCHEME: &str = "source URL must start with http:// or https://";
    pub const INVALID_PACING_BOUNDS: &str = "pacing bounds must be finite, non-negative and min <= max";
}
