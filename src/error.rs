//! Centralized error handling for syslog-flood
//!
//! Configuration and validation failures are fatal at startup. Network
//! failures during a run are returned to the pacing loop, which logs and
//! counts them instead of stopping.

use std::fmt;
use std::io;

/// Main error type for the syslog-flood application
#[derive(Debug)]
pub enum SyslogFloodError {
    /// Configuration-related errors
    Config(ConfigError),
    /// Network-related errors
    Network(NetworkError),
    /// Validation errors
    Validation(ValidationError),
    /// I/O errors
    Io(io::Error),
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    FileNotFound(String),
    ParseError(String),
    InvalidValue { field: String, value: String, reason: String },
}

#[derive(Debug)]
pub enum NetworkError {
    SocketBind(String),
    AddressResolution(String),
    MessageSend(String),
    SendTimeout(u64),
    Fetch(String),
}

#[derive(Debug)]
pub enum ValidationError {
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    InvalidPacing(String),
    ConfirmationRequired(String),
    InvalidCollector { host: String, reason: String },
    InvalidUrl { url: String, reason: String },
}

impl fmt::Display for SyslogFloodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyslogFloodError::Config(e) => write!(f, "Configuration error: {}", e),
            SyslogFloodError::Network(e) => write!(f, "Network error: {}", e),
            SyslogFloodError::Validation(e) => write!(f, "Validation error: {}", e),
            SyslogFloodError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value '{}' for field '{}': {}", value, field, reason)
            }
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::SocketBind(msg) => write!(f, "Failed to bind UDP socket: {}", msg),
            NetworkError::AddressResolution(msg) => write!(f, "Failed to resolve collector address: {}", msg),
            NetworkError::MessageSend(msg) => write!(f, "Failed to send message: {}", msg),
            NetworkError::SendTimeout(ms) => write!(f, "Send did not complete within {} ms", ms),
            NetworkError::Fetch(msg) => write!(f, "Failed to fetch address list: {}", msg),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange { field, value, min, max } => {
                write!(f, "Value {} for {} is outside the range {} to {}", value, field, min, max)
            }
            ValidationError::InvalidPacing(msg) => write!(f, "Invalid pacing policy: {}", msg),
            ValidationError::ConfirmationRequired(msg) => write!(f, "Confirmation required: {}", msg),
            ValidationError::InvalidCollector { host, reason } => {
                write!(f, "Collector {} is invalid: {}", host, reason)
            }
            ValidationError::InvalidUrl { url, reason } => {
                write!(f, "URL {} is invalid: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for SyslogFloodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyslogFloodError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for NetworkError {}
impl std::error::Error for ValidationError {}

impl From<io::Error> for SyslogFloodError {
    fn from(error: io::Error) -> Self {
        SyslogFloodError::Io(error)
    }
}

impl From<ConfigError> for SyslogFloodError {
    fn from(error: ConfigError) -> Self {
        SyslogFloodError::Config(error)
    }
}

impl From<NetworkError> for SyslogFloodError {
    fn from(error: NetworkError) -> Self {
        SyslogFloodError::Network(error)
    }
}

impl From<ValidationError> for SyslogFloodError {
    fn from(error: ValidationError) -> Self {
        SyslogFloodError::Validation(error)
    }
}

/// Type alias for Results used throughout the application
pub type Result<T> = std::result::Result<T, SyslogFloodError>;

/// Helper trait for converting foreign errors to application error types
pub trait MapError<T> {
    fn map_config_error(self, field: &str) -> Result<T>;
    fn map_network_error(self, context: &str) -> Result<T>;
}

impl<T, E: fmt::Display> MapError<T> for std::result::Result<T, E> {
    fn map_config_error(self, field: &str) -> Result<T> {
        self.map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            value: "unknown".to_string(),
            reason: e.to_string(),
        }.into())
    }

    fn map_network_error(self, context: &str) -> Result<T> {
        self.map_err(|e| NetworkError::MessageSend(format!("{}: {}", context, e)).into())
    }
}
