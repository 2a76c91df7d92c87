use tracing::{info, warn};

use crate::config::PacingPolicy;
use crate::constants::{error_messages, MAX_LIVE_PERCENTAGE, MIN_LIVE_PERCENTAGE};
use crate::error::{Result, ValidationError};

/// Live traffic share, in percent, inclusive on both ends.
pub fn validate_live_percentage(percentage: f64) -> Result<()> {
    if !percentage.is_finite()
        || percentage < MIN_LIVE_PERCENTAGE
        || percentage > MAX_LIVE_PERCENTAGE
    {
        return Err(ValidationError::OutOfRange {
            field: "live_ip_percentage".to_string(),
            value: percentage,
            min: MIN_LIVE_PERCENTAGE,
            max: MAX_LIVE_PERCENTAGE,
        }.into());
    }
    Ok(())
}

pub fn validate_collector_host(host: &str) -> Result<()> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidCollector {
            host: host.to_string(),
            reason: error_messages::EMPTY_COLLECTOR.to_string(),
        }.into());
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCollector {
            host: host.to_string(),
            reason: "host must not contain whitespace".to_string(),
        }.into());
    }

    Ok(())
}

pub fn validate_source_url(url: &str) -> Result<()> {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("https://") {
        warn!("TLS certificate validation is disabled for the address list fetch");
        return Ok(());
    }
    if lower.starts_with("http://") {
        return Ok(());
    }

    Err(ValidationError::InvalidUrl {
        url: url.to_string(),
        reason: error_messages::INVALID_URL_SCHEME.to_string(),
    }.into())
}

pub fn validate_pacing(pacing: &PacingPolicy, confirmed_unthrottled: bool) -> Result<()> {
    if let PacingPolicy::Interval { min_secs, max_secs } = *pacing {
        if !min_secs.is_finite() || !max_secs.is_finite() || min_secs < 0.0 || min_secs > max_secs {
            return Err(ValidationError::InvalidPacing(format!(
                "{} (got {}..{})",
                error_messages::INVALID_PACING_BOUNDS,
                min_secs,
                max_secs
            )).into());
        }
    }

    if pacing.is_unthrottled() {
        if !confirmed_unthrottled {
            return Err(ValidationError::ConfirmationRequired(
                error_messages::UNTHROTTLED_NOT_CONFIRMED.to_string(),
            ).into());
        }
        warn!("Unthrottled mode confirmed: events will be sent without any delay");
    } else {
        info!("Pacing validated: {}", pacing);
    }

    Ok(())
}
