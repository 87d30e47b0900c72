//! Configuration validation functionality.
//!
//! Range-checks every scalar setting and makes sure the `[[event]]` tables
//! build a usable catalog, so that a bad file is rejected at load time rather
//! than when the first event comes due.

use anyhow::Result;
use chrono_tz::Tz;
use std::fmt::Display;
use std::ops::RangeInclusive;

use super::Config;
use crate::common::constants::*;
use crate::schedule::Catalog;

/// Validate a loaded configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(address) = config.device_address.as_deref()
        && address.trim().is_empty()
    {
        anyhow::bail!("device_address must not be empty");
    }

    if let Some(port) = config.device_port
        && port == 0
    {
        anyhow::bail!("device_port must be between 1 and 65535");
    }

    if let Some(token) = config.auth_token.as_deref()
        && token.trim().is_empty()
    {
        anyhow::bail!("auth_token must not be empty");
    }

    check_range(
        "request_timeout",
        config.request_timeout,
        MINIMUM_REQUEST_TIMEOUT..=MAXIMUM_REQUEST_TIMEOUT,
        "seconds",
    )?;

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(name) = config.timezone.as_deref()
        && name.parse::<Tz>().is_err()
    {
        anyhow::bail!(
            "timezone '{}' is not a known IANA timezone (e.g. \"America/New_York\")",
            name
        );
    }

    check_range(
        "grace_window",
        config.grace_window,
        MINIMUM_GRACE_WINDOW..=MAXIMUM_GRACE_WINDOW,
        "minutes",
    )?;
    check_range(
        "max_sleep",
        config.max_sleep,
        MINIMUM_MAX_SLEEP..=MAXIMUM_MAX_SLEEP,
        "minutes",
    )?;
    check_range(
        "retention",
        config.retention,
        MINIMUM_RETENTION..=MAXIMUM_RETENTION,
        "days",
    )?;
    check_range(
        "retry_delay",
        config.retry_delay,
        MINIMUM_RETRY_DELAY..=MAXIMUM_RETRY_DELAY,
        "seconds",
    )?;
    check_range(
        "max_attempts",
        config.max_attempts,
        MINIMUM_MAX_ATTEMPTS..=MAXIMUM_MAX_ATTEMPTS,
        "attempts",
    )?;

    // Retention shorter than the grace window would forget an event while it is
    // still schedulable
    let grace_minutes = config.grace_window.unwrap_or(DEFAULT_GRACE_WINDOW);
    let retention_minutes = config.retention.unwrap_or(DEFAULT_RETENTION) * 24 * 60;
    if retention_minutes <= grace_minutes {
        anyhow::bail!(
            "retention ({} days) must be longer than grace_window ({} minutes)",
            config.retention.unwrap_or(DEFAULT_RETENTION),
            grace_minutes
        );
    }

    Catalog::from_config(config)?;

    Ok(())
}

fn check_range<T>(key: &str, value: Option<T>, range: RangeInclusive<T>, unit: &str) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    if let Some(value) = value
        && !range.contains(&value)
    {
        anyhow::bail!(
            "{} ({} {}) must be between {} and {} {}",
            key,
            value,
            unit,
            range.start(),
            range.end(),
            unit
        );
    }
    Ok(())
}
