//! Implementation of the `simulate` command for testing time-based behavior.
//!
//! This command sets up a fast-forward simulated time source and runs the
//! scheduler loop against it with a dry-run device, so a whole day or week of
//! firings can be checked in a fraction of a second.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

use crate::{
    Dawnlight,
    common::logger::Log,
    config,
    time::source::{self, SimulatedTimeSource, TimeSource},
};

/// Handle the `simulate` command.
///
/// # Arguments
/// * `start_time` - Start time in format "YYYY-MM-DD HH:MM:SS", schedule timezone
/// * `end_time` - End time in the same format
/// * `debug_enabled` - Whether debug mode is enabled
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    debug_enabled: bool,
) -> Result<()> {
    let config = config::load()?;
    let timezone = config.schedule_timezone();

    let start = source::parse_datetime_in_tz(start_time, timezone)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = source::parse_datetime_in_tz(end_time, timezone)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;

    // Validate that end is after start
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    // Initialize the simulated time source BEFORE any logging
    let clock = Arc::new(SimulatedTimeSource::new(
        start.with_timezone(&Utc),
        end.with_timezone(&Utc),
    ));
    source::init_time_source(clock.clone());
    Log::set_timezone(timezone);

    log_version!();
    log_block_start!("Simulation Mode");

    let duration = end.signed_duration_since(start);
    log_decorated!(
        "Simulating from {} to {} ({})",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S %Z"),
        timezone
    );
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    log_indented!("Time acceleration: fast-forward, device calls are logged only");

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    Dawnlight::new(debug_enabled)
        .without_lock()
        .without_headers()
        .dry_run()
        .with_config(config)
        .with_clock(clock as Arc<dyn TimeSource>)
        .run()
}
