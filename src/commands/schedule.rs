//! Implementation of the `schedule` command.
//!
//! Builds the schedule once, exactly as the scheduler loop would at this moment,
//! and prints it. An empty registry is used, so nothing counts as fired.

use anyhow::Result;

use crate::{
    common::logger::Log,
    config,
    core::log_schedule,
    geo::SolarSunrise,
    schedule::{Catalog, FiredRegistry, SchedulerSettings, build_schedule},
    time::source,
};

/// Print the upcoming schedule and exit.
pub fn handle_schedule_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = config::load()?;
    let timezone = config.schedule_timezone();
    Log::set_timezone(timezone);

    let catalog = Catalog::from_config(&config)?;
    let settings = SchedulerSettings::from_config(&config);
    let (latitude, longitude) = config.coordinates();
    let sunrise = SolarSunrise::new(latitude, longitude)?;
    let mut registry = FiredRegistry::new(settings.retention);

    if debug_enabled {
        log_pipe!();
        log_debug!(
            "{} templates, coordinates {:.4}, {:.4}, timezone {}",
            catalog.len(),
            latitude,
            longitude,
            timezone
        );
    }

    let now = source::now().with_timezone(&timezone);
    let schedule = build_schedule(&catalog, &sunrise, &mut registry, &settings, now);

    if schedule.is_empty() && schedule.skipped.is_empty() {
        log_block_start!("No events are scheduled");
        log_indented!("Add [[event]] tables to the configuration file");
        log_end!();
        return Ok(());
    }

    log_schedule(&schedule, now);
    log_end!();
    Ok(())
}
