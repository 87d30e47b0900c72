//! Implementation of the `fire` command.
//!
//! Runs one catalog event's action against the configured device right away,
//! ignoring its trigger. The fired-event registry is not involved, so a running
//! scheduler will still fire the same event at its normal time.

use anyhow::Result;

use crate::{
    common::{logger::Log, utils::private_path},
    config,
    device::create_device,
    schedule::Catalog,
};

/// Execute the named event's action and exit.
pub fn handle_fire_command(event_name: &str, dry_run: bool, debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = config::load()?;
    Log::set_timezone(config.schedule_timezone());
    let catalog = Catalog::from_config(&config)?;

    let Some(template) = catalog.get(event_name) else {
        log_pipe!();
        log_error!("No event named '{}'", event_name);

        let names: Vec<&str> = catalog.templates().iter().map(|t| t.name.as_str()).collect();
        if names.is_empty() {
            log_indented!("The catalog is empty");
        } else {
            if let Some(closest) = super::closest_name(event_name, &names) {
                log_block_start!("Did you mean '{}'?", closest);
            }
            log_block_start!("Available events:");
            for name in &names {
                log_indented!("{}", name);
            }
        }
        if let Ok(path) = config::get_config_path() {
            log_block_start!("Events are defined in {}", private_path(&path));
        }
        anyhow::bail!("unknown event '{event_name}'");
    };

    let mut device = create_device(&config, dry_run, debug_enabled)?;
    log_block_start!(
        "Firing '{}' on {}: {}",
        template.name,
        device.device_name(),
        template.action
    );
    if debug_enabled {
        log_debug!("Trigger: {}", template.trigger);
    }

    template.action.execute(device.as_mut())?;

    log_decorated!("'{}' done", template.name);
    log_end!();
    Ok(())
}
