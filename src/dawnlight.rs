//! Application coordinator that manages the complete lifecycle of dawnlight.
//!
//! This module handles resource acquisition, initialization, and orchestration
//! of the scheduler loop:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup
//! - Device and sunrise source creation
//!
//! The `Dawnlight` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `Dawnlight::new(debug_enabled).run()`
//! - Dry run: `Dawnlight::new(debug_enabled).dry_run().run()`
//! - Simulation mode: `Dawnlight::new(debug_enabled).without_lock().without_headers()
//!   .dry_run().with_clock(clock).run()`

use anyhow::Result;
use std::sync::Arc;

use crate::{
    common::logger::Log,
    config::{self, Config},
    core::{Core, CoreParams},
    device::create_device,
    geo::SolarSunrise,
    io::{lock::acquire_lock, signals::setup_signal_handler},
    time::source::{RealTimeSource, TimeSource},
};

/// Builder for configuring and running the dawnlight scheduler.
///
/// # Examples
///
/// ```no_run
/// use dawnlight::Dawnlight;
///
/// # fn main() -> anyhow::Result<()> {
/// // Normal daemon startup
/// Dawnlight::new(false).run()?;
///
/// // Log device calls instead of sending them
/// Dawnlight::new(true).dry_run().run()?;
/// # Ok(())
/// # }
/// ```
pub struct Dawnlight {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
    dry_run: bool,
    clock: Option<Arc<dyn TimeSource>>,
    config: Option<Config>,
}

impl Dawnlight {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
            dry_run: false,
            clock: None,
            config: None,
        }
    }

    /// Skip lock file creation (simulation)
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip header display
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Log device calls instead of sending them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Drive the loop from `clock` instead of the wall clock
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use an already loaded configuration instead of loading it again
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Execute the scheduler with the configured settings.
    ///
    /// Returns when a shutdown signal arrives or a simulated clock runs out.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = match self.config {
            Some(config) => config,
            None => config::load()?,
        };
        let config_path = config::get_config_path()?;
        Log::set_timezone(config.schedule_timezone());

        // Held until the loop returns; dropping it releases the lock
        let _lock = if self.create_lock {
            let lock = acquire_lock()?;
            log_block_start!("Lock acquired, starting dawnlight...");
            Some(lock)
        } else {
            None
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        config.log_config();

        let device = create_device(&config, self.dry_run, self.debug_enabled)?;
        if self.dry_run {
            log_block_start!("Dry run: device calls are logged, not sent");
        }

        let (latitude, longitude) = config.coordinates();
        let sunrise = SolarSunrise::new(latitude, longitude)?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(RealTimeSource) as Arc<dyn TimeSource>);

        let core = Core::new(CoreParams {
            device,
            config,
            sunrise: Box::new(sunrise),
            clock,
            signal_state,
            config_path: Some(config_path),
            debug_enabled: self.debug_enabled,
        })?;

        core.run()
    }
}
