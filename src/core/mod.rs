//! Core application logic: the scheduler loop.
//!
//! Every iteration rebuilds the schedule from scratch against the current time,
//! then either fires the earliest due event or sleeps until the next one is due.
//! Nothing survives between iterations except the fired-event registry, so an
//! iteration can be interrupted at any point and the next one recovers.
//!
//! - A due event fires, is recorded, and the loop rebuilds immediately without
//!   sleeping, so several events due at once fire back to back in order.
//! - A failed action is recorded as an attempt; the loop sleeps the retry delay
//!   and the event is offered again while it is inside the grace window.
//! - Among due events the one with the fewest failed attempts goes first, so an
//!   event that keeps failing never holds back another one due at the same time.
//! - Otherwise the loop sleeps until the next event, clamped to
//!   `[1 s, max_sleep]`, or `max_sleep` when nothing is scheduled.
//!
//! Sleeps wait on the signal channel, so shutdown and reload requests are
//! handled without waiting for the sleep to run out.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration as StdDuration;

use crate::{
    common::{
        logger::Log,
        utils::{format_duration, format_signed_duration},
    },
    config::{self, Config},
    device::LightDevice,
    geo::{SolarSunrise, SunriseSource},
    io::signals::{SignalMessage, SignalState},
    schedule::{Catalog, Event, EventKey, FiredRegistry, Schedule, SchedulerSettings, build_schedule},
    time::source::TimeSource,
};

/// Parameters for creating a Core instance.
///
/// This struct bundles all the dependencies needed to create a Core,
/// following the idiomatic Rust pattern to avoid functions with too many parameters.
pub struct CoreParams {
    pub device: Box<dyn LightDevice>,
    pub config: Config,
    pub sunrise: Box<dyn SunriseSource>,
    pub clock: Arc<dyn TimeSource>,
    pub signal_state: SignalState,
    /// File re-read on reload requests; `None` ignores them.
    pub config_path: Option<PathBuf>,
    pub debug_enabled: bool,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The head event ran successfully.
    Fired(EventKey),
    /// A due event's action failed; `attempts` counts failures so far.
    /// `others_due` is set when another due event has fewer attempts and
    /// should run before the retry delay.
    Failed {
        key: EventKey,
        attempts: u32,
        others_due: bool,
    },
    /// The head event is in the future by `delta`.
    Waiting { next: EventKey, delta: StdDuration },
    /// Nothing is scheduled.
    Idle,
}

impl StepOutcome {
    /// How long to sleep before the next iteration; `None` means rebuild now.
    pub fn sleep_duration(&self, settings: &SchedulerSettings) -> Option<StdDuration> {
        match self {
            StepOutcome::Fired(_) => None,
            StepOutcome::Failed {
                others_due: true, ..
            } => None,
            StepOutcome::Failed { .. } => Some(settings.bounded_sleep(settings.retry_delay)),
            StepOutcome::Waiting { delta, .. } => Some(settings.bounded_sleep(*delta)),
            StepOutcome::Idle => Some(settings.max_sleep),
        }
    }
}

/// The scheduler loop and everything it owns.
pub struct Core {
    device: Box<dyn LightDevice>,
    config: Config,
    catalog: Catalog,
    settings: SchedulerSettings,
    timezone: Tz,
    sunrise: Box<dyn SunriseSource>,
    clock: Arc<dyn TimeSource>,
    signal_state: SignalState,
    registry: FiredRegistry,
    config_path: Option<PathBuf>,
    debug_enabled: bool,
}

impl Core {
    /// Create a new Core instance from parameters.
    ///
    /// Fails only if the configuration's events do not form a valid catalog,
    /// which a validated configuration never does.
    pub fn new(params: CoreParams) -> Result<Self> {
        let catalog = Catalog::from_config(&params.config)?;
        let settings = SchedulerSettings::from_config(&params.config);
        let timezone = params.config.schedule_timezone();

        Ok(Self {
            device: params.device,
            registry: FiredRegistry::new(settings.retention),
            catalog,
            settings,
            timezone,
            config: params.config,
            sunrise: params.sunrise,
            clock: params.clock,
            signal_state: params.signal_state,
            config_path: params.config_path,
            debug_enabled: params.debug_enabled,
        })
    }

    pub fn registry(&self) -> &FiredRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current time from the injected clock, in the schedule timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }

    /// Run the loop until shutdown is requested or a simulated clock ends.
    pub fn run(mut self) -> Result<()> {
        log_block_start!(
            "Scheduling {} events on {} (timezone {})",
            self.catalog.len(),
            self.device.device_name(),
            self.timezone
        );
        self.check_effects();

        while self.signal_state.is_running() && !self.clock.is_ended() {
            let now = self.now();
            let outcome = self.step(now);

            let Some(sleep) = outcome.sleep_duration(&self.settings) else {
                continue;
            };
            log_indented!("Sleeping {}", format_duration(sleep));

            match self.wait(sleep) {
                Some(SignalMessage::Shutdown) => break,
                Some(SignalMessage::Reload) => self.reload(),
                None => {}
            }
        }

        log_block_start!("Shutting down dawnlight...");
        log_end!();
        Ok(())
    }

    /// One iteration: build the schedule at `now` and fire a due event if any.
    pub fn step(&mut self, now: DateTime<Tz>) -> StepOutcome {
        let schedule = build_schedule(
            &self.catalog,
            self.sunrise.as_ref(),
            &mut self.registry,
            &self.settings,
            now,
        );
        self.log_schedule(&schedule, now);

        let Some(head) = schedule.next() else {
            log_decorated!("Nothing scheduled");
            return StepOutcome::Idle;
        };

        let due: Vec<&Event> = schedule
            .events
            .iter()
            .take_while(|event| event.fire_instant <= now)
            .collect();

        // First due event among those with the fewest failures
        let Some(event) = due
            .iter()
            .copied()
            .min_by_key(|event| self.registry.attempts(&event.key()))
        else {
            let delta = head
                .fire_instant
                .signed_duration_since(now)
                .to_std()
                .unwrap_or_default();
            log_decorated!("Next: '{}' in {}", head.name, format_duration(delta));
            return StepOutcome::Waiting {
                next: head.key(),
                delta,
            };
        };

        let key = event.key();
        let late = now.signed_duration_since(event.fire_instant);
        log_block_start!(
            "Firing '{}' ({}), scheduled {}",
            event.name,
            event.action,
            event.fire_instant.format("%H:%M:%S")
        );
        if late > chrono::Duration::zero() {
            log_indented!("Running {} late", format_signed_duration(late));
        }

        match event.action.execute(self.device.as_mut()) {
            Ok(()) => {
                log_decorated!("'{}' done", event.name);
                self.registry.mark_fired(key.clone());
                StepOutcome::Fired(key)
            }
            Err(e) => {
                let attempts = self.registry.record_failure(key.clone());
                let others_due = due.iter().any(|other| {
                    let other = other.key();
                    other != key && self.registry.attempts(&other) < attempts
                });
                log_error!("'{}' failed: {:#}", event.name, e);
                if attempts >= self.settings.max_attempts {
                    log_indented!("Giving up after {} attempts", attempts);
                } else if others_due {
                    log_indented!(
                        "Attempt {} of {}, other due events run first",
                        attempts,
                        self.settings.max_attempts
                    );
                } else {
                    log_indented!(
                        "Attempt {} of {}, retrying in {}",
                        attempts,
                        self.settings.max_attempts,
                        format_duration(self.settings.bounded_sleep(self.settings.retry_delay))
                    );
                }
                StepOutcome::Failed {
                    key,
                    attempts,
                    others_due,
                }
            }
        }
    }

    /// Sleep for `duration` or until a signal arrives.
    fn wait(&self, duration: StdDuration) -> Option<SignalMessage> {
        if self.clock.is_simulated() {
            self.clock.sleep(duration);
            return self.signal_state.signal_receiver.try_recv().ok();
        }

        match self.signal_state.signal_receiver.recv_timeout(duration) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.clock.sleep(duration);
                None
            }
        }
    }

    /// Re-read the configuration file. The registry survives; an invalid file
    /// leaves the running configuration in place.
    pub fn reload(&mut self) {
        let Some(path) = self.config_path.clone() else {
            log_pipe!();
            log_warning!("Reload requested but no configuration file is in use");
            return;
        };

        log_block_start!("Reloading configuration");
        match config::load_from_path(&path) {
            Ok(new_config) => {
                if let Err(e) = self.apply_config(new_config) {
                    log_error!("Keeping previous configuration: {:#}", e);
                }
            }
            Err(e) => log_error!("Keeping previous configuration: {:#}", e),
        }
    }

    /// Swap in a new configuration.
    pub fn apply_config(&mut self, new_config: Config) -> Result<()> {
        let catalog = Catalog::from_config(&new_config)?;

        if new_config.coordinates() != self.config.coordinates() {
            let (lat, lon) = new_config.coordinates();
            self.sunrise = Box::new(SolarSunrise::new(lat, lon)?);
        }
        if new_config.device_address != self.config.device_address
            || new_config.device_port() != self.config.device_port()
            || new_config.auth_token != self.config.auth_token
        {
            log_warning!("Device settings changed; restart dawnlight to apply them");
        }

        self.settings = SchedulerSettings::from_config(&new_config);
        self.registry.set_retention(self.settings.retention);
        self.timezone = new_config.schedule_timezone();
        Log::set_timezone(self.timezone);
        self.catalog = catalog;
        self.config = new_config;

        log_decorated!(
            "Configuration reloaded ({} events)",
            self.catalog.len()
        );
        Ok(())
    }

    /// Warn about configured effects the device does not offer.
    fn check_effects(&mut self) {
        let wanted = self.catalog.effects();
        if wanted.is_empty() {
            return;
        }

        match self.device.effects() {
            Ok(Some(available)) => {
                let missing: Vec<&str> = wanted
                    .into_iter()
                    .filter(|effect| !available.iter().any(|a| a.as_str() == *effect))
                    .collect();
                if !missing.is_empty() {
                    log_pipe!();
                    log_warning!(
                        "{} does not offer: {}",
                        self.device.device_name(),
                        missing.join(", ")
                    );
                    log_indented!("Events selecting these effects will fail");
                } else if self.debug_enabled {
                    log_debug!("All {} configured effects are available", available.len());
                }
            }
            Ok(None) => {}
            Err(e) => {
                log_pipe!();
                log_warning!("Could not read the effect list: {:#}", e);
            }
        }
    }

    fn log_schedule(&self, schedule: &Schedule, now: DateTime<Tz>) {
        log_schedule(schedule, now);
        if self.debug_enabled {
            log_debug!(
                "Registry holds {} entries (now {})",
                self.registry.len(),
                now.with_timezone(&Utc).format("%H:%M:%SZ")
            );
        }
    }
}

/// Print a schedule as seen at `now`, one line per event.
pub fn log_schedule(schedule: &Schedule, now: DateTime<Tz>) {
    for skipped in &schedule.skipped {
        log_pipe!();
        log_warning!("Skipping '{}' this pass: {:#}", skipped.name, skipped.error);
    }

    log_block_start!("Schedule at {}", now.format("%Y-%m-%d %H:%M:%S %Z"));
    for event in &schedule.events {
        let until = event.fire_instant.signed_duration_since(now);
        let when = if until > chrono::Duration::zero() {
            format!("in {}", format_signed_duration(until))
        } else {
            "due".to_string()
        };
        log_indented!(
            "{}  {:<16} {} ({})",
            event.fire_instant.format("%a %H:%M:%S"),
            event.name,
            event.action,
            when
        );
    }
}
