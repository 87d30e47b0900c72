//! Event scheduling: templates, the fired-event registry, and schedule building.
//!
//! This module holds everything that decides *what* should happen *when*. It
//! performs no I/O of its own: the current time is always passed in, sunrise
//! comes from a [`crate::geo::SunriseSource`], and actions run against a
//! [`crate::device::LightDevice`] supplied by the caller.

pub mod builder;
pub mod catalog;
pub mod event;
pub mod registry;

use std::time::Duration as StdDuration;

use crate::common::constants::*;
use crate::config::Config;

pub use builder::{Schedule, SkippedTemplate, build_schedule};
pub use catalog::Catalog;
pub use event::{Action, Event, EventKey, EventTemplate, Trigger};
pub use registry::FiredRegistry;

/// Timing parameters of the scheduler loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    /// How late an event may be and still fire.
    pub grace_window: chrono::Duration,
    /// Upper bound on a single sleep.
    pub max_sleep: StdDuration,
    /// How long fired events are remembered.
    pub retention: chrono::Duration,
    /// Sleep after a failed action before rebuilding.
    pub retry_delay: StdDuration,
    /// Failed attempts after which an occurrence is dropped.
    pub max_attempts: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grace_window: chrono::Duration::minutes(
                config.grace_window.unwrap_or(DEFAULT_GRACE_WINDOW) as i64,
            ),
            max_sleep: StdDuration::from_secs(config.max_sleep.unwrap_or(DEFAULT_MAX_SLEEP) * 60),
            retention: chrono::Duration::days(
                config.retention.unwrap_or(DEFAULT_RETENTION) as i64,
            ),
            retry_delay: StdDuration::from_secs(config.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY)),
            max_attempts: config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// Clamp a wait into `[1 s, max_sleep]`.
    pub fn bounded_sleep(&self, wanted: StdDuration) -> StdDuration {
        wanted
            .min(self.max_sleep)
            .max(StdDuration::from_secs(MIN_SLEEP_SECS))
    }
}
