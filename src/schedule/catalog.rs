//! The ordered list of event templates the scheduler works from.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::collections::HashSet;

use super::event::{Action, EventTemplate, Trigger};
use crate::common::constants::{MAXIMUM_BRIGHTNESS, MAXIMUM_FADE_SECONDS, MAXIMUM_SUNRISE_OFFSET};
use crate::config::{ActionKind, Config, EventConfig};
use crate::device::Rgb;

/// Ordered, immutable set of templates for one loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    templates: Vec<EventTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<EventTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in morning and evening routine.
    pub fn default_catalog() -> Self {
        Self::new(vec![
            EventTemplate::new(
                "sunrise-fade-in",
                Trigger::Sunrise { offset_minutes: -30 },
                Action::FadeIn {
                    effect: "Coral Sunrise".to_string(),
                    brightness: 100,
                    fade_seconds: 30 * 60,
                },
            ),
            EventTemplate::new(
                "morning-mode",
                Trigger::Sunrise { offset_minutes: 45 },
                Action::SwitchEffect {
                    effect: "Natural Light".to_string(),
                },
            ),
            EventTemplate::new(
                "morning-off",
                Trigger::At(NaiveTime::from_hms_opt(10, 15, 0).unwrap_or_default()),
                Action::PowerOff,
            ),
            EventTemplate::new(
                "nightlight-on",
                Trigger::At(NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()),
                Action::SetColor {
                    color: Rgb::new(33, 0, 0),
                },
            ),
        ])
    }

    /// Build the catalog described by `config`.
    ///
    /// No `[[event]]` tables means the default catalog. Disabled tables are
    /// dropped; duplicate names are an error.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.events.is_empty() {
            return Ok(Self::default_catalog());
        }

        let mut seen = HashSet::new();
        let mut templates = Vec::with_capacity(config.events.len());
        for event in &config.events {
            if !seen.insert(event.name.as_str()) {
                anyhow::bail!("event '{}' is defined more than once", event.name);
            }
            let template = template_from_config(event)?;
            if event.is_enabled() {
                templates.push(template);
            }
        }

        Ok(Self::new(templates))
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    pub fn get(&self, name: &str) -> Option<&EventTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Effects selected by any template, deduplicated, in catalog order.
    pub fn effects(&self) -> Vec<&str> {
        let mut effects: Vec<&str> = Vec::new();
        for effect in self.templates.iter().filter_map(|t| t.action.effect()) {
            if !effects.contains(&effect) {
                effects.push(effect);
            }
        }
        effects
    }
}

fn template_from_config(event: &EventConfig) -> Result<EventTemplate> {
    let name = event.name.trim();
    if name.is_empty() {
        anyhow::bail!("event name must not be empty");
    }

    let trigger = match (&event.at, event.sunrise_offset) {
        (Some(_), Some(_)) => {
            anyhow::bail!("event '{name}': set either 'at' or 'sunrise_offset', not both")
        }
        (None, None) => anyhow::bail!("event '{name}': one of 'at' or 'sunrise_offset' is required"),
        (Some(at), None) => Trigger::At(
            parse_clock_time(at)
                .with_context(|| format!("event '{name}': invalid 'at' time \"{at}\""))?,
        ),
        (None, Some(offset)) => {
            if offset.abs() > MAXIMUM_SUNRISE_OFFSET {
                anyhow::bail!(
                    "event '{name}': sunrise_offset ({offset}) must be within ±{MAXIMUM_SUNRISE_OFFSET} minutes"
                );
            }
            Trigger::Sunrise {
                offset_minutes: offset,
            }
        }
    };

    let action = action_from_config(name, event)?;
    Ok(EventTemplate::new(name, trigger, action))
}

fn action_from_config(name: &str, event: &EventConfig) -> Result<Action> {
    let require_effect = || -> Result<String> {
        match event.effect.as_deref().map(str::trim) {
            Some(effect) if !effect.is_empty() => Ok(effect.to_string()),
            _ => anyhow::bail!(
                "event '{name}': action '{}' requires 'effect'",
                event.action.as_str()
            ),
        }
    };

    if let Some(brightness) = event.brightness
        && brightness > MAXIMUM_BRIGHTNESS
    {
        anyhow::bail!(
            "event '{name}': brightness ({brightness}) must be between 0 and {MAXIMUM_BRIGHTNESS}"
        );
    }
    if let Some(fade) = event.fade_seconds
        && fade > MAXIMUM_FADE_SECONDS
    {
        anyhow::bail!(
            "event '{name}': fade_seconds ({fade}) must be at most {MAXIMUM_FADE_SECONDS}"
        );
    }

    let action = match event.action {
        ActionKind::FadeIn => Action::FadeIn {
            effect: require_effect()?,
            brightness: event.brightness.unwrap_or(MAXIMUM_BRIGHTNESS),
            fade_seconds: event.fade_seconds.unwrap_or(0),
        },
        ActionKind::SwitchEffect => Action::SwitchEffect {
            effect: require_effect()?,
        },
        ActionKind::SetBrightness => Action::SetBrightness {
            brightness: event.brightness.with_context(|| {
                format!("event '{name}': action 'set_brightness' requires 'brightness'")
            })?,
            fade_seconds: event.fade_seconds,
        },
        ActionKind::SetColor => Action::SetColor {
            color: event
                .color
                .map(Rgb::from)
                .with_context(|| format!("event '{name}': action 'set_color' requires 'color'"))?,
        },
        ActionKind::PowerOff => Action::PowerOff,
    };

    Ok(action)
}

/// Parse `HH:MM:SS` or `HH:MM`.
fn parse_clock_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .context("expected HH:MM or HH:MM:SS")
}
