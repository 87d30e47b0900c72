//! Events, the templates that produce them, and the actions they carry.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::device::{LightDevice, Rgb};
use crate::geo::SunriseSource;

/// What an event does to the light.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Select an effect at minimum brightness, then fade up to `brightness`.
    FadeIn {
        effect: String,
        brightness: u8,
        fade_seconds: u32,
    },
    /// Select an effect without touching brightness.
    SwitchEffect { effect: String },
    /// Change brightness, optionally fading.
    SetBrightness {
        brightness: u8,
        fade_seconds: Option<u32>,
    },
    /// Show a solid color.
    SetColor { color: Rgb },
    /// Turn the light off.
    PowerOff,
}

impl Action {
    /// Perform the action against `device`. Stops at the first failing call.
    pub fn execute(&self, device: &mut dyn LightDevice) -> Result<()> {
        match self {
            Action::FadeIn {
                effect,
                brightness,
                fade_seconds,
            } => {
                device.set_effect(effect)?;
                if *fade_seconds > 0 {
                    device.set_brightness(1, None)?;
                    device.set_brightness(*brightness, Some(*fade_seconds))
                } else {
                    device.set_brightness(*brightness, None)
                }
            }
            Action::SwitchEffect { effect } => device.set_effect(effect),
            Action::SetBrightness {
                brightness,
                fade_seconds,
            } => device.set_brightness(*brightness, *fade_seconds),
            Action::SetColor { color } => device.set_color(*color),
            Action::PowerOff => device.power_off(),
        }
    }

    /// The effect this action selects, if any.
    pub fn effect(&self) -> Option<&str> {
        match self {
            Action::FadeIn { effect, .. } | Action::SwitchEffect { effect } => Some(effect),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::FadeIn {
                effect,
                brightness,
                fade_seconds,
            } => write!(
                f,
                "fade in \"{effect}\" to {brightness}% over {}",
                crate::common::utils::format_duration(std::time::Duration::from_secs(
                    u64::from(*fade_seconds)
                ))
            ),
            Action::SwitchEffect { effect } => write!(f, "switch to \"{effect}\""),
            Action::SetBrightness {
                brightness,
                fade_seconds: Some(secs),
            } => write!(f, "brightness {brightness}% over {secs}s"),
            Action::SetBrightness {
                brightness,
                fade_seconds: None,
            } => write!(f, "brightness {brightness}%"),
            Action::SetColor { color } => write!(f, "color {color}"),
            Action::PowerOff => write!(f, "power off"),
        }
    }
}

/// When a template fires on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A fixed local clock time.
    At(NaiveTime),
    /// Sunrise shifted by a signed number of minutes.
    Sunrise { offset_minutes: i64 },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::At(time) => write!(f, "daily at {}", time.format("%H:%M:%S")),
            Trigger::Sunrise { offset_minutes: 0 } => write!(f, "at sunrise"),
            Trigger::Sunrise { offset_minutes } if *offset_minutes < 0 => {
                write!(f, "{} min before sunrise", -offset_minutes)
            }
            Trigger::Sunrise { offset_minutes } => {
                write!(f, "{offset_minutes} min after sunrise")
            }
        }
    }
}

/// A rule producing one event per calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTemplate {
    pub name: String,
    pub trigger: Trigger,
    pub action: Action,
}

impl EventTemplate {
    pub fn new(name: impl Into<String>, trigger: Trigger, action: Action) -> Self {
        Self {
            name: name.into(),
            trigger,
            action,
        }
    }

    /// Resolve this template's occurrence on `date`, expressed in `tz`.
    ///
    /// Fixed clock times falling into a daylight-saving gap do not exist on that
    /// date and fail; times repeated by a fall-back transition use the earlier one.
    pub fn resolve(&self, date: NaiveDate, tz: Tz, sunrise: &dyn SunriseSource) -> Result<Event> {
        let fire_instant = match self.trigger {
            Trigger::At(time) => tz
                .from_local_datetime(&date.and_time(time))
                .earliest()
                .with_context(|| {
                    format!(
                        "{} does not exist in {tz} on {date} (daylight saving gap)",
                        time.format("%H:%M:%S")
                    )
                })?,
            Trigger::Sunrise { offset_minutes } => {
                let sunrise = sunrise
                    .sunrise(date)
                    .with_context(|| format!("Failed to calculate sunrise for {date}"))?;
                (sunrise + Duration::minutes(offset_minutes)).with_timezone(&tz)
            }
        };

        Ok(Event {
            fire_instant,
            name: self.name.clone(),
            action: self.action.clone(),
        })
    }
}

/// A single scheduled occurrence of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub fire_instant: DateTime<Tz>,
    pub name: String,
    pub action: Action,
}

impl Event {
    /// Identity used for de-duplication.
    pub fn key(&self) -> EventKey {
        EventKey {
            fire_instant: self.fire_instant.with_timezone(&Utc),
            name: self.name.clone(),
        }
    }
}

/// De-duplication identity of an event: when it fires and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub fire_instant: DateTime<Utc>,
    pub name: String,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.fire_instant.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockLightDevice;
    use mockall::predicate::eq;

    struct FixedSunrise(NaiveTime);

    impl SunriseSource for FixedSunrise {
        fn sunrise(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
            Ok(date.and_time(self.0).and_utc())
        }
    }

    struct NoSunrise;

    impl SunriseSource for NoSunrise {
        fn sunrise(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
            anyhow::bail!("no sunrise on {date}")
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_time_resolves_in_schedule_timezone() {
        let tz = chrono_tz::America::New_York;
        let template = EventTemplate::new("morning-off", Trigger::At(time(10, 15)), Action::PowerOff);

        let event = template.resolve(date(2026, 6, 1), tz, &NoSunrise).unwrap();
        assert_eq!(event.name, "morning-off");
        assert_eq!(
            event.fire_instant.with_timezone(&Utc),
            date(2026, 6, 1).and_time(time(14, 15)).and_utc()
        );
    }

    #[test]
    fn test_sunrise_offset_is_applied() {
        let tz = chrono_tz::UTC;
        let template = EventTemplate::new(
            "fade",
            Trigger::Sunrise { offset_minutes: -30 },
            Action::PowerOff,
        );

        let event = template
            .resolve(date(2026, 6, 1), tz, &FixedSunrise(time(9, 10)))
            .unwrap();
        assert_eq!(
            event.fire_instant.with_timezone(&Utc),
            date(2026, 6, 1).and_time(time(8, 40)).and_utc()
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let tz = chrono_tz::Europe::Berlin;
        let template = EventTemplate::new(
            "mode",
            Trigger::Sunrise { offset_minutes: 45 },
            Action::SwitchEffect {
                effect: "Natural Light".to_string(),
            },
        );
        let sun = FixedSunrise(time(4, 50));
        let first = template.resolve(date(2026, 7, 4), tz, &sun).unwrap();
        let second = template.resolve(date(2026, 7, 4), tz, &sun).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn test_sunrise_failure_propagates() {
        let template = EventTemplate::new(
            "fade",
            Trigger::Sunrise { offset_minutes: 0 },
            Action::PowerOff,
        );
        let err = template
            .resolve(date(2026, 6, 1), chrono_tz::UTC, &NoSunrise)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to calculate sunrise"));
    }

    #[test]
    fn test_daylight_saving_gap_fails() {
        let tz = chrono_tz::America::New_York;
        let template = EventTemplate::new("probe", Trigger::At(time(2, 30)), Action::PowerOff);
        assert!(template.resolve(date(2026, 3, 8), tz, &NoSunrise).is_err());
        assert!(template.resolve(date(2026, 3, 9), tz, &NoSunrise).is_ok());
    }

    #[test]
    fn test_daylight_saving_overlap_uses_earlier_instant() {
        let tz = chrono_tz::America::New_York;
        let template = EventTemplate::new("probe", Trigger::At(time(1, 30)), Action::PowerOff);
        let event = template.resolve(date(2026, 11, 1), tz, &NoSunrise).unwrap();
        // 01:30 EDT, not 01:30 EST
        assert_eq!(
            event.fire_instant.with_timezone(&Utc),
            date(2026, 11, 1).and_time(time(5, 30)).and_utc()
        );
    }

    #[test]
    fn test_fade_in_executes_effect_then_fade() {
        let mut device = MockLightDevice::new();
        let mut seq = mockall::Sequence::new();
        device
            .expect_set_effect()
            .with(eq("Coral Sunrise"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        device
            .expect_set_brightness()
            .with(eq(1u8), eq(None::<u32>))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        device
            .expect_set_brightness()
            .with(eq(100u8), eq(Some(1800u32)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let action = Action::FadeIn {
            effect: "Coral Sunrise".to_string(),
            brightness: 100,
            fade_seconds: 1800,
        };
        action.execute(&mut device).unwrap();
    }

    #[test]
    fn test_execute_stops_at_first_failure() {
        let mut device = MockLightDevice::new();
        device
            .expect_set_effect()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("unreachable")));
        device.expect_set_brightness().times(0);

        let action = Action::FadeIn {
            effect: "Coral Sunrise".to_string(),
            brightness: 100,
            fade_seconds: 600,
        };
        assert!(action.execute(&mut device).is_err());
    }

    #[test]
    fn test_simple_actions_map_to_one_call() {
        let mut device = MockLightDevice::new();
        device.expect_power_off().times(1).returning(|| Ok(()));
        device
            .expect_set_color()
            .with(eq(Rgb::new(33, 0, 0)))
            .times(1)
            .returning(|_| Ok(()));

        Action::PowerOff.execute(&mut device).unwrap();
        Action::SetColor {
            color: Rgb::new(33, 0, 0),
        }
        .execute(&mut device)
        .unwrap();
    }

    #[test]
    fn test_trigger_display() {
        assert_eq!(Trigger::At(time(10, 15)).to_string(), "daily at 10:15:00");
        assert_eq!(
            Trigger::Sunrise { offset_minutes: -30 }.to_string(),
            "30 min before sunrise"
        );
        assert_eq!(Trigger::Sunrise { offset_minutes: 0 }.to_string(), "at sunrise");
        assert_eq!(
            Trigger::Sunrise { offset_minutes: 45 }.to_string(),
            "45 min after sunrise"
        );
    }
}
