//! Schedule construction.
//!
//! A schedule is rebuilt from the catalog on every loop iteration. For each
//! template the builder picks a single occurrence:
//!
//! 1. yesterday's, if it is still inside the grace window and eligible (an
//!    event just before midnight that the loop has not reached yet)
//! 2. otherwise today's, unless it is older than the grace window
//! 3. otherwise tomorrow's
//!
//! The chosen occurrence is then dropped if the registry says it already fired
//! or its retry attempts are used up. An occurrence between `now - grace` and
//! `now` is late but still due and is kept.

use anyhow::Error;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use super::SchedulerSettings;
use super::catalog::Catalog;
use super::event::{Event, EventTemplate};
use super::registry::FiredRegistry;
use crate::geo::SunriseSource;

/// A template that could not be resolved on this pass.
#[derive(Debug)]
pub struct SkippedTemplate {
    pub name: String,
    pub error: Error,
}

/// Pending events for one instant, earliest first.
#[derive(Debug, Default)]
pub struct Schedule {
    pub events: Vec<Event>,
    pub skipped: Vec<SkippedTemplate>,
}

impl Schedule {
    pub fn next(&self) -> Option<&Event> {
        self.events.first()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Build the schedule as seen at `now`.
///
/// Resolution failures do not abort the pass; the template is reported in
/// [`Schedule::skipped`] and the others are still scheduled.
pub fn build_schedule(
    catalog: &Catalog,
    sunrise: &dyn SunriseSource,
    registry: &mut FiredRegistry,
    settings: &SchedulerSettings,
    now: DateTime<Tz>,
) -> Schedule {
    let mut schedule = Schedule::default();

    for template in catalog.templates() {
        match next_occurrence(template, sunrise, registry, settings, now) {
            Ok(Some(event)) => schedule.events.push(event),
            Ok(None) => {}
            Err(error) => schedule.skipped.push(SkippedTemplate {
                name: template.name.clone(),
                error,
            }),
        }
    }

    schedule
        .events
        .sort_by(|a, b| (a.fire_instant, &a.name).cmp(&(b.fire_instant, &b.name)));
    schedule
}

fn next_occurrence(
    template: &EventTemplate,
    sunrise: &dyn SunriseSource,
    registry: &mut FiredRegistry,
    settings: &SchedulerSettings,
    now: DateTime<Tz>,
) -> anyhow::Result<Option<Event>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    // A failed lookup for yesterday only means there is nothing to carry over
    if let Some(yesterday) = today.checked_sub_days(Days::new(1))
        && let Ok(event) = template.resolve(yesterday, tz, sunrise)
        && !is_stale(&event, now, settings)
        && registry.is_eligible(&event.key(), now_utc, settings.max_attempts)
    {
        return Ok(Some(event));
    }

    let mut event = template.resolve(today, tz, sunrise)?;
    if is_stale(&event, now, settings) {
        event = template.resolve(next_day(today)?, tz, sunrise)?;
    }

    if registry.is_eligible(&event.key(), now_utc, settings.max_attempts) {
        Ok(Some(event))
    } else {
        Ok(None)
    }
}

/// Older than the grace window.
fn is_stale(event: &Event, now: DateTime<Tz>, settings: &SchedulerSettings) -> bool {
    now.signed_duration_since(event.fire_instant) > settings.grace_window
}

fn next_day(date: NaiveDate) -> anyhow::Result<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow::anyhow!("no calendar date after {date}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::event::{Action, Trigger};
    use chrono::{NaiveTime, TimeZone};

    struct FixedSunrise(NaiveTime);

    impl SunriseSource for FixedSunrise {
        fn sunrise(&self, date: NaiveDate) -> anyhow::Result<DateTime<Utc>> {
            Ok(date.and_time(self.0).and_utc())
        }
    }

    struct NoSunrise;

    impl SunriseSource for NoSunrise {
        fn sunrise(&self, date: NaiveDate) -> anyhow::Result<DateTime<Utc>> {
            anyhow::bail!("no sunrise on {date}")
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(2026, 6, d, h, m, 0).unwrap()
    }

    fn daily(name: &str, h: u32, m: u32) -> EventTemplate {
        EventTemplate::new(name, Trigger::At(time(h, m)), Action::PowerOff)
    }

    fn build(catalog: &Catalog, registry: &mut FiredRegistry, at: DateTime<Tz>) -> Schedule {
        build_schedule(
            catalog,
            &FixedSunrise(time(5, 10)),
            registry,
            &SchedulerSettings::default(),
            at,
        )
    }

    #[test]
    fn test_future_event_is_today() {
        let catalog = Catalog::new(vec![daily("off", 10, 15)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build(&catalog, &mut registry, now(1, 8, 0));
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].fire_instant, now(1, 10, 15));
    }

    #[test]
    fn test_late_event_within_grace_is_still_due() {
        let catalog = Catalog::new(vec![daily("off", 10, 15)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build(&catalog, &mut registry, now(1, 10, 20));
        assert_eq!(schedule.events[0].fire_instant, now(1, 10, 15));

        // Exactly at the edge of the window
        let schedule = build(&catalog, &mut registry, now(1, 10, 25));
        assert_eq!(schedule.events[0].fire_instant, now(1, 10, 15));
    }

    #[test]
    fn test_stale_event_rolls_to_tomorrow() {
        let catalog = Catalog::new(vec![daily("off", 10, 15)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build(&catalog, &mut registry, now(1, 10, 30));
        assert_eq!(schedule.events[0].fire_instant, now(2, 10, 15));
    }

    #[test]
    fn test_fired_event_is_excluded_until_grace_passes() {
        let catalog = Catalog::new(vec![daily("off", 10, 15)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let first = build(&catalog, &mut registry, now(1, 10, 20));
        registry.mark_fired(first.events[0].key());

        assert!(build(&catalog, &mut registry, now(1, 10, 21)).is_empty());
        let later = build(&catalog, &mut registry, now(1, 10, 26));
        assert_eq!(later.events[0].fire_instant, now(2, 10, 15));
    }

    #[test]
    fn test_exhausted_attempts_drop_the_occurrence() {
        let catalog = Catalog::new(vec![daily("off", 10, 15)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));
        let key = build(&catalog, &mut registry, now(1, 10, 15)).events[0].key();

        for _ in 0..SchedulerSettings::default().max_attempts - 1 {
            registry.record_failure(key.clone());
        }
        assert_eq!(build(&catalog, &mut registry, now(1, 10, 16)).events.len(), 1);

        registry.record_failure(key);
        assert!(build(&catalog, &mut registry, now(1, 10, 16)).is_empty());
    }

    #[test]
    fn test_events_sorted_by_instant_then_name() {
        let catalog = Catalog::new(vec![
            daily("night", 20, 0),
            daily("b-off", 10, 15),
            daily("a-off", 10, 15),
            EventTemplate::new(
                "dawn",
                Trigger::Sunrise { offset_minutes: -30 },
                Action::PowerOff,
            ),
        ]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build(&catalog, &mut registry, now(1, 6, 0));
        let names: Vec<&str> = schedule.events.iter().map(|e| e.name.as_str()).collect();
        // Dawn (04:40) has passed, so it is tomorrow's and sorts last
        assert_eq!(names, ["a-off", "b-off", "night", "dawn"]);
        assert_eq!(schedule.next().unwrap().name, "a-off");
    }

    #[test]
    fn test_midnight_carry_over_keeps_yesterdays_event() {
        let catalog = Catalog::new(vec![daily("late", 23, 58)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build(&catalog, &mut registry, now(2, 0, 3));
        assert_eq!(schedule.events[0].fire_instant, now(1, 23, 58));

        // Once it fired, today's occurrence takes over
        registry.mark_fired(schedule.events[0].key());
        let schedule = build(&catalog, &mut registry, now(2, 0, 4));
        assert_eq!(schedule.events[0].fire_instant, now(2, 23, 58));
    }

    #[test]
    fn test_unresolvable_template_is_skipped() {
        let catalog = Catalog::new(vec![
            EventTemplate::new(
                "dawn",
                Trigger::Sunrise { offset_minutes: 0 },
                Action::PowerOff,
            ),
            daily("off", 10, 15),
        ]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build_schedule(
            &catalog,
            &NoSunrise,
            &mut registry,
            &SchedulerSettings::default(),
            now(1, 8, 0),
        );
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].name, "off");
        assert_eq!(schedule.skipped.len(), 1);
        assert_eq!(schedule.skipped[0].name, "dawn");
    }

    #[test]
    fn test_polar_day_skips_sunrise_templates() {
        let catalog = Catalog::new(vec![
            EventTemplate::new(
                "fade-in",
                Trigger::Sunrise { offset_minutes: -30 },
                Action::PowerOff,
            ),
            daily("off", 10, 15),
        ]);
        let svalbard = crate::geo::SolarSunrise::new(78.2, 15.6).unwrap();
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));

        let schedule = build_schedule(
            &catalog,
            &svalbard,
            &mut registry,
            &SchedulerSettings::default(),
            chrono_tz::UTC.with_ymd_and_hms(2026, 6, 21, 8, 0, 0).unwrap(),
        );
        let names: Vec<&str> = schedule.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["off"]);
        assert_eq!(schedule.skipped.len(), 1);
        assert_eq!(schedule.skipped[0].name, "fade-in");
    }

    #[test]
    fn test_schedule_uses_local_dates() {
        // 02:00 UTC is still the previous evening in New York
        let tz = chrono_tz::America::New_York;
        let catalog = Catalog::new(vec![daily("night", 20, 0)]);
        let mut registry = FiredRegistry::new(chrono::Duration::days(2));
        let at = Utc
            .with_ymd_and_hms(2026, 6, 2, 2, 0, 0)
            .unwrap()
            .with_timezone(&tz);

        let schedule = build(&catalog, &mut registry, at);
        assert_eq!(
            schedule.events[0].fire_instant,
            tz.with_ymd_and_hms(2026, 6, 2, 20, 0, 0).unwrap()
        );
    }
}
