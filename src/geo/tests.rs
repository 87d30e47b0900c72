// Sunrise source tests against known locations
#[cfg(test)]
mod solar_tests {
    use crate::geo::solar::*;
    use chrono::{NaiveDate, Timelike};

    const NORTHAMPTON: (f64, f64) = (42.317794, -72.631973);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Test that coordinate validation works correctly at the API boundary.
    #[test]
    fn test_coordinate_validation() {
        assert!(SolarSunrise::new(40.7128, -74.0060).is_ok());
        assert!(SolarSunrise::new(90.0, 180.0).is_ok());
        assert!(SolarSunrise::new(-90.0, -180.0).is_ok());

        assert!(SolarSunrise::new(91.0, 0.0).is_err());
        assert!(SolarSunrise::new(-91.0, 0.0).is_err());
        assert!(SolarSunrise::new(0.0, 181.0).is_err());
        assert!(SolarSunrise::new(0.0, -181.0).is_err());
    }

    /// Test summer and winter sunrise for western Massachusetts.
    #[test]
    fn test_northampton_sunrise() {
        let source = SolarSunrise::new(NORTHAMPTON.0, NORTHAMPTON.1).unwrap();

        // ~05:10 EDT in late June
        let summer = source.sunrise(date(2026, 6, 21)).unwrap();
        assert_eq!(summer.date_naive(), date(2026, 6, 21));
        assert!(summer.hour() >= 8 && summer.hour() <= 10, "got {summer}");

        // ~07:15 EST in late December
        let winter = source.sunrise(date(2026, 12, 21)).unwrap();
        assert_eq!(winter.date_naive(), date(2026, 12, 21));
        assert!(winter.hour() >= 11 && winter.hour() <= 13, "got {winter}");

        assert!(summer.time() < winter.time());
    }

    /// Test that repeated lookups for the same date agree to the second.
    #[test]
    fn test_sunrise_is_deterministic() {
        let source = SolarSunrise::new(NORTHAMPTON.0, NORTHAMPTON.1).unwrap();
        let first = source.sunrise(date(2026, 3, 1)).unwrap();
        let second = source.sunrise(date(2026, 3, 1)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.nanosecond(), 0);
    }

    /// Test that consecutive days move sunrise by minutes, not hours.
    #[test]
    fn test_consecutive_days_are_close() {
        let source = SolarSunrise::new(NORTHAMPTON.0, NORTHAMPTON.1).unwrap();
        let today = source.sunrise(date(2026, 10, 15)).unwrap();
        let tomorrow = source.sunrise(date(2026, 10, 16)).unwrap();
        let delta = tomorrow.signed_duration_since(today);
        assert!(delta.num_minutes() >= 23 * 60 && delta.num_minutes() <= 25 * 60);
    }

    /// Test an eastern-hemisphere location whose sunrise falls on the previous UTC day.
    #[test]
    fn test_sunrise_before_utc_midnight() {
        let singapore = SolarSunrise::new(1.3521, 103.8198).unwrap();
        let sunrise = singapore.sunrise(date(2026, 6, 21)).unwrap();
        assert_eq!(sunrise.date_naive(), date(2026, 6, 20));
        assert!(sunrise.hour() >= 22);
    }

    /// Test that polar day and polar night report no sunrise instead of a bogus instant.
    #[test]
    fn test_polar_day_and_night_have_no_sunrise() {
        let svalbard = SolarSunrise::new(78.2, 15.6).unwrap();
        for day in [date(2026, 6, 21), date(2026, 12, 21)] {
            let err = svalbard.sunrise(day).unwrap_err();
            assert!(err.to_string().contains("No sunrise"), "got {err}");
        }

        // Seasons are reversed in the south
        let antarctic = SolarSunrise::new(-78.0, 166.7).unwrap();
        assert!(antarctic.sunrise(date(2026, 12, 21)).is_err());
        assert!(antarctic.sunrise(date(2026, 6, 21)).is_err());

        // Tromsø around the winter solstice
        let tromso = SolarSunrise::new(69.65, 18.96).unwrap();
        assert!(tromso.sunrise(date(2026, 12, 10)).is_err());
        assert!(tromso.sunrise(date(2026, 3, 21)).is_ok());
    }
}
