//! Age derivation and the clock it reads "today" from.

use jiff::civil::Date;

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Reads the system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        jiff::Zoned::now().date()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Whole years between `dob` and `today`.
///
/// The year difference drops by one when today's ordinal day is strictly
/// before the birth date's ordinal day. Ordinal days are compared as-is, so
/// in leap years dates after Feb 28 shift by one.
pub fn age_on(dob: Date, today: Date) -> i32 {
    let years = i32::from(today.year()) - i32::from(dob.year());
    if today.day_of_year() < dob.day_of_year() {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use proptest::prelude::*;

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(age_on(date(2000, 5, 15), date(2024, 5, 14)), 23);
    }

    #[test]
    fn test_age_day_after_birthday() {
        assert_eq!(age_on(date(2000, 5, 15), date(2024, 5, 16)), 24);
    }

    #[test]
    fn test_age_born_today_is_zero() {
        let today = date(2024, 3, 10);
        assert_eq!(age_on(today, today), 0);
    }

    #[test]
    fn test_age_compares_ordinal_days() {
        // 2023-03-01 is day 60, 2024-02-29 is day 60
        assert_eq!(age_on(date(2023, 3, 1), date(2024, 2, 29)), 1);
        // 2000-03-01 is day 61 (leap year), 2001-03-01 is day 60
        assert_eq!(age_on(date(2000, 3, 1), date(2001, 3, 1)), 0);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date(2024, 5, 14));
        assert_eq!(clock.today(), date(2024, 5, 14));
    }

    fn any_date() -> impl Strategy<Value = Date> {
        (1900i16..=2100, 1i16..=366).prop_map(|(year, day)| {
            let first = date(year, 1, 1);
            let day = day.min(first.days_in_year());
            first.with().day_of_year(day).build().unwrap()
        })
    }

    proptest! {
        #[test]
        fn property_same_ordinal_day_gives_year_distance(dob in any_date(), years in 0i16..100) {
            let first = date(dob.year() + years, 1, 1);
            prop_assume!(dob.day_of_year() <= first.days_in_year());
            let today = first.with().day_of_year(dob.day_of_year()).build().unwrap();
            prop_assert_eq!(age_on(dob, today), i32::from(years));
        }

        #[test]
        fn property_age_is_year_distance_or_one_less(dob in any_date(), today in any_date()) {
            let years = i32::from(today.year()) - i32::from(dob.year());
            let age = age_on(dob, today);
            prop_assert!(age == years || age == years - 1);
        }

        #[test]
        fn property_age_never_decreases_within_a_year(dob in any_date(), today in any_date()) {
            let tomorrow = today.tomorrow().unwrap();
            prop_assume!(tomorrow.year() == today.year());
            prop_assert!(age_on(dob, tomorrow) >= age_on(dob, today));
        }
    }
}
