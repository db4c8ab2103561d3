use chrono::{Datelike, Local, NaiveDate};

/// Whole years between `dob` and `today`, calendar arithmetic only
pub fn age_in_years(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Source of "today" for age and date-of-birth checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_is_zero() {
        let today = date(2024, 6, 15);
        assert_eq!(age_in_years(today, today), 0);
    }

    #[test]
    fn test_exact_birthday() {
        assert_eq!(age_in_years(date(2023, 6, 15), date(2024, 6, 15)), 1);
        assert_eq!(age_in_years(date(2000, 1, 1), date(2024, 1, 1)), 24);
    }

    #[test]
    fn test_day_before_birthday() {
        assert_eq!(age_in_years(date(2023, 6, 16), date(2024, 6, 15)), 0);
        assert_eq!(age_in_years(date(2011, 12, 31), date(2024, 12, 30)), 12);
    }

    #[test]
    fn test_leap_day_birthday() {
        assert_eq!(age_in_years(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(age_in_years(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date(2030, 1, 2));
        assert_eq!(clock.today(), date(2030, 1, 2));
    }
}
