//! Calendar arithmetic over plain dates.
//!
//! Everything here works on `time::Date`, which carries no time-of-day or
//! offset, so walking a range can never drift across a day boundary.

use std::fmt;
use std::str::FromStr;

use time::macros::format_description;
use time::{Date, Month};

pub mod days;
pub mod format;
pub mod grid;
pub mod months;
pub mod timeline;

pub use days::{events_by_day, events_on_day, DayBuckets};
pub use months::{events_in_month, month_counts, months_with_events};

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTH_SHORT_NAMES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Zero-based month of the year (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthIndex(u8);

impl MonthIndex {
    pub const COUNT: u8 = 12;

    pub fn new(index: u8) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    /// One-based constructor, as months are written by people.
    pub fn from_number(number: u8) -> Option<Self> {
        number.checked_sub(1).and_then(Self::new)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn number(self) -> u8 {
        self.0 + 1
    }

    pub fn month(self) -> Month {
        Month::January.nth_next(self.0)
    }

    pub fn all() -> impl Iterator<Item = MonthIndex> {
        (0..Self::COUNT).map(MonthIndex)
    }

    pub fn name(self) -> &'static str {
        MONTH_NAMES[usize::from(self.0)]
    }

    pub fn short_name(self) -> &'static str {
        MONTH_SHORT_NAMES[usize::from(self.0)]
    }

    /// First and last day of this month in `year`.
    pub fn bounds(self, year: i32) -> Option<(Date, Date)> {
        let month = self.month();
        let first = Date::from_calendar_date(year, month, 1).ok()?;
        let last_day = month.length(year);
        let last = Date::from_calendar_date(year, month, last_day).ok()?;
        Some((first, last))
    }
}

impl From<Month> for MonthIndex {
    fn from(month: Month) -> Self {
        MonthIndex(u8::from(month) - 1)
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical `YYYY-MM-DD` day key; equality is exact date equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(Date);

impl DateKey {
    pub fn new(date: Date) -> Self {
        DateKey(date)
    }

    pub fn date(self) -> Date {
        self.0
    }
}

impl From<Date> for DateKey {
    fn from(date: Date) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = time::error::Parse;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_date(input).map(DateKey)
    }
}

pub fn parse_date(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
}

/// Inclusive walk over consecutive days. An end before the start yields
/// nothing; the walk stops at `Date::MAX` instead of overflowing.
#[derive(Debug, Clone)]
pub struct DayRange {
    next: Option<Date>,
    end: Date,
}

impl DayRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for DayRange {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next?;
        self.next = if current < self.end {
            current.next_day()
        } else {
            None
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn date_keys_are_zero_padded() {
        let key = DateKey::from(date!(2026 - 03 - 05));
        assert_eq!(key.to_string(), "2026-03-05");
        assert_eq!("2026-03-05".parse::<DateKey>().ok(), Some(key));
        assert!("2026-3-5".parse::<DateKey>().is_err());
    }

    #[test]
    fn parsed_dates_do_not_shift_across_offsets() {
        // A date parsed without a time component stays on the same day no
        // matter where it is compared; walk through both 2026 DST changes.
        for raw in ["2026-03-08", "2026-03-29", "2026-10-25", "2026-11-01"] {
            let parsed = parse_date(raw).expect("valid date");
            assert_eq!(DateKey::from(parsed).to_string(), raw);
            let next = parsed.next_day().expect("has next day");
            assert_eq!((next - parsed).whole_days(), 1);
        }
    }

    #[test]
    fn day_range_is_inclusive_and_handles_reversed_bounds() {
        let days: Vec<_> = DayRange::new(date!(2026 - 05 - 10), date!(2026 - 05 - 12)).collect();
        assert_eq!(
            days,
            vec![
                date!(2026 - 05 - 10),
                date!(2026 - 05 - 11),
                date!(2026 - 05 - 12)
            ]
        );
        assert_eq!(
            DayRange::new(date!(2026 - 05 - 12), date!(2026 - 05 - 10)).count(),
            0
        );
        assert_eq!(DayRange::new(Date::MAX, Date::MAX).count(), 1);
    }

    #[test]
    fn month_index_bounds_follow_leap_years() {
        let february = MonthIndex::new(1).expect("february");
        assert_eq!(february.month(), Month::February);
        assert_eq!(
            february.bounds(2026),
            Some((date!(2026 - 02 - 01), date!(2026 - 02 - 28)))
        );
        assert_eq!(
            february.bounds(2028),
            Some((date!(2028 - 02 - 01), date!(2028 - 02 - 29)))
        );
        assert_eq!(MonthIndex::from(Month::December).index(), 11);
        assert!(MonthIndex::new(12).is_none());
        assert_eq!(MonthIndex::from_number(3).map(MonthIndex::name), Some("Marzo"));
    }
}
