use time::Date;

use super::MonthIndex;

pub const WEEKDAY_HEADERS: [&str; 7] = ["LUN", "MAR", "MIÉ", "JUE", "VIE", "SÁB", "DOM"];

/// Monday-first layout of one month for the mini calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: MonthIndex,
    /// Blank cells before day 1 (0 when the month starts on Monday).
    pub leading_blanks: u8,
    pub days_in_month: u8,
}

pub fn month_grid(year: i32, month: MonthIndex) -> Option<MonthGrid> {
    let (first, last) = month.bounds(year)?;
    Some(MonthGrid {
        year,
        month,
        leading_blanks: first.weekday().number_days_from_monday(),
        days_in_month: last.day(),
    })
}

impl MonthGrid {
    pub fn cells(&self) -> Vec<Option<u8>> {
        let mut cells = Vec::with_capacity(usize::from(self.leading_blanks + self.days_in_month));
        cells.extend((0..self.leading_blanks).map(|_| None));
        cells.extend((1..=self.days_in_month).map(Some));
        cells
    }

    pub fn weeks(&self) -> Vec<[Option<u8>; 7]> {
        self.cells()
            .chunks(7)
            .map(|chunk| {
                let mut week = [None; 7];
                week[..chunk.len()].copy_from_slice(chunk);
                week
            })
            .collect()
    }

    pub fn date(&self, day: u8) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month.month(), day).ok()
    }

    /// Row and column of `day` inside [`weeks`](Self::weeks).
    pub fn position(&self, day: u8) -> Option<(usize, usize)> {
        if day == 0 || day > self.days_in_month {
            return None;
        }
        let offset = usize::from(self.leading_blanks) + usize::from(day) - 1;
        Some((offset / 7, offset % 7))
    }
}
