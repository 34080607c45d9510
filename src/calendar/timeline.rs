use time::Date;

use super::MonthIndex;
use crate::search::group_by_category;
use crate::storage::{Category, Event};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthMarker {
    pub month: MonthIndex,
    pub year: i32,
    /// Days from the timeline origin to the first of the month.
    pub offset: i64,
    pub width: u8,
}

#[derive(Debug, Clone)]
pub struct TimelineBar<'a> {
    pub event: &'a Event,
    pub offset: i64,
    pub length: i64,
}

#[derive(Debug, Clone)]
pub struct TimelineRow<'a> {
    pub category: Category,
    pub bars: Vec<TimelineBar<'a>>,
}

/// Horizontal layout of events, one row per non-empty category.
#[derive(Debug, Clone)]
pub struct Timeline<'a> {
    pub origin: Date,
    pub last: Date,
    pub total_days: i64,
    pub months: Vec<MonthMarker>,
    pub rows: Vec<TimelineRow<'a>>,
}

/// Lays out `events` over whole months, from the month of the earliest start
/// to the month of the latest end. `None` when there is nothing to show.
pub fn build_timeline<'a>(events: &[&'a Event]) -> Option<Timeline<'a>> {
    let earliest = events.iter().map(|event| event.start).min()?;
    let latest = events.iter().map(|event| event.end_date()).max()?;

    let (origin, _) = MonthIndex::from(earliest.month()).bounds(earliest.year())?;
    let (_, last) = MonthIndex::from(latest.month()).bounds(latest.year())?;
    let total_days = (last - origin).whole_days() + 1;

    let mut months = Vec::new();
    let mut cursor = origin;
    while cursor <= last {
        let month = MonthIndex::from(cursor.month());
        let (first, month_last) = month.bounds(cursor.year())?;
        months.push(MonthMarker {
            month,
            year: cursor.year(),
            offset: (first - origin).whole_days(),
            width: month_last.day(),
        });
        cursor = match month_last.next_day() {
            Some(next) => next,
            None => break,
        };
    }

    let rows = group_by_category(events.iter().copied())
        .into_iter()
        .filter(|(_, grouped)| !grouped.is_empty())
        .map(|(category, grouped)| TimelineRow {
            category,
            bars: grouped
                .into_iter()
                .map(|event| TimelineBar {
                    event,
                    offset: (event.start - origin).whole_days(),
                    length: event.day_count(),
                })
                .collect(),
        })
        .collect();

    Some(Timeline {
        origin,
        last,
        total_days,
        months,
        rows,
    })
}

impl Timeline<'_> {
    /// Maps a day offset onto `width` columns.
    pub fn column(&self, offset: i64, width: u16) -> u16 {
        if self.total_days <= 0 || width == 0 {
            return 0;
        }
        let scaled = offset.clamp(0, self.total_days) * i64::from(width) / self.total_days;
        u16::try_from(scaled).unwrap_or(width).min(width.saturating_sub(1))
    }
}
