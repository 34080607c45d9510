use std::collections::BTreeSet;

use time::Month;

use super::MonthIndex;
use crate::storage::Event;

/// Months of `year` touched by at least one event's `[start, end]` range.
///
/// Each event is walked from its start month to its end month one calendar
/// month at a time; the set keeps every month once.
pub fn months_with_events<'a, I>(events: I, year: i32) -> BTreeSet<MonthIndex>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut months = BTreeSet::new();
    for event in events {
        let start = event.start;
        let end = event.end_date();
        let last = (end.year(), u8::from(end.month()));
        let mut cursor = (start.year(), start.month());
        while (cursor.0, u8::from(cursor.1)) <= last {
            if cursor.0 == year {
                months.insert(MonthIndex::from(cursor.1));
            }
            cursor = next_month(cursor);
        }
    }
    months
}

/// Events whose range overlaps the given month, in input order.
pub fn events_in_month<'a, I>(events: I, year: i32, month: MonthIndex) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let Some((first, last)) = month.bounds(year) else {
        return Vec::new();
    };
    events
        .into_iter()
        .filter(|event| event.overlaps(first, last))
        .collect()
}

/// Event count per non-empty month, ordered January to December.
pub fn month_counts<'a, I>(events: I, year: i32) -> Vec<(MonthIndex, usize)>
where
    I: IntoIterator<Item = &'a Event> + Clone,
{
    months_with_events(events.clone(), year)
        .into_iter()
        .map(|month| (month, events_in_month(events.clone(), year, month).len()))
        .collect()
}

fn next_month((year, month): (i32, Month)) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        other => (year, other.next()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::event;
    use crate::storage::{Category, Semester};
    use time::macros::date;

    fn month(index: u8) -> MonthIndex {
        MonthIndex::new(index).expect("valid month")
    }

    #[test]
    fn range_across_month_boundary_touches_both_months() {
        let spanning = event(
            "cierre",
            "Cierre de matrícula",
            date!(2026 - 01 - 30),
            Some(date!(2026 - 02 - 02)),
            Category::Academico,
            Semester::Nivelacion2026,
        );
        let months = months_with_events([&spanning], 2026);
        assert_eq!(months.into_iter().collect::<Vec<_>>(), vec![month(0), month(1)]);

        assert_eq!(events_in_month([&spanning], 2026, month(0)).len(), 1);
        assert_eq!(events_in_month([&spanning], 2026, month(1)).len(), 1);
        assert!(events_in_month([&spanning], 2026, month(2)).is_empty());
    }

    #[test]
    fn walk_filters_to_target_year_and_terminates_on_long_ranges() {
        let long = event(
            "vacaciones",
            "Receso",
            date!(2025 - 11 - 20),
            Some(date!(2027 - 02 - 10)),
            Category::NoLectivo,
            Semester::General,
        );
        let months = months_with_events([&long], 2026);
        assert_eq!(months.len(), 12);
        let only_2025 = months_with_events([&long], 2025);
        assert_eq!(
            only_2025.into_iter().collect::<Vec<_>>(),
            vec![month(10), month(11)]
        );
    }

    #[test]
    fn overlapping_events_do_not_double_count_months() {
        let a = event(
            "a",
            "A",
            date!(2026 - 04 - 01),
            Some(date!(2026 - 04 - 30)),
            Category::Academico,
            Semester::Primero2026,
        );
        let b = event(
            "b",
            "B",
            date!(2026 - 04 - 15),
            None,
            Category::Examenes,
            Semester::Primero2026,
        );
        let months = months_with_events([&a, &b], 2026);
        assert_eq!(months.len(), 1);
        assert_eq!(month_counts([&a, &b], 2026), vec![(month(3), 2)]);
    }

    #[test]
    fn single_day_event_at_month_edges_belongs_to_one_month() {
        let last_day = event(
            "fin-de-mes",
            "Último día",
            date!(2026 - 03 - 31),
            None,
            Category::Academico,
            Semester::Primero2026,
        );
        assert_eq!(events_in_month([&last_day], 2026, month(2)).len(), 1);
        assert!(events_in_month([&last_day], 2026, month(3)).is_empty());
        assert!(events_in_month([&last_day], 2025, month(2)).is_empty());
    }
}
