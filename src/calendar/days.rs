use std::collections::BTreeMap;

use time::Date;

use super::DateKey;
use crate::storage::Event;

pub type DayBuckets<'a> = BTreeMap<DateKey, Vec<&'a Event>>;

/// Buckets every event under each day of its inclusive range.
///
/// The walk is not clipped to any month: callers restrict the input to the
/// month they render and simply never look up keys outside it.
pub fn events_by_day<'a, I>(events: I) -> DayBuckets<'a>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut buckets: DayBuckets<'a> = BTreeMap::new();
    for event in events {
        for day in event.days() {
            buckets.entry(DateKey::from(day)).or_default().push(event);
        }
    }
    buckets
}

/// Events active on `date`, in input order.
pub fn events_on_day<'a, I>(events: I, date: Date) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter(|event| event.contains(date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::event;
    use crate::storage::{Category, Semester};
    use time::macros::date;

    fn keys(buckets: &DayBuckets<'_>) -> Vec<String> {
        buckets.keys().map(ToString::to_string).collect()
    }

    #[test]
    fn single_day_event_lands_in_exactly_one_bucket() {
        let exam = event(
            "parcial",
            "Examen parcial",
            date!(2026 - 03 - 15),
            None,
            Category::Examenes,
            Semester::Nivelacion2026,
        );
        let buckets = events_by_day([&exam]);
        assert_eq!(keys(&buckets), vec!["2026-03-15"]);
    }

    #[test]
    fn range_event_fills_each_day_inclusive() {
        let week = event(
            "semana",
            "Semana de inducción",
            date!(2026 - 05 - 10),
            Some(date!(2026 - 05 - 12)),
            Category::Bienestar,
            Semester::Primero2026,
        );
        let buckets = events_by_day([&week]);
        assert_eq!(keys(&buckets), vec!["2026-05-10", "2026-05-11", "2026-05-12"]);
    }

    #[test]
    fn overlapping_events_keep_encounter_order() {
        let first = event(
            "primero",
            "Primero",
            date!(2026 - 06 - 01),
            Some(date!(2026 - 06 - 03)),
            Category::Academico,
            Semester::Primero2026,
        );
        let second = event(
            "segundo",
            "Segundo",
            date!(2026 - 06 - 02),
            None,
            Category::Biblioteca,
            Semester::Primero2026,
        );
        let buckets = events_by_day([&first, &second]);
        let shared = buckets
            .get(&DateKey::from(date!(2026 - 06 - 02)))
            .expect("bucket for shared day");
        let ids: Vec<_> = shared.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["primero", "segundo"]);
        assert_eq!(
            buckets
                .get(&DateKey::from(date!(2026 - 06 - 03)))
                .map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn walk_crosses_month_boundaries() {
        let spanning = event(
            "fin-de-ano",
            "Receso",
            date!(2026 - 12 - 30),
            Some(date!(2027 - 01 - 02)),
            Category::NoLectivo,
            Semester::General,
        );
        let buckets = events_by_day([&spanning]);
        assert_eq!(
            keys(&buckets),
            vec!["2026-12-30", "2026-12-31", "2027-01-01", "2027-01-02"]
        );
    }

    #[test]
    fn events_on_day_uses_inclusive_bounds() {
        let range = event(
            "matricula",
            "Matrícula",
            date!(2026 - 03 - 23),
            Some(date!(2026 - 03 - 27)),
            Category::Academico,
            Semester::Primero2026,
        );
        assert_eq!(events_on_day([&range], date!(2026 - 03 - 23)).len(), 1);
        assert_eq!(events_on_day([&range], date!(2026 - 03 - 27)).len(), 1);
        assert!(events_on_day([&range], date!(2026 - 03 - 28)).is_empty());
    }
}
