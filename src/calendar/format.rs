//! Spanish date and duration labels used by the TUI and the CLI.

use time::Date;

use super::MonthIndex;
use crate::storage::Event;

const WEEKDAYS: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

fn weekday_name(date: Date) -> &'static str {
    WEEKDAYS[usize::from(date.weekday().number_days_from_monday())]
}

fn month_name_lower(date: Date) -> String {
    MonthIndex::from(date.month()).name().to_lowercase()
}

fn month_short_lower(date: Date) -> String {
    MonthIndex::from(date.month()).short_name().to_lowercase()
}

/// `lunes, 15 de marzo de 2026`
pub fn long_date(date: Date) -> String {
    format!(
        "{}, {} de {} de {}",
        weekday_name(date),
        date.day(),
        month_name_lower(date),
        date.year()
    )
}

/// `lunes, 15 de marzo`
pub fn day_heading(date: Date) -> String {
    format!(
        "{}, {} de {}",
        weekday_name(date),
        date.day(),
        month_name_lower(date)
    )
}

/// `15 mar 2026`
pub fn short_date(date: Date) -> String {
    format!("{} {} {}", date.day(), month_short_lower(date), date.year())
}

/// `10 - 12 may 2026` within one month, `30 ene 2026 - 2 feb 2026` otherwise.
pub fn range_label(start: Date, end: Date) -> String {
    if start.year() == end.year() && start.month() == end.month() {
        if start == end {
            return short_date(start);
        }
        return format!(
            "{} - {} {} {}",
            start.day(),
            end.day(),
            month_short_lower(start),
            start.year()
        );
    }
    format!("{} - {}", short_date(start), short_date(end))
}

pub fn event_dates_label(event: &Event) -> String {
    if event.shows_as_range() {
        range_label(event.start, event.end_date())
    } else {
        short_date(event.start)
    }
}

/// Human duration for an inclusive day count, in 7-day weeks and 30-day
/// months.
pub fn duration_label(days: i64) -> String {
    let days = days.max(1);
    if days == 1 {
        return "1 día".to_string();
    }
    if days < 7 {
        return format!("{days} días");
    }
    if days < 30 {
        let weeks = days / 7;
        let rest = days % 7;
        let weeks_label = plural(weeks, "semana", "semanas");
        if rest == 0 {
            return weeks_label;
        }
        return format!("{weeks_label} y {}", plural(rest, "día", "días"));
    }
    let months = days / 30;
    let rest = days % 30;
    let months_label = plural(months, "mes", "meses");
    if rest == 0 {
        return months_label;
    }
    format!("{months_label} y {}", plural(rest, "día", "días"))
}

pub fn event_duration_label(event: &Event) -> String {
    if event.end.is_none() {
        return duration_label(1);
    }
    duration_label(event.day_count())
}

pub fn events_count_label(count: usize) -> String {
    if count == 1 {
        "1 evento".to_string()
    } else {
        format!("{count} eventos")
    }
}

fn plural(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn long_dates_are_spanish() {
        assert_eq!(long_date(date!(2026 - 03 - 15)), "domingo, 15 de marzo de 2026");
        assert_eq!(day_heading(date!(2026 - 07 - 28)), "martes, 28 de julio");
    }

    #[test]
    fn range_labels_collapse_same_month() {
        assert_eq!(
            range_label(date!(2026 - 05 - 10), date!(2026 - 05 - 12)),
            "10 - 12 may 2026"
        );
        assert_eq!(
            range_label(date!(2026 - 01 - 30), date!(2026 - 02 - 02)),
            "30 ene 2026 - 2 feb 2026"
        );
        assert_eq!(
            range_label(date!(2026 - 08 - 06), date!(2026 - 08 - 06)),
            "6 ago 2026"
        );
    }

    #[test]
    fn durations_use_weeks_and_months() {
        let cases = [
            (1, "1 día"),
            (3, "3 días"),
            (7, "1 semana"),
            (9, "1 semana y 2 días"),
            (14, "2 semanas"),
            (22, "3 semanas y 1 día"),
            (30, "1 mes"),
            (45, "1 mes y 15 días"),
            (61, "2 meses y 1 día"),
        ];
        for (days, expected) in cases {
            assert_eq!(duration_label(days), expected, "{days} days");
        }
    }

    #[test]
    fn count_label_pluralises() {
        assert_eq!(events_count_label(0), "0 eventos");
        assert_eq!(events_count_label(1), "1 evento");
        assert_eq!(events_count_label(12), "12 eventos");
    }
}
