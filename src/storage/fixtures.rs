use time::Date;

use super::{Category, Event, Semester};

pub(crate) fn event(
    id: &str,
    title: &str,
    start: Date,
    end: Option<Date>,
    category: Category,
    semester: Semester,
) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        start,
        end,
        category,
        semester,
        is_range: end.is_some(),
    }
}

pub(crate) fn described(mut event: Event, description: &str) -> Event {
    event.description = Some(description.to_string());
    event
}
