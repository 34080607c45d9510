use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use time::Date;

use crate::calendar::{DateKey, DayRange};

mod schema;

pub use schema::{Category, Semester};
use schema::{RawCalendar, RawEvent};

#[cfg(test)]
pub(crate) mod fixtures;

const BUNDLED_CALENDAR: &str = include_str!("../../data/calendar-2026.toml");
const BUNDLED_LABEL: &str = "<bundled calendar-2026.toml>";

static EVENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid event id pattern"));

/// A dated activity on the academic calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: Date,
    pub end: Option<Date>,
    pub category: Category,
    pub semester: Semester,
    pub is_range: bool,
}

impl Event {
    /// Inclusive last day; single-day events end where they start.
    pub fn end_date(&self) -> Date {
        self.end.unwrap_or(self.start)
    }

    pub fn days(&self) -> DayRange {
        DayRange::new(self.start, self.end_date())
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end_date()
    }

    /// Interval overlap against the inclusive window `[from, to]`.
    pub fn overlaps(&self, from: Date, to: Date) -> bool {
        self.start <= to && self.end_date() >= from
    }

    pub fn day_count(&self) -> i64 {
        (self.end_date() - self.start).whole_days() + 1
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Date range display applies only when the flag is set and an end exists.
    pub fn shows_as_range(&self) -> bool {
        self.is_range && self.end.is_some()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading calendar data {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing calendar data {source_label}")]
    Parse {
        source_label: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("event id {id:?} must be a lowercase slug")]
    InvalidId { id: String },
    #[error("event id {id:?} appears more than once")]
    DuplicateId { id: String },
    #[error("event {id:?} has an empty title")]
    EmptyTitle { id: String },
    #[error("event {id:?} ends ({end}) before it starts ({start})")]
    ReversedRange {
        id: String,
        start: DateKey,
        end: DateKey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownCategory(String),
    UnknownSemester(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnknownCategory(value) => write!(f, "unknown category {value:?}"),
            SkipReason::UnknownSemester(value) => write!(f, "unknown semester {value:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub id: String,
    pub reason: SkipReason,
}

/// Outcome of a load that did not fail outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedEvent>,
    /// Events flagged `is_range` without an end date; shown as single days.
    pub range_without_end: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.range_without_end.is_empty()
    }
}

/// Immutable, ordered, in-memory calendar events.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<Event>,
    report: LoadReport,
    source: String,
}

impl EventStore {
    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_toml_str(BUNDLED_CALENDAR, BUNDLED_LABEL)
    }

    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    /// Loads `path` when given, the compiled-in calendar otherwise.
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    pub fn from_toml_str(raw: &str, source_label: &str) -> Result<Self, StoreError> {
        let parsed: RawCalendar = toml::from_str(raw).map_err(|source| StoreError::Parse {
            source_label: source_label.to_string(),
            source,
        })?;
        let (events, report) = validate(parsed.events)?;
        tracing::debug!(
            source = source_label,
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "calendar data loaded"
        );
        Ok(Self {
            events,
            report,
            source: source_label.to_string(),
        })
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        let report = LoadReport {
            loaded: events.len(),
            ..LoadReport::default()
        };
        Self {
            events,
            report,
            source: "<memory>".to_string(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn validate(raw_events: Vec<RawEvent>) -> Result<(Vec<Event>, LoadReport), StoreError> {
    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(raw_events.len());

    for raw in raw_events {
        let id = raw.id.trim().to_string();
        if !EVENT_ID.is_match(&id) {
            return Err(StoreError::InvalidId { id });
        }
        if !seen.insert(id.clone()) {
            return Err(StoreError::DuplicateId { id });
        }
        let title = raw.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle { id });
        }
        if let Some(end) = raw.end {
            if end < raw.start {
                return Err(StoreError::ReversedRange {
                    id,
                    start: raw.start,
                    end,
                });
            }
        }

        let category = match Category::from_str(raw.category.trim()) {
            Ok(category) => category,
            Err(_) => {
                tracing::warn!(%id, category = %raw.category, "skipping event with unknown category");
                report.skipped.push(SkippedEvent {
                    id,
                    reason: SkipReason::UnknownCategory(raw.category),
                });
                continue;
            }
        };
        let semester = match Semester::from_str(raw.semester.trim()) {
            Ok(semester) => semester,
            Err(_) => {
                tracing::warn!(%id, semester = %raw.semester, "skipping event with unknown semester");
                report.skipped.push(SkippedEvent {
                    id,
                    reason: SkipReason::UnknownSemester(raw.semester),
                });
                continue;
            }
        };

        let is_range = raw.is_range.unwrap_or(raw.end.is_some());
        if is_range && raw.end.is_none() {
            tracing::warn!(%id, "event flagged as range has no end date");
            report.range_without_end.push(id.clone());
        }

        let description = raw
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        events.push(Event {
            id,
            title,
            description,
            start: raw.start.date(),
            end: raw.end.map(DateKey::date),
            category,
            semester,
            is_range,
        });
    }

    report.loaded = events.len();
    Ok((events, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use time::macros::date;

    type TestResult<T = ()> = Result<T>;

    #[test]
    fn bundled_calendar_loads_cleanly() -> TestResult {
        let store = EventStore::bundled()?;
        assert!(!store.is_empty());
        assert!(store.report().is_clean(), "{:?}", store.report());
        for event in store.events() {
            assert!(event.end_date() >= event.start, "{}", event.id);
            assert_eq!(event.start.year(), 2026, "{}", event.id);
        }
        Ok(())
    }

    #[test]
    fn dates_are_plain_calendar_days() -> TestResult {
        let raw = r#"
            [[event]]
            id = "examen-final"
            title = "Exámen Final"
            start = "2026-03-15"
            category = "examenes"
            semester = "2026-0"
        "#;
        let store = EventStore::from_toml_str(raw, "inline")?;
        let event = store.get("examen-final").expect("event present");
        assert_eq!(event.start, date!(2026 - 03 - 15));
        assert_eq!(event.end, None);
        assert!(!event.is_range);
        assert_eq!(event.day_count(), 1);
        Ok(())
    }

    #[test]
    fn reversed_range_is_rejected_at_load() {
        let raw = r#"
            [[event]]
            id = "al-reves"
            title = "Rango invertido"
            start = "2026-05-12"
            end = "2026-05-10"
            category = "academico"
            semester = "2026-1"
        "#;
        let err = EventStore::from_toml_str(raw, "inline").unwrap_err();
        assert_matches!(err, StoreError::ReversedRange { ref id, .. } if id == "al-reves");
    }

    #[test]
    fn duplicate_and_malformed_ids_are_rejected() {
        let duplicate = r#"
            [[event]]
            id = "uno"
            title = "A"
            start = "2026-01-01"
            category = "academico"
            semester = "general"

            [[event]]
            id = "uno"
            title = "B"
            start = "2026-01-02"
            category = "academico"
            semester = "general"
        "#;
        assert_matches!(
            EventStore::from_toml_str(duplicate, "inline"),
            Err(StoreError::DuplicateId { .. })
        );

        let malformed = r#"
            [[event]]
            id = "Con Espacios"
            title = "A"
            start = "2026-01-01"
            category = "academico"
            semester = "general"
        "#;
        assert_matches!(
            EventStore::from_toml_str(malformed, "inline"),
            Err(StoreError::InvalidId { .. })
        );
    }

    #[test]
    fn malformed_date_is_a_parse_error() {
        let raw = r#"
            [[event]]
            id = "mala-fecha"
            title = "A"
            start = "2026-13-01"
            category = "academico"
            semester = "general"
        "#;
        assert_matches!(
            EventStore::from_toml_str(raw, "inline"),
            Err(StoreError::Parse { .. })
        );
    }

    #[test]
    fn unknown_ids_are_skipped_and_reported() -> TestResult {
        let raw = r#"
            [[event]]
            id = "bueno"
            title = "Inicio de clases"
            start = "2026-04-06"
            category = "academico"
            semester = "2026-1"

            [[event]]
            id = "categoria-rara"
            title = "Algo"
            start = "2026-04-07"
            category = "deportes"
            semester = "2026-1"

            [[event]]
            id = "semestre-raro"
            title = "Otro"
            start = "2026-04-08"
            category = "academico"
            semester = "2027-1"
        "#;
        let store = EventStore::from_toml_str(raw, "inline")?;
        assert_eq!(store.len(), 1);
        let report = store.report();
        assert_eq!(report.loaded, 1);
        assert_eq!(
            report.skipped,
            vec![
                SkippedEvent {
                    id: "categoria-rara".into(),
                    reason: SkipReason::UnknownCategory("deportes".into()),
                },
                SkippedEvent {
                    id: "semestre-raro".into(),
                    reason: SkipReason::UnknownSemester("2027-1".into()),
                },
            ]
        );
        assert!(!report.is_clean());
        Ok(())
    }

    #[test]
    fn range_flag_defaults_from_end_date() -> TestResult {
        let raw = r#"
            [[event]]
            id = "matricula"
            title = "Matrícula"
            start = "2026-03-23"
            end = "2026-03-27"
            category = "academico"
            semester = "2026-1"

            [[event]]
            id = "marcado-sin-fin"
            title = "Marcado"
            start = "2026-03-23"
            category = "academico"
            semester = "2026-1"
            is_range = true
        "#;
        let store = EventStore::from_toml_str(raw, "inline")?;
        let matricula = store.get("matricula").expect("present");
        assert!(matricula.is_range);
        assert!(matricula.shows_as_range());
        assert_eq!(matricula.day_count(), 5);
        let flagged = store.get("marcado-sin-fin").expect("present");
        assert!(!flagged.shows_as_range());
        assert_eq!(store.report().range_without_end, vec!["marcado-sin-fin"]);
        Ok(())
    }

    #[test]
    fn loads_from_path_and_reports_missing_files() -> TestResult {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "[[event]]\nid = \"feriado\"\ntitle = \"Año Nuevo\"\nstart = \"2026-01-01\"\ncategory = \"feriado-nacional\"\nsemester = \"general\""
        )?;
        let store = EventStore::open(Some(file.path()))?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.source(), file.path().display().to_string());

        let missing = file.path().with_extension("missing");
        assert_matches!(EventStore::from_path(&missing), Err(StoreError::Io { .. }));
        Ok(())
    }
}
