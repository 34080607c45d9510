use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::calendar::DateKey;

/// Closed set of event classifications. Declaration order is display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Nivelacion,
    Admision,
    Bienestar,
    Biblioteca,
    Proyeccion,
    Academico,
    Examenes,
    NoLectivo,
    FeriadoNacional,
    FeriadoRegional,
}

impl Category {
    pub fn id(&self) -> &'static str {
        (*self).into()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Nivelacion => "Nivelación",
            Category::Admision => "Admisión",
            Category::Bienestar => "Bienestar Universitario",
            Category::Biblioteca => "Biblioteca",
            Category::Proyeccion => "Proyección Social",
            Category::Academico => "Académico",
            Category::Examenes => "Exámenes",
            Category::NoLectivo => "No lectivo",
            Category::FeriadoNacional => "Feriado nacional",
            Category::FeriadoRegional => "Feriado regional",
        }
    }

    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }
}

/// Academic terms. `General` is a wildcard tag rather than a window: events
/// carrying it show up under every semester filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Semester {
    #[serde(rename = "2026-0")]
    #[strum(serialize = "2026-0")]
    Nivelacion2026,
    #[serde(rename = "2026-1")]
    #[strum(serialize = "2026-1")]
    Primero2026,
    #[serde(rename = "2026-2")]
    #[strum(serialize = "2026-2")]
    Segundo2026,
    #[serde(rename = "general")]
    #[strum(serialize = "general")]
    General,
}

impl Semester {
    pub fn id(&self) -> &'static str {
        (*self).into()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Semester::Nivelacion2026 => "2026-0",
            Semester::Primero2026 => "2026-1",
            Semester::Segundo2026 => "2026-2",
            Semester::General => "General",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Semester::Nivelacion2026 => "Nivelación",
            Semester::Primero2026 => "Primer Semestre",
            Semester::Segundo2026 => "Segundo Semestre",
            Semester::General => "Todo el año",
        }
    }

    /// Semesters a user can pick; the wildcard is excluded.
    pub fn selectable() -> impl Iterator<Item = Semester> {
        Semester::iter().filter(|semester| !semester.is_wildcard())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Semester::General)
    }

    /// True when an event tagged `self` is visible while `selected` is chosen.
    pub fn visible_under(&self, selected: Semester) -> bool {
        *self == selected || self.is_wildcard()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCalendar {
    #[serde(default, rename = "event")]
    pub events: Vec<RawEvent>,
}

/// One `[[event]]` table as authored. Category and semester stay strings so
/// unknown ids can be reported instead of failing the whole file.
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct RawEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub start: DateKey,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub end: Option<DateKey>,
    pub category: String,
    pub semester: String,
    #[serde(default)]
    pub is_range: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_ids_round_trip_through_strum() {
        for category in Category::all() {
            let parsed = Category::from_str(category.id()).expect("known id");
            assert_eq!(parsed, category);
            assert_eq!(category.to_string(), category.id());
        }
    }

    #[test]
    fn semester_ids_parse_and_wildcard_is_not_selectable() {
        assert_eq!(Semester::Nivelacion2026.id(), "2026-0");
        assert_eq!(Semester::General.id(), "general");
        assert_eq!(Category::NoLectivo.id(), "no-lectivo");
        assert_eq!(Semester::from_str("2026-1").ok(), Some(Semester::Primero2026));
        assert_eq!(Semester::from_str("general").ok(), Some(Semester::General));
        assert!(Semester::from_str("2027-1").is_err());
        let selectable: Vec<_> = Semester::selectable().collect();
        assert_eq!(selectable.len(), 3);
        assert!(!selectable.contains(&Semester::General));
    }

    #[test]
    fn general_is_visible_under_every_semester() {
        for selected in Semester::selectable() {
            assert!(Semester::General.visible_under(selected));
        }
        assert!(!Semester::Primero2026.visible_under(Semester::Segundo2026));
    }
}
