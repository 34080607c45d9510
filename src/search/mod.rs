use bitflags::bitflags;
use indexmap::IndexMap;

use crate::storage::{Category, Event, Semester};

pub mod normalize;

pub use normalize::{normalize, FoldedText};

bitflags! {
    /// Active category toggles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CategorySet: u16 {
        const NIVELACION = 1 << 0;
        const ADMISION = 1 << 1;
        const BIENESTAR = 1 << 2;
        const BIBLIOTECA = 1 << 3;
        const PROYECCION = 1 << 4;
        const ACADEMICO = 1 << 5;
        const EXAMENES = 1 << 6;
        const NO_LECTIVO = 1 << 7;
        const FERIADO_NACIONAL = 1 << 8;
        const FERIADO_REGIONAL = 1 << 9;
    }
}

impl Category {
    pub fn flag(&self) -> CategorySet {
        match self {
            Category::Nivelacion => CategorySet::NIVELACION,
            Category::Admision => CategorySet::ADMISION,
            Category::Bienestar => CategorySet::BIENESTAR,
            Category::Biblioteca => CategorySet::BIBLIOTECA,
            Category::Proyeccion => CategorySet::PROYECCION,
            Category::Academico => CategorySet::ACADEMICO,
            Category::Examenes => CategorySet::EXAMENES,
            Category::NoLectivo => CategorySet::NO_LECTIVO,
            Category::FeriadoNacional => CategorySet::FERIADO_NACIONAL,
            Category::FeriadoRegional => CategorySet::FERIADO_REGIONAL,
        }
    }
}

impl CategorySet {
    pub fn has(&self, category: Category) -> bool {
        self.contains(category.flag())
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::all().filter(move |category| self.has(*category))
    }

    pub fn count(&self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        iter.into_iter()
            .fold(CategorySet::empty(), |set, category| set | category.flag())
    }
}

/// User-controlled filters. No semester selected means nothing is shown
/// until one is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub semester: Option<Semester>,
    pub categories: CategorySet,
    pub query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            semester: None,
            categories: CategorySet::all(),
            query: String::new(),
        }
    }
}

impl FilterState {
    pub fn for_semester(semester: Semester) -> Self {
        Self {
            semester: Some(semester),
            ..Self::default()
        }
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.categories.toggle(category.flag());
    }

    pub fn set_all_categories(&mut self, selected: bool) {
        self.categories = if selected {
            CategorySet::all()
        } else {
            CategorySet::empty()
        };
    }

    pub fn all_categories_selected(&self) -> bool {
        self.categories.is_all()
    }

    pub fn no_categories_selected(&self) -> bool {
        self.categories.is_empty()
    }

    /// Normalized query, `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(normalize(trimmed))
        }
    }

    /// Restores every category and clears the query. The semester stays.
    pub fn reset(&mut self) {
        *self = Self {
            semester: self.semester,
            ..Self::default()
        };
    }
}

/// Applies semester, category and text filters, then orders by start date.
/// The sort is stable, so same-day events keep store order.
pub fn filter_events<'a>(events: &'a [Event], filter: &FilterState) -> Vec<&'a Event> {
    let Some(semester) = filter.semester else {
        return Vec::new();
    };
    if filter.no_categories_selected() {
        return Vec::new();
    }
    let query = filter.normalized_query();

    let mut matched: Vec<&Event> = events
        .iter()
        .filter(|event| event.semester.visible_under(semester))
        .filter(|event| filter.categories.has(event.category))
        .filter(|event| match &query {
            Some(query) => matches_query(event, query),
            None => true,
        })
        .collect();
    matched.sort_by_key(|event| event.start);
    matched
}

/// `query` must already be normalized.
pub fn matches_query(event: &Event, query: &str) -> bool {
    normalize(&event.title).contains(query)
        || normalize(event.description_or_empty()).contains(query)
}

/// Buckets events per category, every category present in declaration order.
pub fn group_by_category<'a, I>(events: I) -> IndexMap<Category, Vec<&'a Event>>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut grouped: IndexMap<Category, Vec<&'a Event>> =
        Category::all().map(|category| (category, Vec::new())).collect();
    for event in events {
        grouped.entry(event.category).or_default().push(event);
    }
    grouped
}
