use std::collections::BTreeMap;

use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::calendar::grid::{month_grid, MonthGrid};
use crate::calendar::{events_in_month, events_on_day, month_counts, MonthIndex};
use crate::search::{filter_events, CategorySet, FilterState};
use crate::storage::{Category, Event, Semester};

/// Side effect a transition asks the view to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ScrollTo(MonthIndex),
}

/// Outcome of activating a day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClick {
    Selected(Date),
    Cleared,
    NoEvents(Date),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    pub event_id: Option<String>,
    pub visible: bool,
}

/// Filter and selection state of the calendar page. Every transition is a
/// plain method; rendering reads the result.
#[derive(Debug, Clone, Default)]
pub struct CalendarState {
    filter: FilterState,
    expanded_month: Option<MonthIndex>,
    selected_days: BTreeMap<MonthIndex, Date>,
    detail: DetailState,
    notice: Option<Date>,
}

impl CalendarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn semester(&self) -> Option<Semester> {
        self.filter.semester
    }

    /// Switching period invalidates everything that pointed into the old
    /// event set.
    pub fn choose_semester(&mut self, semester: Semester) {
        tracing::debug!(semester = %semester, "semester chosen");
        self.filter.semester = Some(semester);
        self.expanded_month = None;
        self.selected_days.clear();
        self.detail = DetailState::default();
        self.notice = None;
    }

    pub fn choose_month(&mut self, month: MonthIndex) -> Effect {
        self.expanded_month = Some(month);
        Effect::ScrollTo(month)
    }

    pub fn toggle_month(&mut self, month: MonthIndex) -> Option<Effect> {
        if self.expanded_month == Some(month) {
            self.expanded_month = None;
            None
        } else {
            Some(self.choose_month(month))
        }
    }

    pub fn collapse_month(&mut self) {
        self.expanded_month = None;
    }

    pub fn expanded_month(&self) -> Option<MonthIndex> {
        self.expanded_month
    }

    /// `month_events` are the events rendered in the month the day belongs
    /// to. An empty day raises the notice and leaves the selection alone.
    pub fn click_day(&mut self, date: Date, month_events: &[&Event]) -> DayClick {
        if events_on_day(month_events.iter().copied(), date).is_empty() {
            self.notice = Some(date);
            return DayClick::NoEvents(date);
        }
        let month = MonthIndex::from(date.month());
        if self.selected_days.get(&month) == Some(&date) {
            self.selected_days.remove(&month);
            DayClick::Cleared
        } else {
            self.selected_days.insert(month, date);
            DayClick::Selected(date)
        }
    }

    pub fn selected_day(&self, month: MonthIndex) -> Option<Date> {
        self.selected_days.get(&month).copied()
    }

    pub fn clear_selected_day(&mut self, month: MonthIndex) {
        self.selected_days.remove(&month);
    }

    pub fn selected_days(&self) -> impl Iterator<Item = (MonthIndex, Date)> + '_ {
        self.selected_days.iter().map(|(month, date)| (*month, *date))
    }

    pub fn open_event(&mut self, event_id: &str) {
        self.detail = DetailState {
            event_id: Some(event_id.to_string()),
            visible: true,
        };
    }

    /// Hides the dialog; the id is kept so reopening needs no lookup.
    pub fn close_detail(&mut self) {
        self.detail.visible = false;
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    pub fn notice(&self) -> Option<Date> {
        self.notice
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.filter.toggle_category(category);
    }

    pub fn set_all_categories(&mut self, selected: bool) {
        self.filter.set_all_categories(selected);
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) {
        self.filter.query = query.into();
    }

    pub fn push_query_char(&mut self, ch: char) {
        self.filter.query.push(ch);
    }

    pub fn pop_query_char(&mut self) {
        let cut = self
            .filter
            .query
            .grapheme_indices(true)
            .next_back()
            .map(|(index, _)| index)
            .unwrap_or(0);
        self.filter.query.truncate(cut);
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Months,
    Days,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Months,
    Timeline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    Semesters { cursor: usize },
    Categories { cursor: usize },
    MonthEvents { month: MonthIndex, cursor: usize },
}

/// Everything the terminal UI needs to draw a frame.
#[derive(Debug, Clone)]
pub struct AppState {
    events: Vec<Event>,
    year: i32,
    preview_limit: usize,
    calendar: CalendarState,
    view: ViewMode,
    focus: FocusPane,
    month_cursor: usize,
    day_cursor: u8,
    event_cursor: usize,
    search_active: bool,
    overlay: Option<OverlayState>,
    status_message: Option<String>,
    scroll_target: Option<MonthIndex>,
}

impl AppState {
    pub fn new(events: Vec<Event>, year: i32, preview_limit: usize) -> Self {
        Self {
            events,
            year,
            preview_limit: preview_limit.max(1),
            calendar: CalendarState::new(),
            view: ViewMode::Months,
            focus: FocusPane::Months,
            month_cursor: 0,
            day_cursor: 1,
            event_cursor: 0,
            search_active: false,
            overlay: None,
            status_message: None,
            scroll_target: None,
        }
    }

    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn focus(&self) -> FocusPane {
        self.focus
    }

    pub fn month_cursor(&self) -> usize {
        self.month_cursor
    }

    pub fn day_cursor(&self) -> u8 {
        self.day_cursor
    }

    pub fn event_cursor(&self) -> usize {
        self.event_cursor
    }

    pub fn scroll_target(&self) -> Option<MonthIndex> {
        self.scroll_target
    }

    pub fn filtered(&self) -> Vec<&Event> {
        filter_events(&self.events, self.calendar.filter())
    }

    /// Months with at least one filtered event, and how many.
    pub fn visible_months(&self) -> Vec<(MonthIndex, usize)> {
        let filtered = self.filtered();
        month_counts(filtered.iter().copied(), self.year)
    }

    pub fn month_events(&self, month: MonthIndex) -> Vec<&Event> {
        let filtered = self.filtered();
        events_in_month(filtered.iter().copied(), self.year, month)
    }

    pub fn cursor_month(&self) -> Option<MonthIndex> {
        self.visible_months()
            .get(self.month_cursor)
            .map(|(month, _)| *month)
    }

    pub fn expanded_grid(&self) -> Option<MonthGrid> {
        month_grid(self.year, self.calendar.expanded_month()?)
    }

    /// Events listed in a month card: the selected day's events, otherwise
    /// the first `preview_limit` of the month. The second value is how many
    /// month events were left out.
    pub fn card_events(&self, month: MonthIndex) -> (Vec<&Event>, usize) {
        let month_events = self.month_events(month);
        if let Some(day) = self.calendar.selected_day(month) {
            return (events_on_day(month_events.iter().copied(), day), 0);
        }
        let hidden = month_events.len().saturating_sub(self.preview_limit);
        let shown = month_events.into_iter().take(self.preview_limit).collect();
        (shown, hidden)
    }

    pub fn cursor_event(&self) -> Option<&Event> {
        match self.view {
            ViewMode::Timeline => self.filtered().get(self.event_cursor).copied(),
            ViewMode::Months => {
                let month = self.calendar.expanded_month()?;
                self.card_events(month).0.get(self.event_cursor).copied()
            }
        }
    }

    pub fn detail_event(&self) -> Option<&Event> {
        let detail = self.calendar.detail();
        if !detail.visible {
            return None;
        }
        let id = detail.event_id.as_deref()?;
        self.events.iter().find(|event| event.id == id)
    }

    pub fn header_label(&self) -> String {
        match self.calendar.semester() {
            Some(semester) => format!(
                "Mostrando: {} | {}",
                semester.description(),
                crate::calendar::format::events_count_label(self.filtered().len())
            ),
            None => "Elige un periodo académico".to_string(),
        }
    }

    pub fn choose_semester(&mut self, semester: Semester) {
        self.calendar.choose_semester(semester);
        self.overlay = None;
        self.focus = FocusPane::Months;
        self.month_cursor = 0;
        self.event_cursor = 0;
        self.scroll_target = None;
    }

    /// Month shortcut: expands `month` if it has events and moves there.
    pub fn jump_to_month(&mut self, month: MonthIndex) -> bool {
        let Some(position) = self
            .visible_months()
            .iter()
            .position(|(visible, _)| *visible == month)
        else {
            return false;
        };
        self.month_cursor = position;
        let effect = self.calendar.choose_month(month);
        self.apply_effect(Some(effect));
        self.enter_month(month);
        true
    }

    pub fn toggle_cursor_month(&mut self) {
        let Some(month) = self.cursor_month() else {
            return;
        };
        let effect = self.calendar.toggle_month(month);
        let expanded = effect.is_some();
        self.apply_effect(effect);
        if expanded {
            self.enter_month(month);
        } else {
            self.focus = FocusPane::Months;
        }
    }

    pub fn collapse_expanded(&mut self) {
        self.calendar.collapse_month();
        self.focus = FocusPane::Months;
        self.event_cursor = 0;
    }

    fn enter_month(&mut self, month: MonthIndex) {
        self.day_cursor = self
            .calendar
            .selected_day(month)
            .or_else(|| self.month_events(month).first().map(|event| event.start))
            .filter(|date| MonthIndex::from(date.month()) == month && date.year() == self.year)
            .map(|date| date.day())
            .unwrap_or(1);
        self.event_cursor = 0;
        self.focus = FocusPane::Days;
    }

    fn apply_effect(&mut self, effect: Option<Effect>) {
        if let Some(Effect::ScrollTo(month)) = effect {
            self.scroll_target = Some(month);
        }
    }

    pub fn click_cursor_day(&mut self) -> Option<DayClick> {
        let grid = self.expanded_grid()?;
        let date = grid.date(self.day_cursor)?;
        let filtered = filter_events(&self.events, self.calendar.filter());
        let month_events = events_in_month(filtered.iter().copied(), self.year, grid.month);
        let outcome = self.calendar.click_day(date, &month_events);
        self.event_cursor = 0;
        Some(outcome)
    }

    pub fn open_cursor_event(&mut self) -> bool {
        let Some(id) = self.cursor_event().map(|event| event.id.clone()) else {
            return false;
        };
        self.calendar.open_event(&id);
        true
    }

    pub fn open_event(&mut self, event_id: &str) {
        self.calendar.open_event(event_id);
    }

    pub fn close_detail(&mut self) {
        self.calendar.close_detail();
    }

    pub fn dismiss_notice(&mut self) {
        self.calendar.dismiss_notice();
    }

    pub fn move_selection(&mut self, delta: isize) {
        match (self.view, self.focus) {
            (ViewMode::Timeline, _) => {
                let len = self.filtered().len();
                self.event_cursor = step(self.event_cursor, delta, len);
            }
            (ViewMode::Months, FocusPane::Months) => {
                let len = self.visible_months().len();
                self.month_cursor = step(self.month_cursor, delta, len);
            }
            (ViewMode::Months, FocusPane::Days) => self.move_day(delta * 7),
            (ViewMode::Months, FocusPane::Events) => {
                let len = self
                    .calendar
                    .expanded_month()
                    .map(|month| self.card_events(month).0.len())
                    .unwrap_or(0);
                self.event_cursor = step(self.event_cursor, delta, len);
            }
        }
    }

    /// Moves the day cursor, clamped to the expanded month.
    pub fn move_day(&mut self, delta: isize) {
        let Some(grid) = self.expanded_grid() else {
            return;
        };
        let target = isize::from(self.day_cursor) + delta;
        if (1..=isize::from(grid.days_in_month)).contains(&target) {
            self.day_cursor = u8::try_from(target).unwrap_or(self.day_cursor);
        }
    }

    pub fn cycle_focus(&mut self) {
        if self.view == ViewMode::Timeline {
            return;
        }
        self.focus = match (self.focus, self.calendar.expanded_month()) {
            (_, None) => FocusPane::Months,
            (FocusPane::Months, Some(_)) => FocusPane::Days,
            (FocusPane::Days, Some(_)) => FocusPane::Events,
            (FocusPane::Events, Some(_)) => FocusPane::Months,
        };
        self.event_cursor = 0;
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.view = match self.view {
            ViewMode::Months => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Months,
        };
        self.event_cursor = 0;
        self.view
    }

    pub fn begin_search(&mut self) {
        self.search_active = true;
    }

    pub fn finish_search(&mut self) {
        self.search_active = false;
    }

    pub fn cancel_search(&mut self) {
        self.search_active = false;
        self.calendar.set_query(String::new());
        self.after_filter_change();
    }

    pub fn is_search_active(&self) -> bool {
        self.search_active
    }

    pub fn search_query(&self) -> &str {
        &self.calendar.filter().query
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.calendar.push_query_char(ch);
        self.after_filter_change();
    }

    pub fn pop_search_char(&mut self) {
        self.calendar.pop_query_char();
        self.after_filter_change();
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.calendar.toggle_category(category);
        self.after_filter_change();
    }

    pub fn set_all_categories(&mut self, selected: bool) {
        self.calendar.set_all_categories(selected);
        self.after_filter_change();
    }

    pub fn reset_filters(&mut self) {
        self.calendar.reset_filters();
        self.after_filter_change();
    }

    pub fn categories(&self) -> CategorySet {
        self.calendar.filter().categories
    }

    /// Keeps cursors inside the shrunken result, drops selected days left
    /// without events and collapses a month that no longer has events.
    fn after_filter_change(&mut self) {
        let filtered = filter_events(&self.events, self.calendar.filter());
        let emptied: Vec<MonthIndex> = self
            .calendar
            .selected_days()
            .filter(|(_, day)| events_on_day(filtered.iter().copied(), *day).is_empty())
            .map(|(month, _)| month)
            .collect();
        for month in emptied {
            self.calendar.clear_selected_day(month);
        }

        let months = self.visible_months();
        if let Some(expanded) = self.calendar.expanded_month() {
            if !months.iter().any(|(month, _)| *month == expanded) {
                self.calendar.collapse_month();
                self.focus = FocusPane::Months;
            }
        }
        self.month_cursor = self.month_cursor.min(months.len().saturating_sub(1));
        self.event_cursor = 0;
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn open_semester_picker(&mut self) {
        let cursor = self
            .calendar
            .semester()
            .and_then(|current| Semester::selectable().position(|s| s == current))
            .unwrap_or(0);
        self.overlay = Some(OverlayState::Semesters { cursor });
    }

    pub fn open_category_picker(&mut self) {
        self.overlay = Some(OverlayState::Categories { cursor: 0 });
    }

    /// "Ver todos": every event of the expanded month in a modal.
    pub fn open_month_events(&mut self) -> bool {
        let Some(month) = self.calendar.expanded_month() else {
            return false;
        };
        self.overlay = Some(OverlayState::MonthEvents { month, cursor: 0 });
        true
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay_move(&mut self, delta: isize) {
        let month_len = match &self.overlay {
            Some(OverlayState::MonthEvents { month, .. }) => self.month_events(*month).len(),
            _ => 0,
        };
        match &mut self.overlay {
            Some(OverlayState::Semesters { cursor }) => {
                *cursor = step(*cursor, delta, Semester::selectable().count());
            }
            Some(OverlayState::Categories { cursor }) => {
                *cursor = step(*cursor, delta, Category::all().count());
            }
            Some(OverlayState::MonthEvents { cursor, .. }) => {
                *cursor = step(*cursor, delta, month_len);
            }
            None => {}
        }
    }

    /// Applies the row under the overlay cursor.
    pub fn overlay_select(&mut self) {
        match self.overlay.clone() {
            Some(OverlayState::Semesters { cursor }) => {
                if let Some(semester) = Semester::selectable().nth(cursor) {
                    self.choose_semester(semester);
                    self.set_status_message(Some(format!("Periodo {}", semester.description())));
                }
            }
            Some(OverlayState::Categories { cursor }) => {
                if let Some(category) = Category::all().nth(cursor) {
                    self.toggle_category(category);
                }
            }
            Some(OverlayState::MonthEvents { month, cursor }) => {
                let id = self
                    .month_events(month)
                    .get(cursor)
                    .map(|event| event.id.clone());
                if let Some(id) = id {
                    self.calendar.open_event(&id);
                }
            }
            None => {}
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (current as isize + delta).clamp(0, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::event;
    use assert_matches::assert_matches;
    use time::macros::date;

    fn month(index: u8) -> MonthIndex {
        MonthIndex::new(index).expect("month index")
    }

    fn sample() -> Vec<Event> {
        vec![
            event(
                "matricula-2026-1",
                "Matrícula",
                date!(2026 - 03 - 23),
                Some(date!(2026 - 03 - 27)),
                Category::Academico,
                Semester::Primero2026,
            ),
            event(
                "examen-parcial",
                "Examen parcial",
                date!(2026 - 05 - 11),
                Some(date!(2026 - 05 - 15)),
                Category::Examenes,
                Semester::Primero2026,
            ),
            event(
                "dia-trabajo",
                "Día del Trabajo",
                date!(2026 - 05 - 01),
                None,
                Category::FeriadoNacional,
                Semester::General,
            ),
            event(
                "inicio-2026-2",
                "Inicio de clases",
                date!(2026 - 08 - 17),
                None,
                Category::Academico,
                Semester::Segundo2026,
            ),
        ]
    }

    #[test]
    fn clicking_the_same_day_twice_clears_it() {
        let events = sample();
        let may: Vec<&Event> = events.iter().skip(1).take(2).collect();
        let mut state = CalendarState::new();
        state.choose_semester(Semester::Primero2026);

        let first = state.click_day(date!(2026 - 05 - 12), &may);
        assert_eq!(first, DayClick::Selected(date!(2026 - 05 - 12)));
        assert_eq!(state.selected_day(month(4)), Some(date!(2026 - 05 - 12)));

        let second = state.click_day(date!(2026 - 05 - 12), &may);
        assert_eq!(second, DayClick::Cleared);
        assert_eq!(state.selected_day(month(4)), None);
    }

    #[test]
    fn clicking_another_day_moves_the_selection() {
        let events = sample();
        let may: Vec<&Event> = events.iter().skip(1).take(2).collect();
        let mut state = CalendarState::new();
        state.click_day(date!(2026 - 05 - 12), &may);
        state.click_day(date!(2026 - 05 - 01), &may);
        assert_eq!(state.selected_day(month(4)), Some(date!(2026 - 05 - 01)));
    }

    #[test]
    fn empty_day_raises_notice_without_touching_selection() {
        let events = sample();
        let may: Vec<&Event> = events.iter().skip(1).take(2).collect();
        let mut state = CalendarState::new();
        state.click_day(date!(2026 - 05 - 12), &may);

        let outcome = state.click_day(date!(2026 - 05 - 20), &may);
        assert_matches!(outcome, DayClick::NoEvents(day) if day == date!(2026 - 05 - 20));
        assert_eq!(state.notice(), Some(date!(2026 - 05 - 20)));
        assert_eq!(state.selected_day(month(4)), Some(date!(2026 - 05 - 12)));
        state.dismiss_notice();
        assert!(state.notice().is_none());
    }

    #[test]
    fn selected_days_are_kept_per_month() {
        let events = sample();
        let all: Vec<&Event> = events.iter().collect();
        let mut state = CalendarState::new();
        state.click_day(date!(2026 - 03 - 24), &all);
        state.click_day(date!(2026 - 05 - 13), &all);
        assert_eq!(state.selected_day(month(2)), Some(date!(2026 - 03 - 24)));
        assert_eq!(state.selected_day(month(4)), Some(date!(2026 - 05 - 13)));
        state.clear_selected_day(month(2));
        assert_eq!(state.selected_day(month(2)), None);
    }

    #[test]
    fn changing_semester_resets_month_and_days() {
        let events = sample();
        let may: Vec<&Event> = events.iter().skip(1).take(2).collect();
        let mut state = CalendarState::new();
        state.choose_semester(Semester::Primero2026);
        state.choose_month(month(4));
        state.click_day(date!(2026 - 05 - 12), &may);
        state.open_event("examen-parcial");

        state.choose_semester(Semester::Segundo2026);
        assert_eq!(state.expanded_month(), None);
        assert_eq!(state.selected_day(month(4)), None);
        assert_eq!(state.detail(), &DetailState::default());
        assert_eq!(state.semester(), Some(Semester::Segundo2026));
    }

    #[test]
    fn month_toggle_expands_one_month_at_a_time() {
        let mut state = CalendarState::new();
        assert_eq!(state.toggle_month(month(2)), Some(Effect::ScrollTo(month(2))));
        assert_eq!(state.toggle_month(month(4)), Some(Effect::ScrollTo(month(4))));
        assert_eq!(state.expanded_month(), Some(month(4)));
        assert_eq!(state.toggle_month(month(4)), None);
        assert_eq!(state.expanded_month(), None);
        assert_eq!(state.choose_month(month(7)), Effect::ScrollTo(month(7)));
    }

    #[test]
    fn closing_detail_keeps_the_event_id() {
        let mut state = CalendarState::new();
        state.open_event("dia-trabajo");
        assert!(state.detail().visible);
        state.close_detail();
        assert!(!state.detail().visible);
        assert_eq!(state.detail().event_id.as_deref(), Some("dia-trabajo"));
    }

    #[test]
    fn backspace_removes_whole_graphemes() {
        let mut state = CalendarState::new();
        state.set_query("exa\u{0301}");
        state.pop_query_char();
        assert_eq!(state.filter().query, "ex");
        state.set_query("");
        state.pop_query_char();
        assert_eq!(state.filter().query, "");
    }

    #[test]
    fn app_state_hides_everything_until_a_semester_is_chosen() {
        let mut app = AppState::new(sample(), 2026, 6);
        assert!(app.visible_months().is_empty());
        assert_eq!(app.header_label(), "Elige un periodo académico");

        app.choose_semester(Semester::Primero2026);
        let months: Vec<_> = app
            .visible_months()
            .iter()
            .map(|(month, count)| (month.index(), *count))
            .collect();
        assert_eq!(months, vec![(2, 1), (4, 2)]);
        assert_eq!(app.header_label(), "Mostrando: Primer Semestre | 3 eventos");
    }

    #[test]
    fn jumping_to_a_month_expands_it_and_targets_scroll() {
        let mut app = AppState::new(sample(), 2026, 6);
        app.choose_semester(Semester::Primero2026);
        assert!(!app.jump_to_month(month(0)));
        assert!(app.jump_to_month(month(4)));
        assert_eq!(app.calendar().expanded_month(), Some(month(4)));
        assert_eq!(app.scroll_target(), Some(month(4)));
        assert_eq!(app.focus(), FocusPane::Days);
        assert_eq!(app.month_cursor(), 1);
        assert_eq!(app.day_cursor(), 1);

        app.move_day(10);
        assert_eq!(
            app.click_cursor_day(),
            Some(DayClick::Selected(date!(2026 - 05 - 11)))
        );
        let (card, hidden) = app.card_events(month(4));
        assert_eq!(card.len(), 1);
        assert_eq!(hidden, 0);
    }

    #[test]
    fn month_card_preview_respects_limit() {
        let mut app = AppState::new(sample(), 2026, 1);
        app.choose_semester(Semester::Primero2026);
        let (card, hidden) = app.card_events(month(4));
        assert_eq!(card.len(), 1);
        assert_eq!(hidden, 1);
        app.jump_to_month(month(4));
        assert!(app.open_month_events());
        assert_matches!(app.overlay(), Some(OverlayState::MonthEvents { .. }));
        app.overlay_move(1);
        app.overlay_select();
        assert_eq!(app.detail_event().map(|e| e.id.as_str()), Some("examen-parcial"));
    }

    #[test]
    fn filter_changes_collapse_months_that_empty_out() {
        let mut app = AppState::new(sample(), 2026, 6);
        app.choose_semester(Semester::Primero2026);
        app.jump_to_month(month(2));
        app.toggle_category(Category::Academico);
        assert_eq!(app.calendar().expanded_month(), None);
        assert_eq!(app.focus(), FocusPane::Months);

        app.set_all_categories(false);
        assert!(app.filtered().is_empty());
        app.reset_filters();
        assert_eq!(app.filtered().len(), 3);
    }

    #[test]
    fn filter_changes_drop_selected_days_left_empty() {
        let mut app = AppState::new(sample(), 2026, 6);
        app.choose_semester(Semester::Primero2026);
        app.jump_to_month(month(4));
        app.move_day(10);
        assert_eq!(
            app.click_cursor_day(),
            Some(DayClick::Selected(date!(2026 - 05 - 11)))
        );

        app.toggle_category(Category::Examenes);
        assert_eq!(app.calendar().expanded_month(), Some(month(4)));
        assert_eq!(app.calendar().selected_day(month(4)), None);
        let (card, hidden) = app.card_events(month(4));
        assert_eq!(
            card.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["dia-trabajo"]
        );
        assert_eq!(hidden, 0);
    }

    #[test]
    fn semester_picker_selects_and_closes() {
        let mut app = AppState::new(sample(), 2026, 6);
        app.open_semester_picker();
        app.overlay_move(2);
        app.overlay_select();
        assert_eq!(app.calendar().semester(), Some(Semester::Segundo2026));
        assert!(app.overlay().is_none());
        assert_eq!(app.filtered().len(), 2);
    }
}
