use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::calendar::format::long_date;
use crate::config::{AppConfig, Palette, Theme};
use crate::storage::EventStore;
use crate::ui;

mod actions;
pub mod state;

use self::actions::{action_for_key, Action};
pub use state::{AppState, CalendarState, DayClick, Effect, FocusPane, OverlayState, ViewMode};

pub struct App {
    pub config: Arc<AppConfig>,
    state: AppState,
    theme: Theme,
    palette: Palette,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: &EventStore) -> Self {
        let mut state = AppState::new(
            store.events().to_vec(),
            config.year,
            config.month_preview_limit,
        );
        match config.default_semester {
            Some(semester) => state.choose_semester(semester),
            None => state.set_status_message(Some("Pulsa 's' para elegir un periodo")),
        }
        if let Some(message) = load_report_message(store) {
            state.set_status_message(Some(message));
        }
        Self {
            theme: config.theme(),
            palette: config.palette(),
            config,
            state,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        if let Err(err) = &result {
            tracing::error!(error = %err, "event loop stopped");
        }
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state, &self.theme, &self.palette))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                if let Event::Key(key) = event::read().context("reading terminal event")? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_modal_key(key) {
            return;
        }

        if self.handle_overlay_key(key) {
            return;
        }

        if self.state.is_search_active() {
            match key.code {
                KeyCode::Esc => {
                    self.state.cancel_search();
                    return;
                }
                KeyCode::Enter => {
                    self.state.finish_search();
                    return;
                }
                KeyCode::Backspace => {
                    self.state.pop_search_char();
                    return;
                }
                KeyCode::Char(ch)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    self.state.push_search_char(ch);
                    return;
                }
                _ => {}
            }
        }

        if let Some(action) = action_for_key(key) {
            self.handle_action(action);
        }
    }

    /// Detail and notice dialogs sit above every other overlay.
    fn handle_modal_key(&mut self, key: KeyEvent) -> bool {
        if self.state.detail_event().is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.state.close_detail();
            }
            return true;
        }
        if self.state.calendar().notice().is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.state.dismiss_notice();
            }
            return true;
        }
        false
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        let Some(overlay) = self.state.overlay().cloned() else {
            return false;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state.close_overlay(),
            KeyCode::Char('j') | KeyCode::Down => self.state.overlay_move(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.overlay_move(-1),
            KeyCode::Enter | KeyCode::Char(' ') => self.state.overlay_select(),
            KeyCode::Char('a') if matches!(overlay, OverlayState::Categories { .. }) => {
                self.state.set_all_categories(true);
            }
            KeyCode::Char('n') if matches!(overlay, OverlayState::Categories { .. }) => {
                self.state.set_all_categories(false);
            }
            KeyCode::Char('r') if matches!(overlay, OverlayState::Categories { .. }) => {
                self.state.reset_filters();
            }
            _ => {}
        }
        true
    }

    fn handle_action(&mut self, action: Action) {
        self.state.clear_status_message();
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext => self.state.move_selection(1),
            Action::SelectPrevious => self.state.move_selection(-1),
            Action::DayLeft => self.handle_horizontal(-1),
            Action::DayRight => self.handle_horizontal(1),
            Action::Activate => self.handle_activate(),
            Action::ToggleFocus => self.state.cycle_focus(),
            Action::StartSearch => self.state.begin_search(),
            Action::ChooseSemester => self.state.open_semester_picker(),
            Action::ShowCategories => self.state.open_category_picker(),
            Action::ResetFilters => {
                self.state.reset_filters();
                self.state.set_status_message(Some("Filtros restablecidos"));
            }
            Action::ShowMonthEvents => {
                if !self.state.open_month_events() {
                    self.state
                        .set_status_message(Some("Abre un mes para ver todos sus eventos"));
                }
            }
            Action::ToggleTimeline => {
                let view = self.state.toggle_view();
                tracing::debug!(?view, "view switched");
            }
            Action::Collapse => self.state.collapse_expanded(),
            Action::JumpToMonth(month) => {
                if self.state.calendar().semester().is_none() {
                    self.state
                        .set_status_message(Some("Primero elige un periodo con 's'"));
                } else if !self.state.jump_to_month(month) {
                    self.state
                        .set_status_message(Some(format!("{} no tiene eventos", month.name())));
                }
            }
        }
    }

    fn handle_horizontal(&mut self, delta: isize) {
        if self.state.view() == ViewMode::Months && self.state.focus() == FocusPane::Days {
            self.state.move_day(delta);
        }
    }

    fn handle_activate(&mut self) {
        if self.state.calendar().semester().is_none() {
            self.state.open_semester_picker();
            return;
        }
        if self.state.view() == ViewMode::Timeline {
            self.state.open_cursor_event();
            return;
        }
        match self.state.focus() {
            FocusPane::Months => self.state.toggle_cursor_month(),
            FocusPane::Days => match self.state.click_cursor_day() {
                Some(DayClick::Selected(date)) => {
                    self.state
                        .set_status_message(Some(format!("Eventos del {}", long_date(date))));
                }
                Some(DayClick::Cleared) => {
                    self.state.set_status_message(Some("Selección de día quitada"));
                }
                Some(DayClick::NoEvents(date)) => {
                    tracing::debug!(%date, "day without events");
                }
                None => {}
            },
            FocusPane::Events => {
                self.state.open_cursor_event();
            }
        }
    }
}

fn load_report_message(store: &EventStore) -> Option<String> {
    let report = store.report();
    let mut problems = Vec::new();
    if !report.skipped.is_empty() {
        problems.push(format!("{} evento(s) omitidos", report.skipped.len()));
    }
    if !report.range_without_end.is_empty() {
        problems.push(format!(
            "{} rango(s) sin fecha de fin",
            report.range_without_end.len()
        ));
    }
    if problems.is_empty() {
        return None;
    }
    Some(format!(
        "{} al cargar; ejecuta `calendario check`",
        problems.join(", ")
    ))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::event;
    use crate::storage::{Category, Semester};
    use time::macros::date;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_semester() -> App {
        let store = EventStore::from_events(vec![
            event(
                "feriado-trabajo",
                "Día del Trabajo",
                date!(2026 - 05 - 01),
                None,
                Category::FeriadoNacional,
                Semester::General,
            ),
            event(
                "parciales",
                "Exámenes parciales",
                date!(2026 - 05 - 11),
                Some(date!(2026 - 05 - 15)),
                Category::Examenes,
                Semester::Primero2026,
            ),
        ]);
        let config = AppConfig {
            default_semester: Some(Semester::Primero2026),
            ..AppConfig::default()
        };
        App::new(Arc::new(config), &store)
    }

    #[test]
    fn range_flag_without_end_is_reported_as_such() -> anyhow::Result<()> {
        let store = EventStore::from_toml_str(
            r#"
[[event]]
id = "marcado-sin-fin"
title = "Semana de bienvenida"
start = "2026-04-06"
category = "bienestar"
semester = "2026-1"
is_range = true
"#,
            "inline",
        )?;
        let app = App::new(Arc::new(AppConfig::default()), &store);
        assert_eq!(
            app.state().status_message(),
            Some("1 rango(s) sin fecha de fin al cargar; ejecuta `calendario check`")
        );
        Ok(())
    }

    #[test]
    fn default_semester_is_applied_at_startup() {
        let app = app_with_semester();
        assert_eq!(app.state().calendar().semester(), Some(Semester::Primero2026));
        assert_eq!(app.state().visible_months().len(), 1);
    }

    #[test]
    fn empty_day_notice_swallows_keys_until_dismissed() {
        let mut app = app_with_semester();
        app.handle_key(press(KeyCode::Char('5')));
        assert_eq!(app.state().day_cursor(), 1);
        app.handle_key(press(KeyCode::Char('l')));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.state().calendar().notice(), Some(date!(2026 - 05 - 02)));

        app.handle_key(press(KeyCode::Char('j')));
        assert_eq!(app.state().day_cursor(), 2);
        app.handle_key(press(KeyCode::Esc));
        assert!(app.state().calendar().notice().is_none());
    }

    #[test]
    fn search_typing_filters_and_escape_clears() {
        let mut app = app_with_semester();
        app.handle_key(press(KeyCode::Char('/')));
        for ch in "examen".chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
        assert_eq!(app.state().search_query(), "examen");
        assert_eq!(app.state().filtered().len(), 1);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.state().search_query(), "");
        assert_eq!(app.state().filtered().len(), 2);
    }

    #[test]
    fn opening_and_closing_event_detail() {
        let mut app = app_with_semester();
        app.handle_key(press(KeyCode::Char('5')));
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.state().focus(), FocusPane::Events);
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(
            app.state().detail_event().map(|e| e.id.as_str()),
            Some("feriado-trabajo")
        );
        app.handle_key(press(KeyCode::Esc));
        assert!(app.state().detail_event().is_none());
        assert_eq!(
            app.state().calendar().detail().event_id.as_deref(),
            Some("feriado-trabajo")
        );
    }
}
