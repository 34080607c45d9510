use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::calendar::MonthIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    DayLeft,
    DayRight,
    Activate,
    ToggleFocus,
    StartSearch,
    ChooseSemester,
    ShowCategories,
    ResetFilters,
    ShowMonthEvents,
    ToggleTimeline,
    Collapse,
    JumpToMonth(MonthIndex),
}

/// Month shortcuts on the number row: `1`..`9` and `0` for January to
/// October, `-` and `=` for November and December.
fn month_shortcut(ch: char) -> Option<MonthIndex> {
    match ch {
        '1'..='9' => MonthIndex::from_number(ch as u8 - b'0'),
        '0' => MonthIndex::from_number(10),
        '-' => MonthIndex::from_number(11),
        '=' => MonthIndex::from_number(12),
        _ => None,
    }
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::ResetFilters),
            _ => None,
        };
    }
    if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER) {
        return None;
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::DayLeft),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::DayRight),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Activate),
        KeyCode::Tab => Some(Action::ToggleFocus),
        KeyCode::Esc => Some(Action::Collapse),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Char('s') => Some(Action::ChooseSemester),
        KeyCode::Char('c') => Some(Action::ShowCategories),
        KeyCode::Char('v') => Some(Action::ShowMonthEvents),
        KeyCode::Char('t') => Some(Action::ToggleTimeline),
        KeyCode::Char(ch) => month_shortcut(ch).map(Action::JumpToMonth),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn number_row_jumps_to_months() {
        let expected = |number| MonthIndex::from_number(number).map(Action::JumpToMonth);
        assert_eq!(action_for_key(press(KeyCode::Char('1'))), expected(1));
        assert_eq!(action_for_key(press(KeyCode::Char('0'))), expected(10));
        assert_eq!(action_for_key(press(KeyCode::Char('='))), expected(12));
        assert_eq!(action_for_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn control_chords_are_separate_from_plain_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(ctrl_c), Some(Action::Quit));
        assert_eq!(
            action_for_key(press(KeyCode::Char('c'))),
            Some(Action::ShowCategories)
        );
        let alt_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::ALT);
        assert_eq!(action_for_key(alt_s), None);
    }
}
