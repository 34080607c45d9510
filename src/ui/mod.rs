use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::state::{AppState, FocusPane, OverlayState, ViewMode};
use crate::calendar::format::{
    event_dates_label, event_duration_label, events_count_label, long_date,
};
use crate::calendar::grid::{MonthGrid, WEEKDAY_HEADERS};
use crate::calendar::timeline::{build_timeline, Timeline};
use crate::calendar::{events_by_day, DateKey, MonthIndex};
use crate::config::{Palette, Theme};
use crate::highlight::split_matches;
use crate::storage::{Category, Event, Semester};

const CELL_WIDTH: usize = 5;
const TIMELINE_LABEL_WIDTH: u16 = 22;

pub fn draw_app(frame: &mut Frame, state: &AppState, theme: &Theme, palette: &Palette) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.size());

    render_header(frame, vertical[0], state, theme);
    render_filter_bar(frame, vertical[1], state, theme, palette);

    if let Some(message) = empty_state_message(state) {
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                message,
                Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
            )),
        ]))
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)));
        frame.render_widget(paragraph, vertical[2]);
    } else {
        match state.view() {
            ViewMode::Months => render_months_view(frame, vertical[2], state, theme, palette),
            ViewMode::Timeline => render_timeline_view(frame, vertical[2], state, theme, palette),
        }
    }

    let status = Paragraph::new(build_status_line(state, theme))
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(theme.border)));
    frame.render_widget(status, vertical[3]);

    render_overlay(frame, state, theme, palette);
}

fn empty_state_message(state: &AppState) -> Option<&'static str> {
    let filter = state.calendar().filter();
    if filter.semester.is_none() {
        return Some("Selecciona un periodo académico para ver los eventos (s)");
    }
    if filter.no_categories_selected() {
        return Some("No hay categorías seleccionadas (c para elegir)");
    }
    if state.filtered().is_empty() {
        return Some("No se encontraron eventos con los filtros actuales");
    }
    None
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mut tabs = vec![Span::styled(
        format!("Calendario Académico UNAMAD {}  ", state.year()),
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )];
    for semester in Semester::selectable() {
        let selected = state.calendar().semester() == Some(semester);
        let style = if selected {
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        tabs.push(Span::styled(format!(" {} ", semester.name()), style));
        tabs.push(Span::raw(" "));
    }
    let info = Line::from(Span::styled(
        state.header_label(),
        Style::default().fg(theme.text),
    ));
    let paragraph = Paragraph::new(vec![Line::from(tabs), info]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(paragraph, area);
}

fn render_filter_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    theme: &Theme,
    palette: &Palette,
) {
    let mut search = state.search_query().to_string();
    if state.is_search_active() {
        search.push('▌');
    }
    let search_style = if state.is_search_active() {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    let categories = state.categories();
    let total = Category::all().count();
    let first = Line::from(vec![
        Span::styled("Buscar: ", Style::default().fg(theme.muted)),
        Span::styled(search, search_style),
        Span::raw("   "),
        Span::styled("Categorías: ", Style::default().fg(theme.muted)),
        Span::styled(
            format!("{}/{}", categories.count(), total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut shortcuts = vec![Span::styled("Meses: ", Style::default().fg(theme.muted))];
    for (month, _) in state.visible_months() {
        let mut style = Style::default().fg(palette.month(month));
        if state.calendar().expanded_month() == Some(month) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        shortcuts.push(Span::styled(month.short_name(), style));
        shortcuts.push(Span::raw(" "));
    }
    let paragraph = Paragraph::new(vec![first, Line::from(shortcuts)]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(paragraph, area);
}

fn render_months_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    theme: &Theme,
    palette: &Palette,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(40)])
        .split(area);

    let months = state.visible_months();
    let items: Vec<ListItem> = months
        .iter()
        .map(|(month, count)| {
            let marker = if state.calendar().expanded_month() == Some(*month) {
                "▾ "
            } else {
                "▸ "
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{:<11}", month.name()),
                    Style::default()
                        .fg(palette.month(*month))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{count:>3}"), Style::default().fg(theme.muted)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    if let Some(target) = state.scroll_target() {
        if let Some(position) = months.iter().position(|(month, _)| *month == target) {
            list_state = list_state.with_offset(position);
        }
    }
    list_state.select(Some(state.month_cursor()));

    let list = List::new(items)
        .block(
            Block::default()
                .title("Meses")
                .borders(Borders::ALL)
                .border_style(focus_style(state, FocusPane::Months, theme)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection_bg),
        );
    frame.render_stateful_widget(list, columns[0], &mut list_state);

    match state.calendar().expanded_month() {
        Some(month) => render_month_card(frame, columns[1], state, month, theme, palette),
        None => {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Enter abre el mes seleccionado; 1-9, 0, -, = saltan a un mes",
                Style::default().fg(theme.muted),
            )))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border)),
            );
            frame.render_widget(hint, columns[1]);
        }
    }
}

fn focus_style(state: &AppState, pane: FocusPane, theme: &Theme) -> Style {
    if state.focus() == pane {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.border)
    }
}

fn render_month_card(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    month: MonthIndex,
    theme: &Theme,
    palette: &Palette,
) {
    let Some(grid) = state.expanded_grid() else {
        return;
    };
    let grid_height = u16::try_from(grid.weeks().len()).unwrap_or(6) + 3;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(grid_height), Constraint::Min(3)])
        .split(area);

    let month_events = state.month_events(month);
    let grid_lines = mini_grid_lines(state, &grid, &month_events, theme, palette);
    let grid_block = Block::default()
        .title(Span::styled(
            format!("{} {}", month.name(), state.year()),
            Style::default()
                .fg(palette.month(month))
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(focus_style(state, FocusPane::Days, theme));
    frame.render_widget(Paragraph::new(grid_lines).block(grid_block), rows[0]);

    let (card_events, hidden) = state.card_events(month);
    let query = state.search_query();
    let mut items: Vec<ListItem> = card_events
        .iter()
        .map(|event| event_item(event, query, theme, palette))
        .collect();
    if hidden > 0 {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("… y {hidden} más (v: ver todos)"),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        ))));
    }
    let title = match state.calendar().selected_day(month) {
        Some(day) => format!("Eventos del {}", long_date(day)),
        None => format!("Eventos · {}", events_count_label(month_events.len())),
    };
    let mut list_state = ListState::default();
    if state.focus() == FocusPane::Events && !card_events.is_empty() {
        list_state.select(Some(state.event_cursor()));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(focus_style(state, FocusPane::Events, theme)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, rows[1], &mut list_state);
}

fn mini_grid_lines(
    state: &AppState,
    grid: &MonthGrid,
    month_events: &[&Event],
    theme: &Theme,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let by_day = events_by_day(month_events.iter().copied());
    let selected = state.calendar().selected_day(grid.month);
    let cursor_active = state.focus() == FocusPane::Days;

    let mut lines = Vec::with_capacity(grid.weeks().len() + 1);
    lines.push(Line::from(
        WEEKDAY_HEADERS
            .iter()
            .map(|name| {
                Span::styled(
                    pad_to(name, CELL_WIDTH),
                    Style::default().fg(theme.muted),
                )
            })
            .collect::<Vec<_>>(),
    ));

    for week in grid.weeks() {
        let mut spans = Vec::with_capacity(7);
        for cell in week {
            let Some(day) = cell else {
                spans.push(Span::raw(" ".repeat(CELL_WIDTH)));
                continue;
            };
            let date = grid.date(day);
            let day_events = date
                .and_then(|date| by_day.get(&DateKey::from(date)))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let mut style = match day_events.first() {
                Some(first) => Style::default()
                    .fg(Color::Black)
                    .bg(palette.category(first.category)),
                None => Style::default().fg(theme.text),
            };
            if date.is_some() && date == selected {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            if cursor_active && day == state.day_cursor() {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            }
            let label = format!("{:>3}{}", day, count_badge(day_events.len()));
            spans.push(Span::styled(pad_to(&label, CELL_WIDTH - 1), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn count_badge(count: usize) -> &'static str {
    const BADGES: [&str; 8] = ["²", "³", "⁴", "⁵", "⁶", "⁷", "⁸", "⁹"];
    match count {
        0 | 1 => "",
        2..=9 => BADGES[count - 2],
        _ => "⁺",
    }
}

fn event_item<'a>(event: &'a Event, query: &str, theme: &Theme, palette: &Palette) -> ListItem<'a> {
    let colour = palette.category(event.category);
    let mut title = vec![Span::styled("● ", Style::default().fg(colour))];
    title.extend(highlighted(&event.title, query, theme, Style::default().add_modifier(Modifier::BOLD)));
    let meta = Line::from(vec![
        Span::raw("  "),
        Span::styled(event_dates_label(event), Style::default().fg(theme.muted)),
        Span::raw(" · "),
        Span::styled(event.category.name(), Style::default().fg(colour)),
    ]);
    ListItem::new(vec![Line::from(title), meta])
}

fn highlighted<'a>(text: &'a str, query: &str, theme: &Theme, base: Style) -> Vec<Span<'a>> {
    let highlight = base.fg(theme.highlight).add_modifier(Modifier::BOLD);
    split_matches(text, query)
        .into_iter()
        .map(|(segment, matched)| Span::styled(segment, if matched { highlight } else { base }))
        .collect()
}

fn render_timeline_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    theme: &Theme,
    palette: &Palette,
) {
    let filtered = state.filtered();
    let Some(timeline) = build_timeline(&filtered) else {
        return;
    };
    let chart_height = u16::try_from(timeline.rows.len()).unwrap_or(u16::MAX).saturating_add(3);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(chart_height), Constraint::Min(3)])
        .split(area);

    let bar_width = rows[0].width.saturating_sub(TIMELINE_LABEL_WIDTH + 2);
    let chart = timeline_lines(&timeline, bar_width, theme, palette);
    frame.render_widget(
        Paragraph::new(chart).block(
            Block::default()
                .title("Línea de tiempo")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        ),
        rows[0],
    );

    let query = state.search_query();
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|event| event_item(event, query, theme, palette))
        .collect();
    let mut list_state = ListState::default();
    if !filtered.is_empty() {
        list_state.select(Some(state.event_cursor()));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Eventos · {}", events_count_label(filtered.len())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, rows[1], &mut list_state);
}

fn timeline_lines(
    timeline: &Timeline<'_>,
    width: u16,
    theme: &Theme,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let columns = usize::from(width);
    let label_width = usize::from(TIMELINE_LABEL_WIDTH);
    let mut lines = Vec::with_capacity(timeline.rows.len() + 1);

    let mut header: Vec<char> = vec![' '; columns];
    for marker in &timeline.months {
        let start = usize::from(timeline.column(marker.offset, width));
        for (index, ch) in marker.month.short_name().chars().enumerate() {
            if let Some(slot) = header.get_mut(start + index) {
                *slot = ch;
            }
        }
    }
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(label_width)),
        Span::styled(header.into_iter().collect::<String>(), Style::default().fg(theme.muted)),
    ]));

    for row in &timeline.rows {
        let colour = palette.category(row.category);
        let mut cells = vec![false; columns];
        for bar in &row.bars {
            let from = usize::from(timeline.column(bar.offset, width));
            let to = usize::from(timeline.column(bar.offset + bar.length - 1, width));
            for cell in cells.iter_mut().take(to + 1).skip(from) {
                *cell = true;
            }
        }
        let mut spans = vec![Span::styled(
            pad_to(&truncate(row.category.name(), label_width - 1), label_width),
            Style::default().fg(colour),
        )];
        spans.extend(cells.into_iter().map(|filled| {
            if filled {
                Span::styled("█", Style::default().fg(colour))
            } else {
                Span::styled("·", Style::default().fg(theme.border))
            }
        }));
        lines.push(Line::from(spans));
    }
    lines
}

fn build_status_line(state: &AppState, theme: &Theme) -> Text<'static> {
    let hints = if state.is_search_active() {
        "Escribe para buscar • Enter fijar • Esc limpiar"
    } else {
        "s periodo • c categorías • / buscar • Tab foco • Enter abrir • v ver todos • t línea de tiempo • Ctrl-r restablecer • q salir"
    };
    let mut lines = Vec::with_capacity(2);
    if let Some(message) = state.status_message() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.accent),
        )));
    }
    lines.push(Line::from(Span::styled(hints, Style::default().fg(theme.muted))));
    Text::from(lines)
}

fn render_overlay(frame: &mut Frame, state: &AppState, theme: &Theme, palette: &Palette) {
    match state.overlay() {
        Some(OverlayState::Semesters { cursor }) => {
            let area = centered_rect(50, 40, frame.size());
            frame.render_widget(Clear, area);
            let items: Vec<ListItem> = Semester::selectable()
                .map(|semester| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{:<8}", semester.name()),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(semester.description()),
                    ]))
                })
                .collect();
            let mut list_state = ListState::default().with_selected(Some(*cursor));
            let list = List::new(items)
                .block(overlay_block("Periodo académico", theme))
                .highlight_style(
                    Style::default()
                        .fg(theme.selection_fg)
                        .bg(theme.selection_bg),
                );
            frame.render_stateful_widget(list, area, &mut list_state);
        }
        Some(OverlayState::Categories { cursor }) => {
            let area = centered_rect(50, 60, frame.size());
            frame.render_widget(Clear, area);
            let active = state.categories();
            let mut items: Vec<ListItem> = Category::all()
                .map(|category| {
                    let check = if active.has(category) { "[x] " } else { "[ ] " };
                    ListItem::new(Line::from(vec![
                        Span::raw(check),
                        Span::styled("■ ", Style::default().fg(palette.category(category))),
                        Span::raw(category.name()),
                    ]))
                })
                .collect();
            items.push(ListItem::new(Line::from(Span::styled(
                "Enter alterna • a todas • n ninguna • r restablecer • Esc cerrar",
                Style::default().fg(theme.muted),
            ))));
            let mut list_state = ListState::default().with_selected(Some(*cursor));
            let list = List::new(items)
                .block(overlay_block("Categorías", theme))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
        Some(OverlayState::MonthEvents { month, cursor }) => {
            let area = centered_rect(70, 70, frame.size());
            frame.render_widget(Clear, area);
            let events = state.month_events(*month);
            let query = state.search_query();
            let items: Vec<ListItem> = events
                .iter()
                .map(|event| event_item(event, query, theme, palette))
                .collect();
            let mut list_state = ListState::default();
            if !events.is_empty() {
                list_state.select(Some(*cursor));
            }
            let title = format!(
                "{} {} · {}",
                month.name(),
                state.year(),
                events_count_label(events.len())
            );
            let list = List::new(items)
                .block(overlay_block(&title, theme))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
        None => {}
    }

    if let Some(date) = state.calendar().notice() {
        let area = centered_rect(50, 25, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "Sin eventos",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("No hay eventos programados para el {}.", long_date(date))),
            Line::from(""),
            Line::from(Span::styled("Esc para cerrar", Style::default().fg(theme.muted))),
        ])
        .block(overlay_block("Aviso", theme))
        .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    if let Some(event) = state.detail_event() {
        render_event_detail(frame, event, theme, palette);
    }
}

fn render_event_detail(frame: &mut Frame, event: &Event, theme: &Theme, palette: &Palette) {
    let area = centered_rect(60, 50, frame.size());
    frame.render_widget(Clear, area);
    let colour = palette.category(event.category);
    let dates = if event.shows_as_range() {
        format!(
            "Del {} al {}",
            long_date(event.start),
            long_date(event.end_date())
        )
    } else {
        long_date(event.start)
    };
    let label = Style::default().fg(theme.muted);
    let mut lines = vec![
        Line::from(Span::styled(
            event.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Categoría: ", label),
            Span::styled(event.category.name(), Style::default().fg(colour)),
        ]),
        Line::from(vec![
            Span::styled("Periodo:   ", label),
            Span::raw(format!(
                "{} ({})",
                event.semester.description(),
                event.semester.name()
            )),
        ]),
        Line::from(vec![Span::styled("Fecha:     ", label), Span::raw(dates)]),
        Line::from(vec![
            Span::styled("Duración:  ", label),
            Span::raw(event_duration_label(event)),
        ]),
    ];
    if let Some(description) = &event.description {
        lines.push(Line::from(""));
        lines.push(Line::from(description.clone()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc para cerrar", label)));
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Detalle del evento")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colour)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn overlay_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
}

/// Cuts `text` to at most `width` columns on grapheme boundaries.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w + 1 > width {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - used))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
