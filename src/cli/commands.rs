use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::calendar::format::{
    day_heading, event_dates_label, event_duration_label, events_count_label, long_date,
};
use crate::calendar::{events_in_month, events_on_day, month_counts, parse_date, DateKey, MonthIndex};
use crate::config::AppConfig;
use crate::search::{filter_events, CategorySet, FilterState};
use crate::storage::{Category, Event, EventStore, Semester};

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Academic period (2026-0, 2026-1, 2026-2); defaults to `default_semester` in the config
    #[arg(long, short = 's')]
    pub semester: Option<Semester>,
    /// Only these categories (repeatable); all categories when omitted
    #[arg(long = "category", short = 'c')]
    pub categories: Vec<Category>,
    /// Accent-insensitive text matched against title and description
    #[arg(long, short = 'q')]
    pub query: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Only events touching this month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: Option<u8>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MonthsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DayArgs {
    /// Day to inspect, as YYYY-MM-DD
    pub date: String,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Event identifier
    pub id: String,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn list_events(config: &AppConfig, store: &EventStore, args: ListArgs) -> Result<()> {
    let output = run_list(config, store, &args)?;
    print!("{output}");
    Ok(())
}

pub fn list_months(config: &AppConfig, store: &EventStore, args: MonthsArgs) -> Result<()> {
    let output = run_months(config, store, &args)?;
    print!("{output}");
    Ok(())
}

pub fn show_day(config: &AppConfig, store: &EventStore, args: DayArgs) -> Result<()> {
    let output = run_day(config, store, &args)?;
    print!("{output}");
    Ok(())
}

pub fn show_event(store: &EventStore, args: ShowArgs) -> Result<()> {
    let output = run_show(store, &args)?;
    print!("{output}");
    Ok(())
}

/// Prints the load report; fails when anything was skipped or suspicious.
pub fn check_data(store: &EventStore) -> Result<()> {
    let (output, clean) = run_check(store);
    print!("{output}");
    if !clean {
        bail!("calendar data has problems");
    }
    Ok(())
}

fn build_filter(config: &AppConfig, args: &FilterArgs) -> Result<FilterState> {
    let Some(semester) = args.semester.or(config.default_semester) else {
        bail!("choose a period with --semester (2026-0, 2026-1 or 2026-2)");
    };
    if semester.is_wildcard() {
        bail!("`general` is not a period; pick 2026-0, 2026-1 or 2026-2");
    }
    let categories = if args.categories.is_empty() {
        CategorySet::all()
    } else {
        args.categories.iter().copied().collect()
    };
    Ok(FilterState {
        semester: Some(semester),
        categories,
        query: args.query.clone().unwrap_or_default(),
    })
}

fn summary_line(filter: &FilterState, count: usize) -> String {
    let period = filter
        .semester
        .map(|semester| semester.description())
        .unwrap_or("-");
    format!("Mostrando: {period} | {}", events_count_label(count))
}

fn run_list(config: &AppConfig, store: &EventStore, args: &ListArgs) -> Result<String> {
    let filter = build_filter(config, &args.filter)?;
    let mut events = filter_events(store.events(), &filter);
    if let Some(number) = args.month {
        let month = MonthIndex::from_number(number).context("month must be between 1 and 12")?;
        events = events_in_month(events.iter().copied(), config.year, month);
    }

    if args.json {
        let views: Vec<EventView> = events.iter().map(|event| EventView::from(*event)).collect();
        let mut json = serde_json::to_string_pretty(&views).context("serializing events")?;
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", summary_line(&filter, events.len()));
    for event in &events {
        let _ = writeln!(&mut out, "{}", event_line(event));
    }
    Ok(out)
}

fn run_months(config: &AppConfig, store: &EventStore, args: &MonthsArgs) -> Result<String> {
    let filter = build_filter(config, &args.filter)?;
    let events = filter_events(store.events(), &filter);
    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", summary_line(&filter, events.len()));
    let counts = month_counts(events.iter().copied(), config.year);
    if counts.is_empty() {
        out.push_str("Ningún mes tiene eventos.\n");
    }
    for (month, count) in counts {
        let _ = writeln!(&mut out, "{}: {}", month.name(), events_count_label(count));
    }
    Ok(out)
}

fn run_day(config: &AppConfig, store: &EventStore, args: &DayArgs) -> Result<String> {
    let date = parse_date(args.date.trim())
        .with_context(|| format!("parsing date {:?} (expected YYYY-MM-DD)", args.date))?;
    let filter = build_filter(config, &args.filter)?;
    let events = filter_events(store.events(), &filter);
    let on_day = events_on_day(events.iter().copied(), date);
    if on_day.is_empty() {
        return Ok(format!(
            "No hay eventos programados para el {}.\n",
            long_date(date)
        ));
    }
    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        "{} · {}",
        day_heading(date),
        events_count_label(on_day.len())
    );
    for event in on_day {
        let _ = writeln!(&mut out, "{}", event_line(event));
    }
    Ok(out)
}

fn run_show(store: &EventStore, args: &ShowArgs) -> Result<String> {
    let Some(event) = store.get(args.id.trim()) else {
        bail!("no event with id `{}`", args.id.trim());
    };
    let dates = if event.shows_as_range() {
        format!(
            "del {} al {}",
            long_date(event.start),
            long_date(event.end_date())
        )
    } else {
        long_date(event.start)
    };
    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", event.title);
    let _ = writeln!(&mut out, "  id:        {}", event.id);
    let _ = writeln!(&mut out, "  categoría: {}", event.category.name());
    let _ = writeln!(
        &mut out,
        "  periodo:   {} ({})",
        event.semester.description(),
        event.semester.name()
    );
    let _ = writeln!(&mut out, "  fecha:     {dates}");
    let _ = writeln!(&mut out, "  duración:  {}", event_duration_label(event));
    if let Some(description) = &event.description {
        let _ = writeln!(&mut out, "\n  {description}");
    }
    Ok(out)
}

fn run_check(store: &EventStore) -> (String, bool) {
    let report = store.report();
    let mut out = String::new();
    let _ = writeln!(&mut out, "fuente: {}", store.source());
    let _ = writeln!(&mut out, "eventos cargados: {}", report.loaded);
    let _ = writeln!(&mut out, "eventos omitidos: {}", report.skipped.len());
    for skipped in &report.skipped {
        let _ = writeln!(&mut out, "  - {}: {}", skipped.id, skipped.reason);
    }
    if !report.range_without_end.is_empty() {
        let _ = writeln!(
            &mut out,
            "marcados como rango sin fecha final: {}",
            report.range_without_end.join(", ")
        );
    }
    (out, report.is_clean())
}

fn event_line(event: &Event) -> String {
    format!(
        "- {} · {} [{}] ({})",
        event_dates_label(event),
        event.title,
        event.category.name(),
        event.id
    )
}

#[derive(Debug, Serialize)]
struct EventView<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    category: &'static str,
    category_name: &'static str,
    semester: &'static str,
    is_range: bool,
    duration: String,
}

impl<'a> From<&'a Event> for EventView<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            id: &event.id,
            title: &event.title,
            description: event.description.as_deref(),
            start: DateKey::from(event.start).to_string(),
            end: event.end.map(|end| DateKey::from(end).to_string()),
            category: event.category.id(),
            category_name: event.category.name(),
            semester: event.semester.id(),
            is_range: event.is_range,
            duration: event_duration_label(event),
        }
    }
}
