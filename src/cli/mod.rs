use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::{ConfigLoader, ConfigPaths, CONFIG_ENV, DATA_ENV};
use crate::storage::EventStore;

pub mod commands;

use self::commands::{DayArgs, ListArgs, MonthsArgs, ShowArgs};

#[derive(Parser, Debug)]
#[command(
    name = "calendario",
    version,
    about = "Calendario académico UNAMAD en la terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over CALENDARIO_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Calendar data file (takes precedence over CALENDARIO_DATA and `data_file`)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Calendar year to display
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive calendar (default)
    Tui,
    /// Print the events matching the filters
    List(ListArgs),
    /// Print the months that have events, with counts
    Months(MonthsArgs),
    /// Print the events on one day
    Day(DayArgs),
    /// Print the detail of one event
    Show(ShowArgs),
    /// Validate the calendar data and print the load report
    Check,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    let command = cli.command.unwrap_or(Commands::Tui);
    let log_target = match command {
        Commands::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_tracing(&cli.log_level, log_target, &paths)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;

    let mut config = loader.load_or_init()?;
    if let Some(year) = cli.year {
        config.year = year;
    }
    let store = EventStore::open(config.data_file.as_deref()).context("loading calendar data")?;
    let config = Arc::new(config);

    match command {
        Commands::Tui => {
            if !atty::is(atty::Stream::Stdout) {
                bail!("the interactive calendar needs a terminal; try `calendario list`");
            }
            let mut app = App::new(config.clone(), &store);
            commands::run_tui(&mut app)
        }
        Commands::List(args) => commands::list_events(&config, &store, args),
        Commands::Months(args) => commands::list_months(&config, &store, args),
        Commands::Day(args) => commands::show_day(&config, &store, args),
        Commands::Show(args) => commands::show_event(&store, args),
        Commands::Check => commands::check_data(&store),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    /// The TUI owns the screen, so logs go to `<state_dir>/logs`.
    File,
}

fn init_tracing(level: &str, target: LogTarget, paths: &ConfigPaths) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| -> Result<()> {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match target {
            LogTarget::Stderr => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            LogTarget::File => {
                let log_file = paths.log_file();
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)
                    .with_context(|| format!("opening log file {}", log_file.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .init();
            }
        }
        Ok(())
    })
    .map(|_| ())
}
