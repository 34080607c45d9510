pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod search;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use storage::{Category, Event, EventStore, Semester};
