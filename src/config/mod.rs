use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::themes::ThemeRegistry;
use crate::storage::Semester;

pub mod themes;

pub use themes::{Palette, Theme};

const APP_DOMAIN: &str = "pe";
const APP_ORG: &str = "Unamad";
const APP_NAME: &str = "calendario";

pub const CONFIG_ENV: &str = "CALENDARIO_CONFIG";
pub const DATA_ENV: &str = "CALENDARIO_DATA";

pub const DEFAULT_YEAR: i32 = 2026;
pub const DEFAULT_PREVIEW_LIMIT: usize = 6;

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load(&self.paths);
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load(&self.paths);
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    /// Calendar data file forced through the environment, if any.
    pub data_override: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let data_override = env::var(DATA_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_dirs.data_dir().join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            data_override,
            log_dir,
            state_dir,
        })
    }

    /// Paths rooted under one directory, used by tests and portable installs.
    pub fn rooted(root: &Path) -> Self {
        let config_dir = root.join("config");
        let state_dir = root.join("state");
        Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
            data_override: None,
            log_dir: state_dir.join("logs"),
            state_dir,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.log_dir, &self.state_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("calendario.log")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_semester: Option<Semester>,
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: ThemeName,
    pub month_preview_limit: usize,
    pub palette: PaletteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            data_file: None,
            default_semester: None,
            theme: ThemeName::Dark,
            month_preview_limit: DEFAULT_PREVIEW_LIMIT,
            palette: PaletteConfig::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self, paths: &ConfigPaths) {
        if let Some(path) = self.data_file.take() {
            self.data_file = Some(if path.is_relative() {
                paths.config_dir.join(path)
            } else {
                path
            });
        }
        if let Some(path) = &paths.data_override {
            self.data_file = Some(path.clone());
        }
        if self.month_preview_limit == 0 {
            tracing::warn!("month_preview_limit must be positive, using default");
            self.month_preview_limit = DEFAULT_PREVIEW_LIMIT;
        }
        if self.default_semester.is_some_and(|semester| semester.is_wildcard()) {
            tracing::warn!("default_semester cannot be `general`, ignoring it");
            self.default_semester = None;
        }
    }

    pub fn theme(&self) -> Theme {
        ThemeRegistry::default().get(&self.theme)
    }

    pub fn palette(&self) -> Palette {
        Palette::from_config(&self.palette)
    }
}

/// Colour overrides keyed by category id and lowercase English month name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub categories: BTreeMap<String, String>,
    pub months: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    Dark,
    Light,
    HighContrast,
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Dark
    }
}

fn lenient_theme<'de, D>(deserializer: D) -> std::result::Result<ThemeName, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(match raw.as_str() {
        "dark" => ThemeName::Dark,
        "light" => ThemeName::Light,
        "high-contrast" => ThemeName::HighContrast,
        other => {
            tracing::warn!(theme = other, "unknown theme in config, falling back to dark");
            ThemeName::Dark
        }
    })
}
