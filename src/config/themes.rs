use std::collections::HashMap;
use std::str::FromStr;

use ratatui::style::Color;

use super::{PaletteConfig, ThemeName};
use crate::calendar::MonthIndex;
use crate::storage::Category;

/// Base colours for chrome: borders, text, selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,
    pub highlight: Color,
    pub warning: Color,
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: HashMap<ThemeName, Theme>,
}

impl ThemeRegistry {
    pub fn contains(&self, theme: &ThemeName) -> bool {
        self.themes.contains_key(theme)
    }

    pub fn get(&self, theme: &ThemeName) -> Theme {
        self.themes
            .get(theme)
            .copied()
            .unwrap_or_else(dark_theme)
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let themes = [
            (ThemeName::Dark, dark_theme()),
            (
                ThemeName::Light,
                Theme {
                    text: Color::Black,
                    muted: Color::DarkGray,
                    accent: Color::Blue,
                    border: Color::Gray,
                    selection_fg: Color::White,
                    selection_bg: Color::Blue,
                    highlight: Color::Magenta,
                    warning: Color::Red,
                },
            ),
            (
                ThemeName::HighContrast,
                Theme {
                    text: Color::White,
                    muted: Color::White,
                    accent: Color::LightYellow,
                    border: Color::White,
                    selection_fg: Color::Black,
                    selection_bg: Color::LightYellow,
                    highlight: Color::LightCyan,
                    warning: Color::LightRed,
                },
            ),
        ]
        .into_iter()
        .collect();
        Self { themes }
    }
}

fn dark_theme() -> Theme {
    Theme {
        text: Color::White,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        border: Color::Gray,
        selection_fg: Color::Black,
        selection_bg: Color::Cyan,
        highlight: Color::Yellow,
        warning: Color::LightRed,
    }
}

const MONTH_COLOURS: [Color; 12] = [
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0x22, 0xc5, 0x5e),
    Color::Rgb(0xa8, 0x55, 0xf7),
    Color::Rgb(0xf4, 0x3f, 0x5e),
    Color::Rgb(0x06, 0xb6, 0xd4),
    Color::Rgb(0xf9, 0x73, 0x16),
    Color::Rgb(0x63, 0x66, 0xf1),
    Color::Rgb(0xec, 0x48, 0x99),
    Color::Rgb(0x14, 0xb8, 0xa6),
    Color::Rgb(0x8b, 0x5c, 0xf6),
    Color::Rgb(0xea, 0xb3, 0x08),
];

fn default_category_colour(category: Category) -> Color {
    match category {
        Category::Nivelacion => Color::Rgb(0x8b, 0x5c, 0xf6),
        Category::Admision => Color::Rgb(0x3b, 0x82, 0xf6),
        Category::Bienestar => Color::Rgb(0x10, 0xb9, 0x81),
        Category::Biblioteca => Color::Rgb(0xf5, 0x9e, 0x0b),
        Category::Proyeccion => Color::Rgb(0x14, 0xb8, 0xa6),
        Category::Academico => Color::Rgb(0x63, 0x66, 0xf1),
        Category::Examenes => Color::Rgb(0xef, 0x44, 0x44),
        Category::NoLectivo => Color::Rgb(0x6b, 0x72, 0x80),
        Category::FeriadoNacional => Color::Rgb(0xdc, 0x26, 0x26),
        Category::FeriadoRegional => Color::Rgb(0xf9, 0x73, 0x16),
    }
}

/// Resolved colours for categories and months. Unknown keys and unparsable
/// colours in the config are logged and ignored.
#[derive(Debug, Clone)]
pub struct Palette {
    categories: HashMap<Category, Color>,
    months: [Color; 12],
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default())
    }
}

impl Palette {
    pub fn from_config(config: &PaletteConfig) -> Self {
        let mut categories: HashMap<Category, Color> = Category::all()
            .map(|category| (category, default_category_colour(category)))
            .collect();
        for (key, value) in &config.categories {
            let Ok(category) = Category::from_str(key) else {
                tracing::warn!(category = %key, "unknown category in palette, ignoring");
                continue;
            };
            if let Some(colour) = parse_colour(key, value) {
                categories.insert(category, colour);
            }
        }

        let mut months = MONTH_COLOURS;
        for (key, value) in &config.months {
            let Some(month) = MonthIndex::all().find(|month| month_key(*month) == *key) else {
                tracing::warn!(month = %key, "unknown month in palette, ignoring");
                continue;
            };
            if let Some(colour) = parse_colour(key, value) {
                months[usize::from(month.index())] = colour;
            }
        }

        Self { categories, months }
    }

    pub fn category(&self, category: Category) -> Color {
        self.categories
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_category_colour(category))
    }

    pub fn month(&self, month: MonthIndex) -> Color {
        self.months[usize::from(month.index())]
    }
}

fn month_key(month: MonthIndex) -> String {
    month.month().to_string().to_lowercase()
}

fn parse_colour(key: &str, value: &str) -> Option<Color> {
    match Color::from_str(value) {
        Ok(colour) => Some(colour),
        Err(_) => {
            tracing::warn!(key, value, "unparsable palette colour, keeping default");
            None
        }
    }
}
