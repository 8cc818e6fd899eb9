pub mod palette;
pub mod store;
pub mod system;

use std::fmt;
use std::str::FromStr;

pub use palette::{Palette, PaletteOverrides, PaletteSurface};
pub use store::{PreferenceStore, SchemeListener, SchemeSource, SchemeWatch, ThemeStore, ThemeSurface};
pub use system::SystemSchemeSource;

/// The user's theme choice. `System` defers to the OS color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [ThemePreference; 3] = [
        ThemePreference::Light,
        ThemePreference::Dark,
        ThemePreference::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Cycle light -> dark -> system -> light.
    pub fn next(&self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }

    /// Lenient parse for persisted values: anything unrecognized is `System`.
    pub fn from_persisted(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme preference '{0}' (expected light, dark, or system)")]
pub struct ParsePreferenceError(String);

impl FromStr for ThemePreference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ThemePreference::ALL
            .into_iter()
            .find(|pref| pref.as_str() == s)
            .ok_or_else(|| ParsePreferenceError(s.to_string()))
    }
}

/// A concrete light/dark scheme: what the OS reports, and what gets applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scheme to apply: an explicit preference wins, `System` follows the OS.
pub fn resolve(preference: ThemePreference, system: ColorScheme) -> ColorScheme {
    match preference {
        ThemePreference::Light => ColorScheme::Light,
        ThemePreference::Dark => ColorScheme::Dark,
        ThemePreference::System => system,
    }
}
