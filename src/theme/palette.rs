use ratatui::style::Color;
use serde::Deserialize;
use tracing::debug;

use super::store::ThemeSurface;
use super::ColorScheme;

/// All semantic color slots for the differ UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub scheme: ColorScheme,

    // General UI
    pub accent: Color,
    pub secondary: Color,
    pub text: Color,
    pub text_muted: Color,
    pub surface: Color,
    pub bar_bg: Color,
    pub selection_bg: Color,
    pub selection_inactive_bg: Color,

    // Diff
    pub diff_add_bg: Color,
    pub diff_del_bg: Color,
    pub diff_add_fg: Color,
    pub diff_del_fg: Color,
    pub diff_context_fg: Color,
    pub diff_hunk_header_fg: Color,
    pub cursor_line_bg: Color,

    // Status indicators
    pub success: Color,
    pub error: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => light(),
            ColorScheme::Dark => dark(),
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

// ── Serde-compatible override structs ─────────────────────────────

/// `[colors.light]` / `[colors.dark]` tables from config.toml.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PaletteOverrides {
    #[serde(default)]
    pub light: Option<ColorOverrides>,
    #[serde(default)]
    pub dark: Option<ColorOverrides>,
}

impl PaletteOverrides {
    fn for_scheme(&self, scheme: ColorScheme) -> Option<&ColorOverrides> {
        match scheme {
            ColorScheme::Light => self.light.as_ref(),
            ColorScheme::Dark => self.dark.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ColorOverrides {
    pub accent: Option<String>,
    pub secondary: Option<String>,
    pub text: Option<String>,
    pub text_muted: Option<String>,
    pub surface: Option<String>,
    pub bar_bg: Option<String>,
    pub selection_bg: Option<String>,
    pub selection_inactive_bg: Option<String>,
    pub diff_add_bg: Option<String>,
    pub diff_del_bg: Option<String>,
    pub diff_add_fg: Option<String>,
    pub diff_del_fg: Option<String>,
    pub diff_context_fg: Option<String>,
    pub diff_hunk_header_fg: Option<String>,
    pub cursor_line_bg: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
}

/// Overwrite palette slots with any valid hex colors from `overrides`.
/// Invalid hex strings are ignored.
pub fn apply_overrides(palette: &mut Palette, overrides: &ColorOverrides) {
    macro_rules! apply {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(ref hex) = overrides.$field {
                    if let Some(c) = parse_hex_color(hex) {
                        palette.$field = c;
                    }
                }
            )*
        };
    }
    apply!(
        accent,
        secondary,
        text,
        text_muted,
        surface,
        bar_bg,
        selection_bg,
        selection_inactive_bg,
        diff_add_bg,
        diff_del_bg,
        diff_add_fg,
        diff_del_fg,
        diff_context_fg,
        diff_hunk_header_fg,
        cursor_line_bg,
        success,
        error,
        warning,
    );
}

/// Terminal theme surface: applying a scheme swaps the active palette.
#[derive(Debug, Clone)]
pub struct PaletteSurface {
    palette: Palette,
    overrides: PaletteOverrides,
}

impl PaletteSurface {
    pub fn new(overrides: PaletteOverrides) -> Self {
        Self {
            palette: dark(),
            overrides,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl ThemeSurface for PaletteSurface {
    fn set_theme_attribute(&mut self, scheme: ColorScheme) {
        let mut palette = Palette::for_scheme(scheme);
        if let Some(overrides) = self.overrides.for_scheme(scheme) {
            apply_overrides(&mut palette, overrides);
        }
        self.palette = palette;
        debug!(data_theme = scheme.as_str(), "applied palette");
    }
}

// ── Built-in palettes ────────────────────────────────────────────

fn dark() -> Palette {
    Palette {
        scheme: ColorScheme::Dark,
        accent: Color::Cyan,
        secondary: Color::Magenta,
        text: Color::White,
        text_muted: Color::DarkGray,
        surface: Color::Rgb(30, 30, 30),
        bar_bg: Color::Rgb(30, 30, 30),
        selection_bg: Color::Rgb(40, 40, 50),
        selection_inactive_bg: Color::Rgb(35, 35, 45),
        diff_add_bg: Color::Rgb(0, 30, 0),
        diff_del_bg: Color::Rgb(40, 0, 0),
        diff_add_fg: Color::Green,
        diff_del_fg: Color::Red,
        diff_context_fg: Color::Rgb(171, 178, 191),
        diff_hunk_header_fg: Color::Magenta,
        cursor_line_bg: Color::Rgb(50, 50, 65),
        success: Color::Green,
        error: Color::Red,
        warning: Color::Yellow,
    }
}

fn light() -> Palette {
    Palette {
        scheme: ColorScheme::Light,
        accent: Color::Rgb(9, 105, 218),
        secondary: Color::Rgb(130, 80, 223),
        text: Color::Rgb(31, 35, 40),
        text_muted: Color::Rgb(101, 109, 118),
        surface: Color::Rgb(255, 255, 255),
        bar_bg: Color::Rgb(234, 238, 242),
        selection_bg: Color::Rgb(221, 244, 255),
        selection_inactive_bg: Color::Rgb(234, 238, 242),
        diff_add_bg: Color::Rgb(218, 251, 225),
        diff_del_bg: Color::Rgb(255, 235, 233),
        diff_add_fg: Color::Rgb(26, 127, 55),
        diff_del_fg: Color::Rgb(209, 36, 47),
        diff_context_fg: Color::Rgb(31, 35, 40),
        diff_hunk_header_fg: Color::Rgb(130, 80, 223),
        cursor_line_bg: Color::Rgb(255, 248, 197),
        success: Color::Rgb(26, 127, 55),
        error: Color::Rgb(209, 36, 47),
        warning: Color::Rgb(154, 103, 0),
    }
}
