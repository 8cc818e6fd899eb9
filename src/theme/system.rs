//! OS color scheme detection.
//!
//! Probes, in order: the `DIFFER_SCHEME` override, the terminal's
//! `COLORFGBG`, the GNOME `color-scheme` setting, and the macOS
//! `AppleInterfaceStyle` default. Change notifications are produced by polling
//! on an interval and firing only when the detected value differs.

use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;

use super::store::{SchemeListener, SchemeSource, SchemeWatch};
use super::ColorScheme;

pub struct SystemSchemeSource {
    poll_interval: Duration,
}

impl SystemSchemeSource {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl SchemeSource for SystemSchemeSource {
    fn current(&self) -> Option<ColorScheme> {
        detect_scheme()
    }

    /// Requires a running tokio runtime.
    fn subscribe(
        &self,
        last_seen: Option<ColorScheme>,
        listener: SchemeListener,
    ) -> Option<SchemeWatch> {
        let mut last = last_seen?;
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            // First tick completes immediately; `last` already covers it.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Ok(Some(now)) = tokio::task::spawn_blocking(detect_scheme).await else {
                    continue;
                };
                if now != last {
                    debug!(from = %last, to = %now, "detected color scheme change");
                    last = now;
                    listener(now);
                }
            }
        });

        Some(SchemeWatch::new(move || handle.abort()))
    }
}

pub fn detect_scheme() -> Option<ColorScheme> {
    std::env::var("DIFFER_SCHEME")
        .ok()
        .and_then(|v| parse_scheme_name(&v))
        .or_else(|| {
            std::env::var("COLORFGBG")
                .ok()
                .and_then(|v| parse_colorfgbg(&v))
        })
        .or_else(gnome_color_scheme)
        .or_else(macos_interface_style)
}

fn parse_scheme_name(value: &str) -> Option<ColorScheme> {
    match value.trim().to_ascii_lowercase().as_str() {
        "light" => Some(ColorScheme::Light),
        "dark" => Some(ColorScheme::Dark),
        _ => None,
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;other;bg`). Background palette
/// indices 0-6 are dark colors.
fn parse_colorfgbg(value: &str) -> Option<ColorScheme> {
    let background = value
        .rsplit([';', ':'])
        .next()?
        .trim()
        .parse::<usize>()
        .ok()?;
    Some(if background <= 6 {
        ColorScheme::Dark
    } else {
        ColorScheme::Light
    })
}

/// Output of `gsettings get org.gnome.desktop.interface color-scheme`,
/// e.g. `'prefer-dark'`.
fn parse_gsettings_color_scheme(output: &str) -> Option<ColorScheme> {
    match output.trim().trim_matches('\'') {
        "prefer-dark" => Some(ColorScheme::Dark),
        "prefer-light" | "default" => Some(ColorScheme::Light),
        _ => None,
    }
}

fn gnome_color_scheme() -> Option<ColorScheme> {
    if cfg!(target_os = "macos") || cfg!(windows) {
        return None;
    }
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_gsettings_color_scheme(&String::from_utf8_lossy(&output.stdout))
}

/// `defaults read -g AppleInterfaceStyle` prints `Dark` in dark mode and
/// fails (key absent) in light mode.
fn parse_apple_interface_style(success: bool, stdout: &str) -> ColorScheme {
    if success && stdout.trim().eq_ignore_ascii_case("dark") {
        ColorScheme::Dark
    } else {
        ColorScheme::Light
    }
}

fn macos_interface_style() -> Option<ColorScheme> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    Some(parse_apple_interface_style(
        output.status.success(),
        &String::from_utf8_lossy(&output.stdout),
    ))
}
