//! Theme preference store.
//!
//! Holds the user's [`ThemePreference`] and the live OS [`ColorScheme`], and
//! writes the resolved scheme to a [`ThemeSurface`] every time either input
//! changes. The preference is persisted through a [`PreferenceStore`]; OS
//! changes arrive through a [`SchemeSource`] subscription.
//!
//! The store is owned by the application shell. OS notifications are
//! forwarded by the listener (typically onto the app's event channel) and fed
//! back with [`ThemeStore::on_system_change`], so all mutation happens on the
//! owning thread.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::{resolve, ColorScheme, ThemePreference};

/// Scheme assumed when the host has no OS scheme source.
const FALLBACK_SCHEME: ColorScheme = ColorScheme::Dark;

/// Single-value persistence for the preference string.
pub trait PreferenceStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, value: &str) -> Result<()>;
}

/// Receives the resolved scheme (the `data-theme` attribute).
pub trait ThemeSurface {
    fn set_theme_attribute(&mut self, scheme: ColorScheme);
}

/// Callback invoked with the new OS scheme on every change notification.
pub type SchemeListener = Box<dyn Fn(ColorScheme) + Send + 'static>;

/// Host-provided OS color scheme signal.
pub trait SchemeSource {
    /// One-shot read. `None` when the host has no scheme source.
    fn current(&self) -> Option<ColorScheme>;

    /// Register `listener` for change notifications relative to `last_seen`,
    /// the result of the caller's [`current`](Self::current) read. `None`
    /// when the host cannot deliver them.
    fn subscribe(
        &self,
        last_seen: Option<ColorScheme>,
        listener: SchemeListener,
    ) -> Option<SchemeWatch>;
}

/// Registration handle for a [`SchemeSource`] listener. Dropping it removes
/// the listener.
pub struct SchemeWatch {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SchemeWatch {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for SchemeWatch {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub struct ThemeStore<S> {
    preference: ThemePreference,
    system: ColorScheme,
    persisted: Box<dyn PreferenceStore>,
    surface: S,
    /// Preference forced for this session only (never persisted).
    session_override: Option<ThemePreference>,
    watch: Option<SchemeWatch>,
    initialized: bool,
}

impl<S: ThemeSurface> ThemeStore<S> {
    pub fn new(persisted: Box<dyn PreferenceStore>, surface: S) -> Self {
        Self {
            preference: ThemePreference::System,
            system: FALLBACK_SCHEME,
            persisted,
            surface,
            session_override: None,
            watch: None,
            initialized: false,
        }
    }

    /// Use `preference` instead of the persisted value when initializing.
    pub fn with_session_override(mut self, preference: Option<ThemePreference>) -> Self {
        self.session_override = preference;
        self
    }

    /// Read the persisted preference and the OS scheme, apply the resolved
    /// theme once, and register `listener` for OS changes. Calling it again
    /// does nothing.
    pub fn initialize(&mut self, source: &dyn SchemeSource, listener: SchemeListener) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let persisted = ThemePreference::from_persisted(self.persisted.load().as_deref());
        self.preference = self.session_override.unwrap_or(persisted);
        let current = source.current();
        self.system = current.unwrap_or(FALLBACK_SCHEME);
        self.watch = source.subscribe(current, listener);

        let resolved = self.apply();
        info!(
            preference = %self.preference,
            system = %self.system,
            %resolved,
            listening = self.watch.is_some(),
            "theme initialized"
        );
    }

    /// Record a new OS scheme and reapply.
    pub fn on_system_change(&mut self, scheme: ColorScheme) -> ColorScheme {
        debug!(%scheme, "system color scheme changed");
        self.system = scheme;
        self.apply()
    }

    /// Update and persist the preference, then reapply. A persistence
    /// failure is logged; the in-memory preference still changes.
    pub fn set_preference(&mut self, preference: ThemePreference) -> ColorScheme {
        self.preference = preference;
        if let Err(e) = self.persisted.save(preference.as_str()) {
            warn!(%preference, "failed to persist theme preference: {e:#}");
        }
        self.apply()
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self) -> ColorScheme {
        resolve(self.preference, self.system)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Remove the OS listener.
    pub fn shutdown(&mut self) {
        if self.watch.take().is_some() {
            debug!("theme listener removed");
        }
    }

    fn apply(&mut self) -> ColorScheme {
        let resolved = self.resolved();
        self.surface.set_theme_attribute(resolved);
        resolved
    }
}
