// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Theme store
//
// Light/dark flag persisted as "light" or "dark". Storage failures are
// logged and the in-memory mode stays authoritative.

use crate::diagnostics::{Diagnostics, StoreWarning};
use crate::persist::WriteThrough;
use crate::storage::{KeyValueStore, THEME_KEY};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a persisted value. Anything other than "light"/"dark" is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

/// Fixed colour set for one theme mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub primary_light: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub text_tertiary: &'static str,
    pub border: &'static str,
    pub border_light: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub input_background: &'static str,
    pub shadow: &'static str,
}

const LIGHT_PALETTE: Palette = Palette {
    background: "#F3F4F6",
    card: "#FFFFFF",
    surface: "#FFFFFF",
    primary: "#1E3A8A",
    primary_light: "#DBEAFE",
    text: "#111827",
    text_secondary: "#6B7280",
    text_tertiary: "#9CA3AF",
    border: "#F3F4F6",
    border_light: "#E5E7EB",
    error: "#DC2626",
    success: "#059669",
    warning: "#D97706",
    icon: "#6B7280",
    placeholder: "#9CA3AF",
    input_background: "#F9FAFB",
    shadow: "#000000",
};

const DARK_PALETTE: Palette = Palette {
    background: "#111827",
    card: "#1F2937",
    surface: "#374151",
    primary: "#60A5FA",
    primary_light: "#93C5FD",
    text: "#F9FAFB",
    text_secondary: "#D1D5DB",
    text_tertiary: "#9CA3AF",
    border: "#374151",
    border_light: "#4B5563",
    error: "#EF4444",
    success: "#10B981",
    warning: "#F59E0B",
    icon: "#D1D5DB",
    placeholder: "#6B7280",
    input_background: "#374151",
    shadow: "#000000",
};

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => LIGHT_PALETTE,
            ThemeMode::Dark => DARK_PALETTE,
        }
    }
}

/// What a screen needs to style itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
    pub colors: Palette,
}

/// Holds the current theme mode and persists it on toggle
pub struct ThemeStore {
    mode: watch::Sender<ThemeMode>,
    persist: WriteThrough,
}

impl ThemeStore {
    /// Create a store in light mode. Call [`ThemeStore::load`] once afterwards.
    pub fn new(storage: Arc<dyn KeyValueStore>, diagnostics: Diagnostics) -> Self {
        let (mode, _) = watch::channel(ThemeMode::Light);
        Self {
            mode,
            persist: WriteThrough::new(storage, THEME_KEY, diagnostics),
        }
    }

    /// Apply the persisted mode, if any. Read failures leave the mode unchanged.
    pub async fn load(&self) -> Option<StoreWarning> {
        match self.persist.read().await {
            Ok(Some(value)) => {
                match ThemeMode::parse(&value) {
                    Some(mode) => {
                        tracing::info!("Loaded theme: {}", mode.as_str());
                        self.mode.send_replace(mode);
                    }
                    None => tracing::debug!("Ignoring unknown theme value {:?}", value),
                }
                None
            }
            Ok(None) => None,
            Err(warning) => Some(warning),
        }
    }

    /// Flip the mode, then persist it. The flip stands even if the write fails.
    pub async fn toggle(&self) -> Option<StoreWarning> {
        self.mode.send_modify(|mode| *mode = mode.toggled());
        tracing::info!("Theme toggled to {}", self.mode().as_str());

        self.persist
            .write(|| Ok(self.mode().as_str().to_string()))
            .await
    }

    pub fn mode(&self) -> ThemeMode {
        *self.mode.borrow()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.mode().is_dark()
    }

    /// Current theme, derived from the mode on every call
    pub fn theme(&self) -> Theme {
        let mode = self.mode();
        Theme {
            dark: mode.is_dark(),
            colors: Palette::for_mode(mode),
        }
    }

    /// Receiver notified with the new mode on every change
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.mode.subscribe()
    }
}
