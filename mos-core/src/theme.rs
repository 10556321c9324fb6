use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{COLOR_THEME_COOKIE, SIDEBAR_EXPAND_KEY};
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Colour scheme selected with the cycler button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Dark,
    Light,
    System,
}

impl ColorScheme {
    pub const ORDER: [ColorScheme; 3] = [ColorScheme::Dark, ColorScheme::Light, ColorScheme::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Dark => "dark",
            ColorScheme::Light => "light",
            ColorScheme::System => "system",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ColorScheme::Dark => "moon-outline",
            ColorScheme::Light => "sunny-outline",
            ColorScheme::System => "desktop-outline",
        }
    }

    /// Class put on `<html>`; `System` leaves it bare so the media query decides.
    pub fn html_class(&self) -> Option<&'static str> {
        match self {
            ColorScheme::Dark => Some("dark"),
            ColorScheme::Light => Some("light"),
            ColorScheme::System => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorScheme::Dark => ColorScheme::Light,
            ColorScheme::Light => ColorScheme::System,
            ColorScheme::System => ColorScheme::Dark,
        }
    }

    /// Stored scheme, defaulting to dark. The cookie is (re)written either way
    /// so its year-long expiry keeps sliding.
    pub fn load(storage: &mut dyn Storage, max_age_secs: u64) -> Result<Self> {
        let scheme: ColorScheme = storage
            .get(COLOR_THEME_COOKIE)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        storage.set(COLOR_THEME_COOKIE, scheme.as_str(), Some(max_age_secs))?;
        Ok(scheme)
    }

    /// Advance to the next scheme and persist it.
    pub fn cycle(storage: &mut dyn Storage, max_age_secs: u64) -> Result<Self> {
        let current = storage
            .get(COLOR_THEME_COOKIE)
            .and_then(|raw| raw.parse::<ColorScheme>().ok())
            .unwrap_or_default();
        let next = current.next();
        storage.set(COLOR_THEME_COOKIE, next.as_str(), Some(max_age_secs))?;
        Ok(next)
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ORDER
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| Error::Storage(format!("unknown color theme {s:?}")))
    }
}

/// Whether the sidebar is expanded; defaults to expanded.
pub fn sidebar_expanded(storage: &dyn Storage) -> bool {
    storage
        .get(SIDEBAR_EXPAND_KEY)
        .map(|v| v != "false")
        .unwrap_or(true)
}

pub fn toggle_sidebar(storage: &mut dyn Storage) -> Result<bool> {
    let expanded = !sidebar_expanded(storage);
    storage.set(SIDEBAR_EXPAND_KEY, if expanded { "true" } else { "false" }, None)?;
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn missing_or_unknown_cookie_defaults_to_dark() {
        let mut store = MemoryStorage::new();
        assert_eq!(ColorScheme::load(&mut store, 60).unwrap(), ColorScheme::Dark);
        assert_eq!(store.get("color-theme").as_deref(), Some("dark"));
        assert_eq!(store.max_age("color-theme"), Some(Some(60)));

        store.set("color-theme", "sepia", None).unwrap();
        assert_eq!(ColorScheme::load(&mut store, 60).unwrap(), ColorScheme::Dark);
    }

    #[test]
    fn cycle_visits_all_schemes() {
        let mut store = MemoryStorage::new();
        store.set("color-theme", "light", None).unwrap();
        assert_eq!(ColorScheme::load(&mut store, 60).unwrap(), ColorScheme::Light);
        let seen: Vec<_> = (0..3)
            .map(|_| ColorScheme::cycle(&mut store, 60).unwrap())
            .collect();
        assert_eq!(
            seen,
            [ColorScheme::System, ColorScheme::Dark, ColorScheme::Light]
        );
        assert_eq!(ColorScheme::System.icon(), "desktop-outline");
        assert_eq!(ColorScheme::System.html_class(), None);
    }

    #[test]
    fn sidebar_toggles() {
        let mut store = MemoryStorage::new();
        assert!(sidebar_expanded(&store));
        assert!(!toggle_sidebar(&mut store).unwrap());
        assert_eq!(store.get("sidebar-expand").as_deref(), Some("false"));
        assert!(toggle_sidebar(&mut store).unwrap());
    }
}
