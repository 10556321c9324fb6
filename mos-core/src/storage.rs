//! Client-side key/value storage.
//!
//! Components never reach for `document.cookie` or `localStorage` directly;
//! they receive a [`Storage`] and the browser shell supplies the real jar.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// A named value store with optional expiry.
pub trait Storage {
    fn get(&self, name: &str) -> Option<String>;

    /// Store `value` under `name`. `None` for `max_age_secs` means a session entry.
    fn set(&mut self, name: &str, value: &str, max_age_secs: Option<u64>) -> Result<()>;

    fn remove(&mut self, name: &str) -> Result<()>;
}

/// In-process store used by tests and native callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, (String, Option<u64>)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry recorded for `name`, if the entry exists.
    pub fn max_age(&self, name: &str) -> Option<Option<u64>> {
        self.entries.get(name).map(|(_, age)| *age)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(|(value, _)| value.clone())
    }

    fn set(&mut self, name: &str, value: &str, max_age_secs: Option<u64>) -> Result<()> {
        self.entries
            .insert(name.to_string(), (value.to_string(), max_age_secs));
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.entries.remove(name);
        Ok(())
    }
}

/// Read a JSON value; a missing entry is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, name: &str) -> Result<Option<T>> {
    match storage.get(name) {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn store_json<T: Serialize + ?Sized>(
    storage: &mut dyn Storage,
    name: &str,
    value: &T,
    max_age_secs: Option<u64>,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    storage.set(name, &json, max_age_secs)
}

// ---------- Cookie header helpers -------------------------------------------

/// Build the string assigned to `document.cookie`. `value` must already be encoded.
pub fn cookie_assignment(name: &str, value: &str, max_age_secs: Option<u64>) -> String {
    let mut out = format!("{name}={value}");
    if let Some(age) = max_age_secs {
        out.push_str(&format!("; max-age={age}"));
    }
    out.push_str("; path=/; SameSite=Lax");
    out
}

/// Assignment that makes the browser drop `name` immediately.
pub fn cookie_expiry(name: &str) -> String {
    format!("{name}=; max-age=0; path=/; SameSite=Lax")
}

/// Find the raw (still encoded) value of `name` in a `a=b; c=d` cookie header.
pub fn cookie_lookup<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_tracks_expiry() {
        let mut store = MemoryStorage::new();
        assert_eq!(store.get("color-theme"), None);
        store.set("color-theme", "dark", Some(60)).unwrap();
        store.set("session", "1", None).unwrap();
        assert_eq!(store.get("color-theme").as_deref(), Some("dark"));
        assert_eq!(store.max_age("color-theme"), Some(Some(60)));
        assert_eq!(store.max_age("session"), Some(None));
        store.remove("session").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn json_helpers_report_malformed_values() {
        let mut store = MemoryStorage::new();
        store_json(&mut store, "list", &vec!["A", "B"], None).unwrap();
        let list: Option<Vec<String>> = load_json(&store, "list").unwrap();
        assert_eq!(list, Some(vec!["A".to_string(), "B".to_string()]));

        store.set("list", "[not json", None).unwrap();
        assert!(load_json::<Vec<String>>(&store, "list").is_err());
        assert!(load_json::<Vec<String>>(&store, "absent").unwrap().is_none());
    }

    #[test]
    fn cookie_strings() {
        assert_eq!(
            cookie_assignment("color-theme", "dark", Some(31_536_000)),
            "color-theme=dark; max-age=31536000; path=/; SameSite=Lax"
        );
        assert_eq!(
            cookie_assignment("s", "1", None),
            "s=1; path=/; SameSite=Lax"
        );
        assert_eq!(
            cookie_expiry("recent_tickers"),
            "recent_tickers=; max-age=0; path=/; SameSite=Lax"
        );
    }

    #[test]
    fn cookie_header_lookup() {
        let header = "color-theme=light; recent_tickers=%5B%22A%22%5D;flag=";
        assert_eq!(cookie_lookup(header, "color-theme"), Some("light"));
        assert_eq!(cookie_lookup(header, "recent_tickers"), Some("%5B%22A%22%5D"));
        assert_eq!(cookie_lookup(header, "flag"), Some(""));
        assert_eq!(cookie_lookup(header, "theme"), None);
        assert_eq!(cookie_lookup("", "theme"), None);
    }
}
