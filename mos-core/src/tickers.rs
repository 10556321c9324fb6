//! Persisted ticker collections: the MRU recent list and the favourites set.

use log::warn;

use crate::error::Result;
use crate::storage::{load_json, store_json, Storage};
use crate::ticker::Ticker;

/// How a new ticker enters a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPolicy {
    /// Insert at the front; an existing entry moves to the front.
    MostRecentFirst,
    /// Append at the back; an existing entry stays where it is.
    Append,
}

/// An ordered, duplicate-free list of tickers with an optional capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerList {
    items: Vec<Ticker>,
    capacity: Option<usize>,
    policy: InsertPolicy,
}

impl TickerList {
    pub fn recent(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: Some(capacity.max(1)),
            policy: InsertPolicy::MostRecentFirst,
        }
    }

    pub fn favourites() -> Self {
        Self {
            items: Vec::new(),
            capacity: None,
            policy: InsertPolicy::Append,
        }
    }

    /// Insert `ticker` according to the list policy. Returns whether the list changed.
    pub fn push(&mut self, ticker: Ticker) -> bool {
        let existing = self.items.iter().position(|t| *t == ticker);
        match self.policy {
            InsertPolicy::MostRecentFirst => {
                if existing == Some(0) {
                    return false;
                }
                if let Some(idx) = existing {
                    self.items.remove(idx);
                }
                self.items.insert(0, ticker);
                if let Some(cap) = self.capacity {
                    self.items.truncate(cap);
                }
                true
            }
            InsertPolicy::Append => {
                if existing.is_some() {
                    return false;
                }
                if let Some(cap) = self.capacity {
                    if self.items.len() >= cap {
                        self.items.remove(0);
                    }
                }
                self.items.push(ticker);
                true
            }
        }
    }

    pub fn remove(&mut self, ticker: &Ticker) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t != ticker);
        self.items.len() != before
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.items.iter().any(|t| t == ticker)
    }

    pub fn as_slice(&self) -> &[Ticker] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fill the list from a stored JSON array.
    ///
    /// Malformed JSON yields an empty list; entries that are not valid tickers
    /// are dropped. Neither case is an error.
    pub fn load(mut self, storage: &dyn Storage, name: &str) -> Self {
        let entries: Vec<String> = match load_json(storage, name) {
            Ok(Some(entries)) => entries,
            Ok(None) => return self,
            Err(err) => {
                warn!("ignoring malformed {name} value: {err}");
                return self;
            }
        };
        // Stored order is authoritative; replay it without the insert policy.
        for entry in entries {
            match Ticker::parse(&entry) {
                Ok(ticker) if !self.contains(&ticker) => self.items.push(ticker),
                Ok(_) => {}
                Err(err) => warn!("dropping stored ticker {entry:?}: {err}"),
            }
        }
        if let Some(cap) = self.capacity {
            self.items.truncate(cap);
        }
        self
    }

    /// Persist as a JSON array; an empty list removes the entry entirely.
    pub fn save(&self, storage: &mut dyn Storage, name: &str, max_age_secs: u64) -> Result<()> {
        if self.items.is_empty() {
            return storage.remove(name);
        }
        store_json(storage, name, &self.items, Some(max_age_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn names(list: &TickerList) -> Vec<&str> {
        list.iter().map(Ticker::as_str).collect()
    }

    #[test]
    fn recent_list_evicts_oldest() {
        let mut recent = TickerList::recent(5);
        for s in ["A", "B", "C", "D", "E", "F"] {
            recent.push(t(s));
        }
        assert_eq!(names(&recent), ["F", "E", "D", "C", "B"]);

        assert!(recent.push(t("C")));
        assert_eq!(names(&recent), ["C", "F", "E", "D", "B"]);
        assert!(!recent.push(t("c")));
    }

    #[test]
    fn favourites_append_without_duplicates() {
        let mut favs = TickerList::favourites();
        assert!(favs.push(t("AAPL")));
        assert!(favs.push(t("MSFT")));
        assert!(!favs.push(t("aapl")));
        assert_eq!(names(&favs), ["AAPL", "MSFT"]);
        assert!(favs.remove(&t("AAPL")));
        assert!(!favs.remove(&t("AAPL")));
        assert_eq!(names(&favs), ["MSFT"]);
    }

    #[test]
    fn load_tolerates_bad_cookie_values() {
        let mut store = MemoryStorage::new();
        assert!(TickerList::recent(5).load(&store, "recent_tickers").is_empty());
        store.set("recent_tickers", "{oops", None).unwrap();
        assert!(TickerList::recent(5).load(&store, "recent_tickers").is_empty());

        store
            .set("recent_tickers", r#"["B","$$","A","b"]"#, None)
            .unwrap();
        let list = TickerList::recent(5).load(&store, "recent_tickers");
        assert_eq!(names(&list), ["B", "A"]);
    }

    #[test]
    fn save_round_trip_and_clear() {
        let mut store = MemoryStorage::new();
        let mut favs = TickerList::favourites();
        favs.push(t("NVDA"));
        favs.save(&mut store, "favourite-tickers", 60).unwrap();
        assert_eq!(store.get("favourite-tickers").as_deref(), Some(r#"["NVDA"]"#));
        assert_eq!(store.max_age("favourite-tickers"), Some(Some(60)));

        favs.remove(&t("NVDA"));
        favs.save(&mut store, "favourite-tickers", 60).unwrap();
        assert_eq!(store.get("favourite-tickers"), None);
    }
}
