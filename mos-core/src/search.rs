//! Search submission, loading state and the history entries it pushes.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DashboardConfig, RECENT_TICKERS_COOKIE};
use crate::error::Error;
use crate::notification::NotificationConfig;
use crate::storage::Storage;
use crate::ticker::Ticker;
use crate::tickers::TickerList;

/// Browser history payload: the full response, or just the ticker after a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryState {
    Data { data: Value },
    Ticker { ticker: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub state: HistoryState,
    pub path: String,
}

/// A non-2xx answer from the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub status: u16,
    pub status_text: String,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl FetchFailure {
    /// Build from a response, taking the message from a JSON `{"error": ...}` body if present.
    pub fn from_body(status: u16, status_text: impl Into<String>, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        Self {
            status,
            status_text: status_text.into(),
            message,
        }
    }

    /// Transport failure with no response at all.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            message: Some(message.into()),
        }
    }

    /// Status text, or `error` when the server sent none (HTTP/2 never does).
    pub fn label(&self) -> &str {
        if self.status_text.is_empty() {
            "error"
        } else {
            &self.status_text
        }
    }

    pub fn notification(&self) -> NotificationConfig {
        let description = self
            .message
            .clone()
            .unwrap_or_else(|| "The server did not return a valuation.".to_string());
        NotificationConfig::error(format!("{} {}", self.status, self.label()), description)
            .with_icon("bug-outline")
            .with_id(self.label())
    }
}

impl From<FetchFailure> for Error {
    fn from(f: FetchFailure) -> Self {
        Error::Http {
            status: f.status,
            status_text: f.label().to_string(),
            message: f.message.unwrap_or_default(),
        }
    }
}

/// Side effects the shell performs on behalf of the controller, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEffect {
    Notify(NotificationConfig),
    SetLoading(bool),
    Fetch { ticker: Ticker, url: String },
    PushHistory(HistoryEntry),
    Bind(Value),
    SetInput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Idle,
    Loading { ticker: Ticker, started_ms: u64 },
}

/// Expand the search path template for `ticker`.
///
/// `{}` placeholders are replaced; a template without one gets `/<ticker>` appended.
pub fn search_url(template: &str, ticker: &Ticker) -> String {
    if template.contains("{}") {
        template.replace("{}", ticker.as_str())
    } else {
        format!("{}/{}", template.trim_end_matches('/'), ticker.as_str())
    }
}

pub fn history_path(ticker: &Ticker) -> String {
    format!("/{}", ticker.canonical())
}

/// Ticker named by a page path such as `/AAPL`; `/` and nested paths yield `None`.
pub fn ticker_from_path(path: &str) -> Option<Ticker> {
    let segment = path.trim_matches('/');
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    Ticker::parse(segment).ok()
}

pub fn no_ticker_notification() -> NotificationConfig {
    NotificationConfig::error(
        "No ticker",
        "Provided ticker is empty, please input correct ticker",
    )
    .with_icon("alert-outline")
    .with_id("no_ticker")
}

pub fn invalid_ticker_notification(err: &Error) -> NotificationConfig {
    NotificationConfig::error("Invalid ticker", err.to_string())
        .with_icon("alert-outline")
        .with_id("invalid_ticker")
}

#[derive(Debug, Clone)]
pub struct SearchController {
    search_path: String,
    recent_capacity: usize,
    loading_timeout_ms: u64,
    cookie_max_age_secs: u64,
    state: LoadingState,
}

impl SearchController {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            search_path: config.search_path.clone(),
            recent_capacity: config.recent_capacity,
            loading_timeout_ms: config.loading_timeout_ms,
            cookie_max_age_secs: config.cookie_max_age_secs,
            state: LoadingState::Idle,
        }
    }

    pub fn state(&self) -> &LoadingState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadingState::Loading { .. })
    }

    /// Validate the input and, if it names a ticker, start loading and request it.
    pub fn submit(&mut self, raw: &str, now_ms: u64) -> Vec<SearchEffect> {
        let ticker = match Ticker::parse(raw) {
            Ok(ticker) => ticker,
            Err(Error::EmptyTicker) => return vec![SearchEffect::Notify(no_ticker_notification())],
            Err(err) => return vec![SearchEffect::Notify(invalid_ticker_notification(&err))],
        };
        info!("searching {ticker}");
        let url = search_url(&self.search_path, &ticker);
        self.state = LoadingState::Loading {
            ticker: ticker.clone(),
            started_ms: now_ms,
        };
        vec![
            SearchEffect::SetLoading(true),
            SearchEffect::Fetch { ticker, url },
        ]
    }

    /// Finish a request. Loading always ends, whatever the outcome.
    pub fn complete(
        &mut self,
        ticker: &Ticker,
        outcome: Result<Value, FetchFailure>,
        storage: &mut dyn Storage,
    ) -> Vec<SearchEffect> {
        self.state = LoadingState::Idle;
        let path = history_path(ticker);
        let mut effects = vec![SearchEffect::SetLoading(false)];
        match outcome {
            Ok(data) => {
                effects.push(SearchEffect::PushHistory(HistoryEntry {
                    state: HistoryState::Data { data: data.clone() },
                    path,
                }));
                effects.push(SearchEffect::Bind(data));
                if let Err(err) = self.remember(ticker, storage) {
                    warn!("could not update recent tickers: {err}");
                }
            }
            Err(failure) => {
                warn!("search for {ticker} failed: {} {}", failure.status, failure.label());
                effects.push(SearchEffect::PushHistory(HistoryEntry {
                    state: HistoryState::Ticker {
                        ticker: ticker.to_string(),
                    },
                    path,
                }));
                effects.push(SearchEffect::Notify(failure.notification()));
            }
        }
        effects
    }

    /// Leave the loading state if the request has been outstanding too long.
    pub fn check_timeout(&mut self, now_ms: u64) -> Vec<SearchEffect> {
        match &self.state {
            LoadingState::Loading { started_ms, .. }
                if now_ms.saturating_sub(*started_ms) >= self.loading_timeout_ms =>
            {
                self.state = LoadingState::Idle;
                vec![SearchEffect::SetLoading(false)]
            }
            _ => Vec::new(),
        }
    }

    /// Back/forward navigation: re-render stored data, or search the stored ticker again.
    pub fn restore(&mut self, state: HistoryState, now_ms: u64) -> Vec<SearchEffect> {
        match state {
            HistoryState::Data { data } => {
                let mut effects = Vec::new();
                if let Some(t) = data.get("ticker").and_then(Value::as_str) {
                    effects.push(SearchEffect::SetInput(t.to_string()));
                }
                effects.push(SearchEffect::Bind(data));
                effects
            }
            HistoryState::Ticker { ticker } => {
                let mut effects = vec![SearchEffect::SetInput(ticker.clone())];
                effects.extend(self.submit(&ticker, now_ms));
                effects
            }
        }
    }

    pub fn recent(&self, storage: &dyn Storage) -> TickerList {
        TickerList::recent(self.recent_capacity).load(storage, RECENT_TICKERS_COOKIE)
    }

    fn remember(&self, ticker: &Ticker, storage: &mut dyn Storage) -> crate::error::Result<()> {
        let mut recent = self.recent(storage);
        if recent.push(ticker.clone()) {
            recent.save(storage, RECENT_TICKERS_COOKIE, self.cookie_max_age_secs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn controller() -> SearchController {
        SearchController::new(&DashboardConfig::default())
    }

    fn t(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn empty_submission_only_notifies() {
        let mut c = controller();
        let effects = c.submit("  ", 0);
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            SearchEffect::Notify(n) => assert_eq!(n.id.as_deref(), Some("no_ticker")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!effects
            .iter()
            .any(|e| matches!(e, SearchEffect::Fetch { .. })));
        assert!(!c.is_loading());
    }

    #[test]
    fn invalid_characters_are_rejected_locally() {
        let mut c = controller();
        let effects = c.submit("ES=F", 0);
        assert!(matches!(
            effects.as_slice(),
            [SearchEffect::Notify(n)] if n.id.as_deref() == Some("invalid_ticker")
        ));
    }

    #[test]
    fn submit_enters_loading_and_fetches() {
        let mut c = controller();
        let effects = c.submit("aapl", 42);
        assert_eq!(
            effects,
            vec![
                SearchEffect::SetLoading(true),
                SearchEffect::Fetch {
                    ticker: t("aapl"),
                    url: "/search/aapl".into()
                }
            ]
        );
        assert_eq!(
            c.state(),
            &LoadingState::Loading {
                ticker: t("AAPL"),
                started_ms: 42
            }
        );
    }

    #[test]
    fn success_binds_pushes_history_and_remembers() {
        let mut c = controller();
        let mut store = MemoryStorage::new();
        c.submit("msft", 0);
        let data = json!({"ticker": "MSFT", "eps": {"value": 1, "color": "#fff"}});
        let effects = c.complete(&t("msft"), Ok(data.clone()), &mut store);
        assert_eq!(
            effects,
            vec![
                SearchEffect::SetLoading(false),
                SearchEffect::PushHistory(HistoryEntry {
                    state: HistoryState::Data { data: data.clone() },
                    path: "/MSFT".into()
                }),
                SearchEffect::Bind(data),
            ]
        );
        assert!(!c.is_loading());
        assert_eq!(store.get("recent_tickers").as_deref(), Some(r#"["msft"]"#));
        assert_eq!(store.max_age("recent_tickers"), Some(Some(31_536_000)));
    }

    #[test]
    fn failure_notifies_with_status_text_id() {
        let mut c = controller();
        let mut store = MemoryStorage::new();
        c.submit("zzzz", 0);
        let failure = FetchFailure::from_body(404, "Not Found", r#"{"error": "Ticker not found"}"#);
        let effects = c.complete(&t("zzzz"), Err(failure), &mut store);
        assert_eq!(effects[0], SearchEffect::SetLoading(false));
        assert_eq!(
            effects[1],
            SearchEffect::PushHistory(HistoryEntry {
                state: HistoryState::Ticker {
                    ticker: "zzzz".into()
                },
                path: "/ZZZZ".into()
            })
        );
        match &effects[2] {
            SearchEffect::Notify(n) => {
                assert_eq!(n.id.as_deref(), Some("Not Found"));
                assert_eq!(n.header, "404 Not Found");
                assert_eq!(n.description, "Ticker not found");
                assert_eq!(n.icon.as_deref(), Some("bug-outline"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.get("recent_tickers").is_none());
    }

    #[test]
    fn failure_without_body_or_status_text() {
        let failure = FetchFailure::from_body(502, "", "<html>bad gateway</html>");
        assert_eq!(failure.message, None);
        let n = failure.notification();
        assert_eq!(n.id.as_deref(), Some("error"));
        assert_eq!(n.header, "502 error");
    }

    #[test]
    fn loading_times_out() {
        let mut c = controller();
        c.submit("AAPL", 1_000);
        assert!(c.check_timeout(300_999).is_empty());
        assert_eq!(c.check_timeout(301_000), vec![SearchEffect::SetLoading(false)]);
        assert!(!c.is_loading());
        assert!(c.check_timeout(400_000).is_empty());
    }

    #[test]
    fn history_states_round_trip_through_json() {
        let data: HistoryState = serde_json::from_str(r#"{"data": {"ticker": "A"}}"#).unwrap();
        assert!(matches!(data, HistoryState::Data { .. }));
        let ticker: HistoryState = serde_json::from_str(r#"{"ticker": "A"}"#).unwrap();
        assert_eq!(ticker, HistoryState::Ticker { ticker: "A".into() });
    }

    #[test]
    fn restore_rebinds_or_searches_again() {
        let mut c = controller();
        let data = json!({"ticker": "AAPL", "price": {"value": 1}});
        let effects = c.restore(HistoryState::Data { data: data.clone() }, 0);
        assert_eq!(
            effects,
            vec![
                SearchEffect::SetInput("AAPL".into()),
                SearchEffect::Bind(data)
            ]
        );
        assert!(!c.is_loading());

        let effects = c.restore(HistoryState::Ticker { ticker: "nvda".into() }, 0);
        assert_eq!(effects[0], SearchEffect::SetInput("nvda".into()));
        assert!(matches!(effects[2], SearchEffect::Fetch { .. }));
        assert!(c.is_loading());
    }

    #[test]
    fn urls_and_paths() {
        assert_eq!(search_url("/search/{}", &t("aapl")), "/search/aapl");
        assert_eq!(search_url("/api/value/", &t("aapl")), "/api/value/aapl");
        assert_eq!(history_path(&t("brk.b")), "/BRK.B");
        assert_eq!(ticker_from_path("/AAPL"), Some(t("aapl")));
        assert_eq!(ticker_from_path("/"), None);
        assert_eq!(ticker_from_path("/static/app.js"), None);
    }
}
