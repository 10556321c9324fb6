pub const RECENT_TICKERS_COOKIE: &str = "recent_tickers";
pub const FAVOURITE_TICKERS_COOKIE: &str = "favourite-tickers";
pub const COLOR_THEME_COOKIE: &str = "color-theme";
pub const SIDEBAR_EXPAND_KEY: &str = "sidebar-expand";

/// One year, the lifetime of every persisted ticker list and the theme cookie.
pub const ONE_YEAR_SECS: u64 = 31_536_000;

const DEFAULT_SEARCH_PATH: &str = "/search/{}";
const DEFAULT_LEGACY_PATH: &str = "/";

/// Ids of the fixed page elements the shell wires up.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementIds {
    pub search_form: String,
    pub symbol_input: String,
    pub submit_button: String,
    pub notification_container: String,
    pub clear_notifications: String,
    pub scheme_cycler: String,
    pub favourites_container: String,
    pub favourite_button: String,
    pub sidebar: String,
    pub sidebar_toggle: String,
    pub legacy_form: String,
    pub legacy_input: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            search_form: "search-form".into(),
            symbol_input: "symbol-input".into(),
            // Spelled the way the served page spells it.
            submit_button: "sumbit-ticker".into(),
            notification_container: "notification-container".into(),
            clear_notifications: "clear-notifications".into(),
            scheme_cycler: "scheme-cycler".into(),
            favourites_container: "favourites-container".into(),
            favourite_button: "favourite-ticker".into(),
            sidebar: "sidebar".into(),
            sidebar_toggle: "sidebar-toggle".into(),
            legacy_form: "searchboxform".into(),
            legacy_input: "ticker".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Request path template; `{}` is replaced by the ticker.
    pub search_path: String,
    pub legacy_path: String,
    pub recent_capacity: usize,
    pub notification_capacity: usize,
    pub notification_delay_ms: u64,
    pub notification_fade_ms: u64,
    pub legacy_toast_ms: u64,
    pub loading_timeout_ms: u64,
    pub cookie_max_age_secs: u64,
    pub ids: ElementIds,
}

impl DashboardConfig {
    pub fn new(search_path: impl Into<String>) -> Self {
        Self {
            search_path: search_path.into(),
            ..Self::default()
        }
    }

    pub fn with_legacy_path(mut self, path: impl Into<String>) -> Self {
        self.legacy_path = path.into();
        self
    }

    pub fn with_recent_capacity(mut self, capacity: usize) -> Self {
        self.recent_capacity = capacity.max(1);
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity.max(1);
        self
    }

    pub fn with_notification_timing(mut self, delay_ms: u64, fade_ms: u64) -> Self {
        self.notification_delay_ms = delay_ms;
        self.notification_fade_ms = fade_ms;
        self
    }

    pub fn with_loading_timeout(mut self, timeout_ms: u64) -> Self {
        self.loading_timeout_ms = timeout_ms;
        self
    }

    pub fn with_ids(mut self, ids: ElementIds) -> Self {
        self.ids = ids;
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            legacy_path: DEFAULT_LEGACY_PATH.to_string(),
            recent_capacity: 5,
            notification_capacity: 8,
            notification_delay_ms: 10_000,
            notification_fade_ms: 1_000,
            legacy_toast_ms: 3_500,
            loading_timeout_ms: 300_000,
            cookie_max_age_secs: ONE_YEAR_SECS,
            ids: ElementIds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_capacities() {
        let cfg = DashboardConfig::new("/api/{}")
            .with_recent_capacity(0)
            .with_notification_capacity(0)
            .with_notification_timing(500, 100);
        assert_eq!(cfg.search_path, "/api/{}");
        assert_eq!(cfg.recent_capacity, 1);
        assert_eq!(cfg.notification_capacity, 1);
        assert_eq!(cfg.notification_delay_ms, 500);
        assert_eq!(cfg.loading_timeout_ms, 300_000);
        assert_eq!(cfg.ids.submit_button, "sumbit-ticker");
    }
}
