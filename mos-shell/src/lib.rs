//! Browser shell for the margin-of-safety dashboard.
//!
//! Binds the rules in `mos-core` to the server-rendered page: cookies, DOM
//! elements, history, timers and fetches. Everything here is wasm-only.

#[cfg(target_arch = "wasm32")]
mod config;
#[cfg(target_arch = "wasm32")]
mod favourites;
#[cfg(target_arch = "wasm32")]
mod legacy;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod notifications;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod search;
#[cfg(target_arch = "wasm32")]
mod shell;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod theme;

#[cfg(target_arch = "wasm32")]
pub use storage::{CookieStorage, LocalStorage};

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use mos_core::{load_values, NotificationConfig, Schema};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

/// The page's dashboard. Construct once after the DOM is ready.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct Dashboard {
    shell: Rc<shell::Shell>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Dashboard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Dashboard, JsValue> {
        let doc = page::document()?;
        let config = config::from_globals(&doc);
        log::info!("dashboard searching {}", config.search_path);
        let shell = shell::Shell::new(doc, config)?;

        theme::wire(&shell)?;
        shell::wire_widgets(&shell)?;
        favourites::wire(&shell)?;
        legacy::wire(&shell)?;
        wire_clear_button(&shell)?;
        // Last: it may start a search for the ticker in the address bar.
        search::wire(&shell)?;
        Ok(Dashboard { shell })
    }

    /// Search for `ticker` as if it had been typed and submitted.
    #[wasm_bindgen]
    pub fn search(&self, ticker: &str) {
        search::search(&self.shell, ticker);
    }

    #[wasm_bindgen]
    pub fn is_loading(&self) -> bool {
        self.shell.controller.borrow().is_loading()
    }

    /// Tickers searched most recently first, as JSON.
    #[wasm_bindgen]
    pub fn recent_json(&self) -> Result<String, JsValue> {
        let recent = self
            .shell
            .controller
            .borrow()
            .recent(&*self.shell.cookies.borrow());
        serde_json::to_string(recent.as_slice()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn favourite(&self, ticker: &str) -> Result<(), JsValue> {
        favourites::add(&self.shell, ticker)
    }

    #[wasm_bindgen]
    pub fn unfavourite(&self, ticker: &str) -> Result<(), JsValue> {
        let ticker =
            mos_core::Ticker::parse(ticker).map_err(|e| JsValue::from_str(&e.to_string()))?;
        favourites::remove(&self.shell, &ticker)
    }

    /// Show a notification described by `config_json`
    /// (`{id, header, icon, description, type, size, time_ms}`, all optional).
    #[wasm_bindgen]
    pub fn notify(&self, config_json: &str) -> Result<(), JsValue> {
        let config: NotificationConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.shell.notifications.add(config);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn notification_count(&self) -> usize {
        self.shell.notifications.len()
    }

    #[wasm_bindgen]
    pub fn clear_notifications(&self) {
        self.shell.notifications.remove_all();
    }

    /// Advance the colour scheme; returns the new scheme name.
    #[wasm_bindgen]
    pub fn cycle_theme(&self) -> Result<String, JsValue> {
        theme::cycle(&self.shell).map(|scheme| scheme.to_string())
    }

    /// Declared element ids the page lacks, as a JSON array.
    ///
    /// `schema_json` is a list of `[field, renderer]` pairs, e.g.
    /// `[["eps", {"list": 5}], ["name", "text"]]`.
    #[wasm_bindgen]
    pub fn check_schema(&self, schema_json: &str) -> Result<String, JsValue> {
        let schema = Schema::from_json(schema_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let missing = schema.missing_targets(&*self.shell.page.borrow());
        for id in &missing {
            log::warn!("schema declares #{id} but the page has no such element");
        }
        serde_json::to_string(&missing).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Mismatches between a response and the schema, as a JSON array.
    #[wasm_bindgen]
    pub fn check_response(&self, schema_json: &str, data_json: &str) -> Result<String, JsValue> {
        let schema = Schema::from_json(schema_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let data: serde_json::Value =
            serde_json::from_str(data_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let issues = schema.check(&data);
        if !issues.is_empty() {
            log::debug!("response differs from schema: {issues:?}");
        }
        serde_json::to_string(&issues).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Bind a valuation object into the page; returns how many elements were written.
    #[wasm_bindgen]
    pub fn load_values(&self, data_json: &str) -> Result<usize, JsValue> {
        let data: serde_json::Value =
            serde_json::from_str(data_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let report = load_values(&data, &mut *self.shell.page.borrow_mut());
        Ok(report.applied.len())
    }
}

#[cfg(target_arch = "wasm32")]
fn wire_clear_button(shell: &Rc<shell::Shell>) -> Result<(), JsValue> {
    use wasm_bindgen::JsCast;

    let Some(button) = shell.element(&shell.config.ids.clear_notifications) else {
        return Ok(());
    };
    let notifications = shell.notifications.clone();
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        notifications.remove_all();
    });
    button.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}
