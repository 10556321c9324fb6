use std::rc::Rc;

use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use mos_core::search::{ticker_from_path, HistoryEntry};
use mos_core::ticker::is_ticker_char;
use mos_core::{load_values, FetchFailure, HistoryState, SearchEffect, Ticker};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlButtonElement, HtmlInputElement, KeyboardEvent, PopStateEvent};

use crate::page::{now_ms, window};
use crate::shell::Shell;

const IDLE_ICON: &str = "arrow-forward-outline";
const LOADING_ICON: &str = "sync-outline";

fn input(shell: &Shell) -> Option<HtmlInputElement> {
    shell
        .element(&shell.config.ids.symbol_input)
        .and_then(|el| el.dyn_into().ok())
}

/// Submit `raw` as if typed into the search box.
pub fn search(shell: &Rc<Shell>, raw: &str) {
    if let Some(input) = input(shell) {
        input.set_value(raw);
    }
    let effects = shell.controller.borrow_mut().submit(raw, now_ms());
    run(shell, effects);
}

fn submit_input(shell: &Rc<Shell>) {
    let raw = input(shell).map(|i| i.value()).unwrap_or_default();
    let effects = shell.controller.borrow_mut().submit(&raw, now_ms());
    run(shell, effects);
}

pub fn run(shell: &Rc<Shell>, effects: Vec<SearchEffect>) {
    for effect in effects {
        match effect {
            SearchEffect::Notify(config) => shell.notifications.add(config),
            SearchEffect::SetLoading(on) => set_loading(shell, on),
            SearchEffect::Fetch { ticker, url } => fetch(shell, ticker, url),
            SearchEffect::PushHistory(entry) => {
                if let Err(err) = push_history(&entry) {
                    web_sys::console::error_1(&err);
                }
            }
            SearchEffect::Bind(data) => {
                let report = load_values(&data, &mut *shell.page.borrow_mut());
                if !report.is_clean() {
                    log::debug!("unbound fields: {:?}", report.skipped);
                }
            }
            SearchEffect::SetInput(text) => {
                if let Some(input) = input(shell) {
                    input.set_value(&text);
                }
            }
        }
    }
}

fn set_loading(shell: &Rc<Shell>, on: bool) {
    let ids = &shell.config.ids;
    if let Some(input) = input(shell) {
        input.set_disabled(on);
    }
    if let Some(button) = shell
        .element(&ids.submit_button)
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    {
        button.set_disabled(on);
        let _ = button.class_list().toggle_with_force("loading", on);
        if let Ok(Some(icon)) = button.query_selector("ion-icon") {
            let _ = icon.set_attribute("name", if on { LOADING_ICON } else { IDLE_ICON });
        }
    }
    if on {
        let shell = shell.clone();
        let timeout = shell.config.loading_timeout_ms.min(u32::MAX as u64) as u32;
        spawn_local(async move {
            TimeoutFuture::new(timeout).await;
            let effects = shell.controller.borrow_mut().check_timeout(now_ms());
            run(&shell, effects);
        });
    }
}

pub(crate) async fn fetch_json(url: &str) -> Result<Value, FetchFailure> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchFailure::network(e.to_string()))?;
    let body = resp
        .text()
        .await
        .map_err(|e| FetchFailure::network(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchFailure::from_body(resp.status(), resp.status_text(), &body));
    }
    serde_json::from_str(&body).map_err(|e| FetchFailure::network(e.to_string()))
}

fn fetch(shell: &Rc<Shell>, ticker: Ticker, url: String) {
    let shell = shell.clone();
    spawn_local(async move {
        let outcome = fetch_json(&url).await;
        let effects = shell.controller.borrow_mut().complete(
            &ticker,
            outcome,
            &mut *shell.cookies.borrow_mut(),
        );
        run(&shell, effects);
    });
}

fn push_history(entry: &HistoryEntry) -> Result<(), JsValue> {
    let json = serde_json::to_string(&entry.state).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let state = js_sys::JSON::parse(&json)?;
    window()?
        .history()?
        .push_state_with_url(&state, "", Some(&entry.path))
}

fn restore(shell: &Rc<Shell>, ev: &PopStateEvent) -> Result<(), JsValue> {
    let state = ev.state();
    if state.is_null() || state.is_undefined() {
        return Ok(());
    }
    let json: String = js_sys::JSON::stringify(&state)?.into();
    let state: HistoryState =
        serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let effects = shell.controller.borrow_mut().restore(state, now_ms());
    run(shell, effects);
    Ok(())
}

/// Form submit, the input key filter, back/forward and the initial `/<TICKER>` load.
pub fn wire(shell: &Rc<Shell>) -> Result<(), JsValue> {
    let ids = &shell.config.ids;
    match shell.element(&ids.search_form) {
        Some(form) => {
            let s = shell.clone();
            let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
                ev.prevent_default();
                submit_input(&s);
            });
            form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
            cb.forget();
        }
        None => log::debug!("no #{}, search only through the API", ids.search_form),
    }

    if let Some(input) = input(shell) {
        let cb = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
            let key = ev.key();
            let mut chars = key.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                if !ev.ctrl_key() && !ev.meta_key() && !is_ticker_char(ch) {
                    ev.prevent_default();
                }
            }
        });
        input.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    let win = window()?;
    let s = shell.clone();
    let cb = Closure::<dyn FnMut(PopStateEvent)>::new(move |ev: PopStateEvent| {
        if let Err(err) = restore(&s, &ev) {
            web_sys::console::error_1(&err);
        }
    });
    win.add_event_listener_with_callback("popstate", cb.as_ref().unchecked_ref())?;
    cb.forget();

    if let Some(ticker) = ticker_from_path(&win.location().pathname()?) {
        log::info!("loading {ticker} from the address bar");
        search(shell, ticker.as_str());
    }
    Ok(())
}
