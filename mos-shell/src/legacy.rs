use std::rc::Rc;

use gloo_net::http::Request;
use mos_core::legacy::{error_toast, handle_response};
use mos_core::{Error, Ticker};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlInputElement};

use crate::shell::Shell;

async fn post(path: &str, ticker: &Ticker) -> Result<String, Error> {
    let body = format!(
        "ticker={}",
        String::from(js_sys::encode_uri_component(ticker.as_str()))
    );
    let request = Request::post(path)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .map_err(|e| Error::Legacy(e.to_string()))?;
    let resp = request
        .send()
        .await
        .map_err(|e| Error::Legacy(e.to_string()))?;
    let text = resp.text().await.map_err(|e| Error::Legacy(e.to_string()))?;
    if !resp.ok() {
        return Err(Error::Http {
            status: resp.status(),
            status_text: resp.status_text(),
            message: text,
        });
    }
    Ok(text)
}

fn lookup(shell: &Rc<Shell>, ticker: Ticker) {
    let shell = shell.clone();
    spawn_local(async move {
        let outcome = match post(&shell.config.legacy_path, &ticker).await {
            Ok(body) => handle_response(&body, &mut *shell.page.borrow_mut(), &shell.config),
            Err(err) => Err(error_toast(&err, &shell.config)),
        };
        match outcome {
            Ok(report) => log::debug!("{ticker}: {} cells filled", report.applied.len()),
            Err(toast) => shell.notifications.add(toast),
        }
    });
}

/// The older page posts its form instead of calling the search endpoint.
pub fn wire(shell: &Rc<Shell>) -> Result<(), JsValue> {
    let Some(form) = shell.element(&shell.config.ids.legacy_form) else {
        return Ok(());
    };
    let s = shell.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        ev.prevent_default();
        let raw = s
            .element(&s.config.ids.legacy_input)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        match Ticker::parse(&raw) {
            Ok(ticker) => lookup(&s, ticker),
            Err(err) => log::debug!("legacy search skipped: {err}"),
        }
    });
    form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}
