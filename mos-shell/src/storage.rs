use js_sys::{decode_uri_component, encode_uri_component};
use mos_core::storage::{cookie_assignment, cookie_expiry, cookie_lookup, Storage};
use mos_core::{Error, Result};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlDocument};

fn js_error(err: wasm_bindgen::JsValue) -> Error {
    Error::Storage(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// `document.cookie`, with URI-component encoded values.
#[derive(Clone)]
pub struct CookieStorage {
    doc: HtmlDocument,
}

impl CookieStorage {
    pub fn new(doc: &Document) -> Result<Self> {
        let doc = doc
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| Error::Storage("document has no cookie jar".into()))?;
        Ok(Self { doc })
    }
}

impl Storage for CookieStorage {
    fn get(&self, name: &str) -> Option<String> {
        let header = self.doc.cookie().ok()?;
        let raw = cookie_lookup(&header, name)?;
        decode_uri_component(raw).ok().map(String::from)
    }

    fn set(&mut self, name: &str, value: &str, max_age_secs: Option<u64>) -> Result<()> {
        let encoded = String::from(encode_uri_component(value));
        self.doc
            .set_cookie(&cookie_assignment(name, &encoded, max_age_secs))
            .map_err(js_error)
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.doc.set_cookie(&cookie_expiry(name)).map_err(js_error)
    }
}

/// `window.localStorage`; entries never expire, so `max_age_secs` is ignored.
#[derive(Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Storage("no window".into()))?;
        let inner = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| Error::Storage("localStorage unavailable".into()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.get_item(name).ok().flatten()
    }

    fn set(&mut self, name: &str, value: &str, _max_age_secs: Option<u64>) -> Result<()> {
        self.inner.set_item(name, value).map_err(js_error)
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.inner.remove_item(name).map_err(js_error)
    }
}
