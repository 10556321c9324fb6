use js_sys::Reflect;
use mos_core::DashboardConfig;
use wasm_bindgen::JsValue;
use web_sys::Document;

fn read_global(key: &str) -> Option<String> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
        .filter(|v| !v.trim().is_empty())
}

/// Defaults, overridden by page globals and then the search form's `action`.
pub fn from_globals(doc: &Document) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    let form_action = doc
        .get_element_by_id(&config.ids.search_form)
        .and_then(|form| form.get_attribute("action"))
        .filter(|action| !action.trim().is_empty());
    if let Some(path) = read_global("MOS_SEARCH_PATH").or(form_action) {
        config.search_path = path;
    }
    if let Some(path) = read_global("MOS_LEGACY_PATH") {
        config = config.with_legacy_path(path);
    }
    config
}
