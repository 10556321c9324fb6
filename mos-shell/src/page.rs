use js_sys::Date;
use mos_core::binder::{BindTarget, Binding, Content};
use mos_core::format::format_text;
use mos_core::widgets::{LinkWidget, MapLinkWidget, Widget};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

pub fn now_ms() -> u64 {
    Date::now() as u64
}

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Create `<tag class=...>` with optional text.
pub fn create(doc: &Document, tag: &str, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
    let el = doc.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    if let Some(text) = text {
        el.set_text_content(Some(text));
    }
    Ok(el)
}

pub fn icon(doc: &Document, name: &str) -> Result<Element, JsValue> {
    let el = doc.create_element("ion-icon")?;
    el.set_attribute("name", name)?;
    Ok(el)
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

pub fn open_in_new_tab(url: &str) {
    match window().and_then(|w| w.open_with_url_and_target(url, "_blank")) {
        Ok(Some(tab)) => {
            let _ = tab.focus();
        }
        Ok(None) => log::warn!("popup blocked for {url}"),
        Err(err) => web_sys::console::error_1(&err),
    }
}

/// The live document as a binding target.
#[derive(Clone)]
pub struct DomPage {
    doc: Document,
}

impl DomPage {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }
}

impl BindTarget for DomPage {
    fn contains(&self, id: &str) -> bool {
        self.doc.get_element_by_id(id).is_some()
    }

    fn apply(&mut self, binding: &Binding) {
        let Some(el) = self.doc.get_element_by_id(&binding.id) else {
            return;
        };
        match &binding.content {
            Content::Display { value, color } => {
                let _ = el.set_attribute("data-value", value);
                el.set_text_content(Some(value));
                match color {
                    Some(color) => {
                        let _ = el.set_attribute("data-color", color);
                        set_style(&el, "color", color);
                    }
                    None => {
                        let _ = el.remove_attribute("data-color");
                    }
                }
            }
            Content::Text(text) => {
                let raw = text.clone();
                let shown = match el.tag_name().to_ascii_lowercase().as_str() {
                    "link-value" => {
                        let _ = el.set_attribute("data-url", raw.as_deref().unwrap_or_default());
                        LinkWidget::new(raw).render().text
                    }
                    "map-value" => {
                        let _ = el.set_attribute("data-location", raw.as_deref().unwrap_or_default());
                        MapLinkWidget::new(raw).render().text
                    }
                    _ => {
                        let _ = el.set_attribute("data-text", raw.as_deref().unwrap_or_default());
                        format_text(raw.as_deref())
                    }
                };
                el.set_text_content(Some(&shown));
            }
            Content::Shaded { text, background } => {
                el.set_text_content(Some(text));
                set_style(&el, "background-color", background);
            }
        }
    }
}
