use std::cell::RefCell;
use std::rc::Rc;

use mos_core::widgets::{InfoWidget, LinkWidget, MapLinkWidget};
use mos_core::{
    DashboardConfig, Effect, Favourites, NotificationQueue, SearchController, Widget, WidgetEvent,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::favourites::{self, CardView};
use crate::notifications::NotificationCenter;
use crate::page::{open_in_new_tab, DomPage};
use crate::search;
use crate::storage::CookieStorage;

/// Everything the event handlers share. Lives for the page's lifetime.
pub struct Shell {
    pub config: DashboardConfig,
    pub doc: Document,
    pub page: RefCell<DomPage>,
    pub cookies: RefCell<CookieStorage>,
    pub notifications: Rc<NotificationCenter>,
    pub controller: RefCell<SearchController>,
    pub favourites: RefCell<Favourites>,
    pub cards: RefCell<Vec<CardView>>,
}

impl Shell {
    pub fn new(doc: Document, config: DashboardConfig) -> Result<Rc<Self>, JsValue> {
        let cookies = CookieStorage::new(&doc).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let container = match doc.get_element_by_id(&config.ids.notification_container) {
            Some(el) => el,
            None => {
                log::warn!(
                    "#{} missing, notifications go to <body>",
                    config.ids.notification_container
                );
                doc.body()
                    .ok_or_else(|| JsValue::from_str("no body"))?
                    .into()
            }
        };
        let notifications =
            NotificationCenter::new(doc.clone(), container, NotificationQueue::from_config(&config));
        let favourites = Favourites::load(&cookies, &config);
        Ok(Rc::new(Self {
            controller: RefCell::new(SearchController::new(&config)),
            favourites: RefCell::new(favourites),
            page: RefCell::new(DomPage::new(doc.clone())),
            cookies: RefCell::new(cookies),
            cards: RefCell::new(Vec::new()),
            notifications,
            config,
            doc,
        }))
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.doc.get_element_by_id(id)
    }
}

/// Carry out what a widget asked for.
pub fn run_effects(shell: &Rc<Shell>, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::OpenUrl(url) => open_in_new_tab(&url),
            Effect::Notify(config) => shell.notifications.add(config),
            Effect::Search(ticker) => search::search(shell, ticker.as_str()),
            Effect::RemoveFavourite(ticker) => {
                if let Err(err) = favourites::remove(shell, &ticker) {
                    web_sys::console::error_1(&err);
                }
            }
        }
    }
}

fn attr(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(name)
}

/// Rebuild the widget behind a bound element from its data attributes.
fn widget_for(el: &Element) -> Option<Box<dyn Widget>> {
    match el.tag_name().to_ascii_lowercase().as_str() {
        "link-value" => Some(Box::new(LinkWidget::new(attr(el, "data-url")))),
        "map-value" => Some(Box::new(MapLinkWidget::new(attr(el, "data-location")))),
        "popup-info" => Some(Box::new(InfoWidget {
            title: attr(el, "data-title"),
            info: attr(el, "data-info").or_else(|| el.text_content()),
            icon: attr(el, "data-icon"),
        })),
        _ => None,
    }
}

/// One delegated click listener for every link, map and info element.
pub fn wire_widgets(shell: &Rc<Shell>) -> Result<(), JsValue> {
    let s = shell.clone();
    let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(el)) = target.closest("link-value, map-value, popup-info") else {
            return;
        };
        if let Some(mut widget) = widget_for(&el) {
            let effects = widget.on_event(&WidgetEvent::Click);
            run_effects(&s, effects);
        }
    });
    shell
        .doc
        .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}
