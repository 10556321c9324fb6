use std::rc::Rc;

use mos_core::search::{invalid_ticker_notification, no_ticker_notification, search_url};
use mos_core::{Error, FavouriteCard, Ticker, Widget, WidgetEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

use crate::page::{create, icon};
use crate::search::fetch_json;
use crate::shell::{run_effects, Shell};

type Listener = Closure<dyn FnMut(Event)>;

/// A favourite card on the page.
pub struct CardView {
    card: FavouriteCard,
    root: Element,
    title: Element,
    subtitle: Element,
    _listeners: Vec<Listener>,
}

impl CardView {
    fn paint(&self) {
        let rendered = self.card.render();
        self.root.set_class_name(rendered.class);
        self.title.set_text_content(Some(&rendered.text));
        self.subtitle
            .set_text_content(Some(rendered.subtitle.as_deref().unwrap_or_default()));
    }
}

fn container(shell: &Shell) -> Option<Element> {
    shell.element(&shell.config.ids.favourites_container)
}

/// Render every stored favourite and hook up the add button.
pub fn wire(shell: &Rc<Shell>) -> Result<(), JsValue> {
    if container(shell).is_none() {
        log::debug!("no #{}, favourites hidden", shell.config.ids.favourites_container);
        return Ok(());
    }
    let cards = shell.favourites.borrow().cards();
    for card in cards {
        insert(shell, card)?;
    }

    if let Some(button) = shell.element(&shell.config.ids.favourite_button) {
        let s = shell.clone();
        let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            ev.prevent_default();
            let raw = s
                .element(&s.config.ids.symbol_input)
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            if let Err(err) = add(&s, &raw) {
                web_sys::console::error_1(&err);
            }
        });
        button.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }
    Ok(())
}

/// Track `raw`; an already tracked ticker is left alone.
pub fn add(shell: &Rc<Shell>, raw: &str) -> Result<(), JsValue> {
    let ticker = match Ticker::parse(raw) {
        Ok(ticker) => ticker,
        Err(Error::EmptyTicker) => {
            shell.notifications.add(no_ticker_notification());
            return Ok(());
        }
        Err(err) => {
            shell.notifications.add(invalid_ticker_notification(&err));
            return Ok(());
        }
    };
    let card = shell
        .favourites
        .borrow_mut()
        .favourite(&mut *shell.cookies.borrow_mut(), ticker)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    match card {
        Some(card) => insert(shell, card),
        None => Ok(()),
    }
}

pub fn remove(shell: &Rc<Shell>, ticker: &Ticker) -> Result<(), JsValue> {
    shell
        .favourites
        .borrow_mut()
        .delete(&mut *shell.cookies.borrow_mut(), ticker)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut cards = shell.cards.borrow_mut();
    if let Some(pos) = cards.iter().position(|view| view.card.ticker() == ticker) {
        let view = cards.remove(pos);
        view.root.remove();
    }
    Ok(())
}

fn insert(shell: &Rc<Shell>, card: FavouriteCard) -> Result<(), JsValue> {
    let Some(container) = container(shell) else {
        return Ok(());
    };
    let doc = &shell.doc;
    let ticker = card.ticker().clone();
    let root = create(doc, "div", "favourite", None)?;
    root.set_attribute("data-ticker", &ticker.canonical())?;
    let title = create(doc, "span", "ticker", None)?;
    let subtitle = create(doc, "span", "subtitle", None)?;
    let delete = create(doc, "button", "delete", None)?;
    delete.append_child(&icon(doc, "trash-outline")?)?;
    root.append_child(&title)?;
    root.append_child(&subtitle)?;
    root.append_child(&delete)?;

    let s = shell.clone();
    let t = ticker.clone();
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
        dispatch(&s, &t, WidgetEvent::Click);
    });
    root.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    let s = shell.clone();
    let t = ticker.clone();
    let on_delete = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        ev.stop_propagation();
        dispatch(&s, &t, WidgetEvent::Delete);
    });
    delete.add_event_listener_with_callback("click", on_delete.as_ref().unchecked_ref())?;

    container.append_child(&root)?;
    let view = CardView {
        card,
        root,
        title,
        subtitle,
        _listeners: vec![on_click, on_delete],
    };
    view.paint();
    shell.cards.borrow_mut().push(view);
    load(shell, ticker);
    Ok(())
}

/// Feed `event` to the card for `ticker`, then act on what it asks for.
fn dispatch(shell: &Rc<Shell>, ticker: &Ticker, event: WidgetEvent) {
    let effects = {
        let mut cards = shell.cards.borrow_mut();
        let Some(view) = cards.iter_mut().find(|view| view.card.ticker() == ticker) else {
            return;
        };
        let effects = view.card.on_event(&event);
        view.paint();
        effects
    };
    run_effects(shell, effects);
}

fn load(shell: &Rc<Shell>, ticker: Ticker) {
    let shell = shell.clone();
    let url = search_url(&shell.config.search_path, &ticker);
    spawn_local(async move {
        let outcome = fetch_json(&url)
            .await
            .map_err(|f| f.message.clone().unwrap_or_else(|| f.label().to_string()));
        dispatch(&shell, &ticker, WidgetEvent::Loaded(outcome));
    });
}
