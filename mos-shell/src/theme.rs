use std::rc::Rc;

use mos_core::theme::{sidebar_expanded, toggle_sidebar};
use mos_core::ColorScheme;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Event;

use crate::shell::Shell;
use crate::storage::LocalStorage;

fn apply_scheme(shell: &Shell, scheme: ColorScheme) {
    if let Some(html) = shell.doc.document_element() {
        let classes = html.class_list();
        for other in ColorScheme::ORDER {
            if let Some(class) = other.html_class() {
                let _ = classes.remove_1(class);
            }
        }
        if let Some(class) = scheme.html_class() {
            let _ = classes.add_1(class);
        }
    }
    if let Some(Ok(Some(icon))) = shell
        .element(&shell.config.ids.scheme_cycler)
        .map(|cycler| cycler.query_selector("ion-icon"))
    {
        let _ = icon.set_attribute("name", scheme.icon());
    }
}

/// Move to the next colour scheme and show it.
pub fn cycle(shell: &Shell) -> Result<ColorScheme, JsValue> {
    let scheme = ColorScheme::cycle(
        &mut *shell.cookies.borrow_mut(),
        shell.config.cookie_max_age_secs,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    apply_scheme(shell, scheme);
    log::debug!("colour scheme {scheme}");
    Ok(scheme)
}

fn apply_sidebar(shell: &Shell, expanded: bool) {
    if let Some(sidebar) = shell.element(&shell.config.ids.sidebar) {
        let _ = sidebar.class_list().toggle_with_force("collapsed", !expanded);
    }
}

pub fn wire(shell: &Rc<Shell>) -> Result<(), JsValue> {
    let scheme = ColorScheme::load(
        &mut *shell.cookies.borrow_mut(),
        shell.config.cookie_max_age_secs,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    apply_scheme(shell, scheme);

    if let Some(cycler) = shell.element(&shell.config.ids.scheme_cycler) {
        let s = shell.clone();
        let cb = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
            if let Err(err) = cycle(&s) {
                web_sys::console::error_1(&err);
            }
        });
        cycler.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    let local = match LocalStorage::open() {
        Ok(local) => local,
        Err(err) => {
            log::warn!("sidebar state not persisted: {err}");
            return Ok(());
        }
    };
    apply_sidebar(shell, sidebar_expanded(&local));
    if let Some(toggle) = shell.element(&shell.config.ids.sidebar_toggle) {
        let s = shell.clone();
        let mut local = local;
        let cb = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| match toggle_sidebar(&mut local) {
            Ok(expanded) => apply_sidebar(&s, expanded),
            Err(err) => log::error!("sidebar toggle failed: {err}"),
        });
        toggle.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }
    Ok(())
}
