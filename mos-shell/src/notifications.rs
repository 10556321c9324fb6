use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use mos_core::notification::{NotificationKey, NotificationSize};
use mos_core::{NotificationConfig, NotificationQueue, QueueEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::page::{create, icon, now_ms, set_style};

type Listener = Closure<dyn FnMut(Event)>;

/// DOM side of one queued record. Dropping it cancels its timer and listeners.
struct View {
    root: Element,
    counter: Element,
    timer: Option<Timeout>,
    _listeners: Vec<Listener>,
}

/// Renders the notification queue into `#notification-container`.
pub struct NotificationCenter {
    doc: Document,
    container: Element,
    queue: RefCell<NotificationQueue>,
    views: RefCell<HashMap<NotificationKey, View>>,
}

impl NotificationCenter {
    pub fn new(doc: Document, container: Element, queue: NotificationQueue) -> Rc<Self> {
        Rc::new(Self {
            doc,
            container,
            queue: RefCell::new(queue),
            views: RefCell::new(HashMap::new()),
        })
    }

    pub fn add(self: &Rc<Self>, config: NotificationConfig) {
        let events = self.queue.borrow_mut().add(config, now_ms());
        self.apply(events);
    }

    pub fn touch(self: &Rc<Self>, key: NotificationKey) {
        let event = self.queue.borrow_mut().touch(key, now_ms());
        self.apply(event.into_iter().collect());
    }

    pub fn dismiss(self: &Rc<Self>, key: NotificationKey) {
        let removed = self.queue.borrow_mut().dismiss(key);
        if removed.is_some() {
            self.apply(vec![QueueEvent::Removed(key)]);
        }
    }

    pub fn remove_all(self: &Rc<Self>) {
        let keys = self.queue.borrow_mut().remove_all();
        self.apply(keys.into_iter().map(QueueEvent::Removed).collect());
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn tick(self: &Rc<Self>) {
        let (events, pending) = {
            let mut queue = self.queue.borrow_mut();
            let events = queue.tick(now_ms());
            let pending = queue.pending(&events);
            (events, pending)
        };
        self.apply(events);
        // A timer that fired early has been spent; arm a fresh one.
        for key in pending {
            self.schedule(key);
        }
    }

    fn apply(self: &Rc<Self>, events: Vec<QueueEvent>) {
        for event in events {
            match event {
                QueueEvent::Created(key) => {
                    if let Err(err) = self.render(key) {
                        web_sys::console::error_1(&err);
                        continue;
                    }
                    self.schedule(key);
                }
                QueueEvent::Counted { key, counter } => {
                    if let Some(view) = self.views.borrow().get(&key) {
                        view.counter.set_text_content(Some(&counter.to_string()));
                        view.counter.set_class_name("counter");
                        set_style(&view.root, "opacity", "1");
                    }
                    self.schedule(key);
                }
                QueueEvent::Refreshed(key) => {
                    if let Some(view) = self.views.borrow().get(&key) {
                        set_style(&view.root, "opacity", "1");
                    }
                    self.schedule(key);
                }
                QueueEvent::Fading(key) => {
                    if let Some(view) = self.views.borrow().get(&key) {
                        let fade = self.queue.borrow().fade_ms();
                        set_style(&view.root, "transition", &format!("opacity {fade}ms"));
                        set_style(&view.root, "opacity", "0");
                    }
                    self.schedule(key);
                }
                QueueEvent::Removed(key) => {
                    if let Some(view) = self.views.borrow_mut().remove(&key) {
                        view.root.remove();
                    }
                }
            }
        }
    }

    /// Re-arm the record's single timer for its current deadline.
    fn schedule(self: &Rc<Self>, key: NotificationKey) {
        let Some(deadline) = self.queue.borrow().get(key).map(|r| r.deadline_ms()) else {
            return;
        };
        let delay = deadline.saturating_sub(now_ms()).min(u32::MAX as u64) as u32;
        let weak: Weak<Self> = Rc::downgrade(self);
        let timer = Timeout::new(delay, move || {
            if let Some(center) = weak.upgrade() {
                center.tick();
            }
        });
        if let Some(view) = self.views.borrow_mut().get_mut(&key) {
            view.timer = Some(timer);
        }
    }

    fn render(self: &Rc<Self>, key: NotificationKey) -> Result<(), JsValue> {
        let config = match self.queue.borrow().get(key) {
            Some(record) => record.config().clone(),
            None => return Ok(()),
        };
        let size = match config.size {
            NotificationSize::Large => "large",
            NotificationSize::Small => "small",
        };
        let root = create(
            &self.doc,
            "div",
            &format!("notification {}", config.kind.as_str()),
            None,
        )?;
        root.set_attribute("data-size", size)?;
        if let Some(id) = &config.id {
            root.set_attribute("data-id", id)?;
        }

        let header = create(&self.doc, "div", "notification-header", None)?;
        if let Some(name) = &config.icon {
            header.append_child(&icon(&self.doc, name)?)?;
        }
        header.append_child(&create(&self.doc, "span", "heading", Some(&config.header))?)?;
        let counter = create(&self.doc, "span", "counter void", None)?;
        header.append_child(&counter)?;
        let close = create(&self.doc, "button", "clear-button", None)?;
        close.append_child(&icon(&self.doc, "close-outline")?)?;
        header.append_child(&close)?;
        root.append_child(&header)?;
        if !config.description.is_empty() {
            root.append_child(&create(&self.doc, "p", "description", Some(&config.description))?)?;
        }

        let mut listeners = Vec::new();
        for kind in ["mouseover", "click"] {
            let weak = Rc::downgrade(self);
            let cb = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
                if let Some(center) = weak.upgrade() {
                    center.touch(key);
                }
            });
            root.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())?;
            listeners.push(cb);
        }
        let weak = Rc::downgrade(self);
        let cb = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            ev.stop_propagation();
            if let Some(center) = weak.upgrade() {
                center.dismiss(key);
            }
        });
        close.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        listeners.push(cb);

        self.container
            .insert_before(&root, self.container.first_child().as_ref())?;
        self.views.borrow_mut().insert(
            key,
            View {
                root,
                counter,
                timer: None,
                _listeners: listeners,
            },
        );
        Ok(())
    }
}
