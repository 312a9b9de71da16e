//! In-process page model.
//!
//! Holds cards, container and body state in plain Rust values and keeps
//! registered listeners so callers can dispatch DOM events by hand. Native
//! builds use it in place of a browser.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{bail, Result};

use super::{CardId, DomEvent, DomEventKind, Handler, ListenTarget, PageHost, Storage};
use crate::perf::PerformanceTiming;

#[derive(Debug, Clone, Default)]
pub struct MemoryCard {
    pub option: Option<String>,
    pub title: Option<String>,
    pub markup: String,
    pub attributes: BTreeMap<String, String>,
    pub transform: String,
    pub scrolled_into_view: u32,
}

impl MemoryCard {
    /// Card shaped like the landing page markup: icon block, heading, blurb.
    pub fn new(option: &str, title: &str) -> Self {
        Self {
            option: Some(option.to_string()),
            title: Some(title.to_string()),
            markup: format!(
                "<div class=\"icon\">*</div><h3>{title}</h3><p>Go to {option}</p>"
            ),
            ..Self::default()
        }
    }
}

pub struct MemoryPage {
    href: RefCell<String>,
    user_agent: String,
    screen: (u32, u32),
    viewport: (u32, u32),
    cards: RefCell<Vec<MemoryCard>>,
    container_class: RefCell<String>,
    container_offset_left: Cell<f64>,
    container_scroll_left: Cell<f64>,
    body_classes: RefCell<BTreeSet<String>>,
    body_style: RefCell<BTreeMap<String, String>>,
    opened: RefCell<Vec<String>>,
    fail_open: Cell<bool>,
    timing: RefCell<Option<PerformanceTiming>>,
    listeners: RefCell<Vec<(ListenTarget, DomEventKind, Handler)>>,
}

impl MemoryPage {
    pub fn new(href: &str, cards: Vec<MemoryCard>) -> Self {
        Self {
            href: RefCell::new(href.to_string()),
            user_agent: "optiondeck-memory/1.0".to_string(),
            screen: (1920, 1080),
            viewport: (1280, 720),
            cards: RefCell::new(cards),
            container_class: RefCell::new(String::new()),
            container_offset_left: Cell::new(0.0),
            container_scroll_left: Cell::new(0.0),
            body_classes: RefCell::new(BTreeSet::new()),
            body_style: RefCell::new(BTreeMap::new()),
            opened: RefCell::new(Vec::new()),
            fail_open: Cell::new(false),
            timing: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Dispatch `event` to every listener registered for `target`/`kind`,
    /// in registration order.
    pub fn dispatch(&self, target: ListenTarget, kind: DomEventKind, event: &DomEvent) {
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(t, k, _)| *t == target && *k == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    /// Keydown bubbling to the document with `focused` as the event target.
    pub fn press_key(&self, key: &str, focused: Option<CardId>) -> DomEvent {
        let option = focused.and_then(|card| self.card_option(card));
        let event = DomEvent::key(key).with_target(focused, option);
        self.dispatch(ListenTarget::Document, DomEventKind::KeyDown, &event);
        event
    }

    pub fn hover_card(&self, card: CardId) {
        let event = DomEvent::on_card(card, self.card_option(card));
        self.dispatch(ListenTarget::Card(card), DomEventKind::MouseEnter, &event);
    }

    pub fn pointer(&self, kind: DomEventKind, page_x: f64) -> DomEvent {
        let event = DomEvent::pointer(page_x);
        self.dispatch(ListenTarget::Container, kind, &event);
        event
    }

    pub fn fire_load(&self) {
        self.dispatch(ListenTarget::Window, DomEventKind::Load, &DomEvent::default());
    }

    pub fn listener_count(&self, target: ListenTarget, kind: DomEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(t, k, _)| *t == target && *k == kind)
            .count()
    }

    pub fn card(&self, card: CardId) -> Option<MemoryCard> {
        self.cards.borrow().get(card.0).cloned()
    }

    pub fn container_class(&self) -> String {
        self.container_class.borrow().clone()
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.borrow().contains(class)
    }

    pub fn body_style(&self, property: &str) -> Option<String> {
        self.body_style.borrow().get(property).cloned()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    pub fn set_href(&self, href: &str) {
        *self.href.borrow_mut() = href.to_string();
    }

    pub fn set_container_offset_left(&self, value: f64) {
        self.container_offset_left.set(value);
    }

    /// Make [`PageHost::open_new_context`] fail, as a popup blocker would.
    pub fn block_popups(&self) {
        self.fail_open.set(true);
    }

    pub fn set_performance_timing(&self, timing: PerformanceTiming) {
        *self.timing.borrow_mut() = Some(timing);
    }
}

impl PageHost for MemoryPage {
    fn href(&self) -> String {
        self.href.borrow().clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn cards(&self) -> Vec<CardId> {
        (0..self.cards.borrow().len()).map(CardId).collect()
    }

    fn card_option(&self, card: CardId) -> Option<String> {
        self.cards.borrow().get(card.0)?.option.clone()
    }

    fn card_title(&self, card: CardId) -> Option<String> {
        self.cards.borrow().get(card.0)?.title.clone()
    }

    fn card_markup(&self, card: CardId) -> String {
        self.cards
            .borrow()
            .get(card.0)
            .map(|c| c.markup.clone())
            .unwrap_or_default()
    }

    fn set_card_markup(&self, card: CardId, markup: &str) {
        if let Some(c) = self.cards.borrow_mut().get_mut(card.0) {
            c.markup = markup.to_string();
        }
    }

    fn card_attribute(&self, card: CardId, name: &str) -> Option<String> {
        self.cards.borrow().get(card.0)?.attributes.get(name).cloned()
    }

    fn set_card_attribute(&self, card: CardId, name: &str, value: &str) {
        if let Some(c) = self.cards.borrow_mut().get_mut(card.0) {
            c.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn set_card_transform(&self, card: CardId, transform: &str) {
        if let Some(c) = self.cards.borrow_mut().get_mut(card.0) {
            c.transform = transform.to_string();
        }
    }

    fn scroll_card_into_view(&self, card: CardId) {
        if let Some(c) = self.cards.borrow_mut().get_mut(card.0) {
            c.scrolled_into_view += 1;
        }
    }

    fn click_card(&self, card: CardId) {
        let event = DomEvent::on_card(card, self.card_option(card));
        self.dispatch(ListenTarget::Card(card), DomEventKind::Click, &event);
    }

    fn set_container_class(&self, class: &str) {
        *self.container_class.borrow_mut() = class.to_string();
    }

    fn container_offset_left(&self) -> f64 {
        self.container_offset_left.get()
    }

    fn container_scroll_left(&self) -> f64 {
        self.container_scroll_left.get()
    }

    fn set_container_scroll_left(&self, value: f64) {
        self.container_scroll_left.set(value);
    }

    fn add_body_class(&self, class: &str) {
        self.body_classes.borrow_mut().insert(class.to_string());
    }

    fn remove_body_class(&self, class: &str) {
        self.body_classes.borrow_mut().remove(class);
    }

    fn set_body_style(&self, property: &str, value: &str) {
        self.body_style
            .borrow_mut()
            .insert(property.to_string(), value.to_string());
    }

    fn open_new_context(&self, url: &str) -> Result<()> {
        if self.fail_open.get() {
            bail!("window.open blocked for {url}");
        }
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn assign_location(&self, url: &str) -> Result<()> {
        self.set_href(url);
        Ok(())
    }

    fn performance_timing(&self) -> Option<PerformanceTiming> {
        self.timing.borrow().clone()
    }

    fn listen(&self, target: ListenTarget, kind: DomEventKind, handler: Handler) {
        self.listeners.borrow_mut().push((target, kind, handler));
    }
}

/// Key/value store with an optional byte quota, mirroring `localStorage`
/// quota errors.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    quota_bytes: Cell<Option<usize>>,
    writes: Cell<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        let storage = Self::default();
        storage.quota_bytes.set(Some(quota_bytes));
        storage
    }

    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        self.quota_bytes.set(quota_bytes);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes.get() {
            let others: usize = self
                .items
                .borrow()
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                bail!("storage quota exceeded: {needed} bytes needed, {quota} allowed");
            }
        }

        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
