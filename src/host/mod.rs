//! Seams between the tracker and the browser.
//!
//! Everything the tracker needs from the page goes through these traits:
//! - [`PageHost`]: DOM reads/writes and listener registration,
//! - [`Storage`]: the local key/value store,
//! - [`Clock`]: wall-clock epoch milliseconds,
//! - [`Scheduler`]: one-shot delayed tasks.
//!
//! [`memory`] implements them in-process (deterministic, used on native
//! targets); `web` implements them over `web-sys` on wasm.

pub mod memory;
pub mod timing;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use crate::perf::PerformanceTiming;

/// Index of an option card in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub usize);

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenTarget {
    Window,
    Document,
    Container,
    Card(CardId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    Click,
    MouseEnter,
    MouseDown,
    MouseMove,
    MouseUp,
    MouseLeave,
    KeyDown,
    Load,
}

impl DomEventKind {
    pub fn dom_name(&self) -> &'static str {
        match self {
            DomEventKind::Click => "click",
            DomEventKind::MouseEnter => "mouseenter",
            DomEventKind::MouseDown => "mousedown",
            DomEventKind::MouseMove => "mousemove",
            DomEventKind::MouseUp => "mouseup",
            DomEventKind::MouseLeave => "mouseleave",
            DomEventKind::KeyDown => "keydown",
            DomEventKind::Load => "load",
        }
    }
}

/// The slice of a DOM event the tracker reads.
#[derive(Debug, Default)]
pub struct DomEvent {
    pub key: Option<String>,
    pub page_x: f64,
    /// Card the event targets, when the target is an option card.
    pub target_card: Option<CardId>,
    /// `data-option` of the event target, card or not.
    pub target_option: Option<String>,
    default_prevented: Cell<bool>,
}

impl DomEvent {
    pub fn pointer(page_x: f64) -> Self {
        Self {
            page_x,
            ..Self::default()
        }
    }

    pub fn key(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn on_card(card: CardId, option: Option<String>) -> Self {
        Self {
            target_card: Some(card),
            target_option: option,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, card: Option<CardId>, option: Option<String>) -> Self {
        self.target_card = card;
        self.target_option = option;
        self
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type Handler = Rc<dyn Fn(&DomEvent)>;

/// DOM access for the landing page.
///
/// Card-level calls take a [`CardId`] from [`PageHost::cards`]; unknown ids
/// are ignored by implementations.
pub trait PageHost {
    fn href(&self) -> String;
    fn user_agent(&self) -> String;
    fn screen_size(&self) -> (u32, u32);
    fn viewport_size(&self) -> (u32, u32);

    fn cards(&self) -> Vec<CardId>;
    fn card_option(&self, card: CardId) -> Option<String>;
    fn card_title(&self, card: CardId) -> Option<String>;
    fn card_markup(&self, card: CardId) -> String;
    fn set_card_markup(&self, card: CardId, markup: &str);
    fn card_attribute(&self, card: CardId, name: &str) -> Option<String>;
    fn set_card_attribute(&self, card: CardId, name: &str, value: &str);
    fn set_card_transform(&self, card: CardId, transform: &str);
    fn scroll_card_into_view(&self, card: CardId);
    /// Synthesize a click, dispatching the card's click listeners.
    fn click_card(&self, card: CardId);

    fn set_container_class(&self, class: &str);
    fn container_offset_left(&self) -> f64;
    fn container_scroll_left(&self) -> f64;
    fn set_container_scroll_left(&self, value: f64);

    fn add_body_class(&self, class: &str);
    fn remove_body_class(&self, class: &str);
    fn set_body_style(&self, property: &str, value: &str);

    fn open_new_context(&self, url: &str) -> Result<()>;
    fn assign_location(&self, url: &str) -> Result<()>;
    fn performance_timing(&self) -> Option<PerformanceTiming>;

    fn listen(&self, target: ListenTarget, kind: DomEventKind, handler: Handler);
}

/// Local key/value storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Fire-and-forget one-shot timers. There is no cancellation; tasks pending
/// when the host goes away are dropped.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}
