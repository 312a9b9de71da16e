//! `web-sys` implementations of the host traits.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, PerformanceEntry,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use super::{CardId, DomEvent, DomEventKind, Handler, ListenTarget, PageHost, Scheduler, Storage};
use crate::analytics::{AnalyticsParams, AnalyticsSink};
use crate::perf::PerformanceTiming;

pub const CARD_SELECTOR: &str = ".option-card";
pub const CONTAINER_ID: &str = "optionsContainer";

pub(crate) fn js_err(err: JsValue) -> anyhow::Error {
    anyhow!(
        "{}",
        err.as_string().unwrap_or_else(|| format!("{err:?}"))
    )
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("no global window"))
}

pub struct WebPage {
    window: Window,
    document: Document,
    container: HtmlElement,
    cards: Rc<Vec<HtmlElement>>,
}

impl WebPage {
    /// Bind to the live document. Cards are collected once, in document
    /// order.
    pub fn attach(container_id: &str) -> Result<Self> {
        let window = window()?;
        let document = window.document().ok_or_else(|| anyhow!("window has no document"))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| anyhow!("no element with id '{container_id}'"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| anyhow!("'{container_id}' is not an HTML element"))?;

        let nodes = document
            .query_selector_all(CARD_SELECTOR)
            .map_err(js_err)
            .context("failed to query option cards")?;
        let cards = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();

        Ok(Self {
            window,
            document,
            container,
            cards: Rc::new(cards),
        })
    }

    fn card(&self, card: CardId) -> Option<&HtmlElement> {
        self.cards.get(card.0)
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn event_target(&self, target: ListenTarget) -> Option<EventTarget> {
        match target {
            ListenTarget::Window => Some(self.window.clone().into()),
            ListenTarget::Document => Some(self.document.clone().into()),
            ListenTarget::Container => Some(self.container.clone().into()),
            ListenTarget::Card(card) => self.card(card).map(|el| el.clone().into()),
        }
    }
}

fn card_index(cards: &[HtmlElement], target: &EventTarget) -> Option<CardId> {
    let target: &JsValue = target.as_ref();
    cards
        .iter()
        .position(|card| {
            let card: &JsValue = card.as_ref();
            card == target
        })
        .map(CardId)
}

fn to_dom_event(cards: &[HtmlElement], event: &web_sys::Event) -> DomEvent {
    let mut dom_event = match event.dyn_ref::<KeyboardEvent>() {
        Some(key_event) => DomEvent::key(&key_event.key()),
        None => DomEvent::pointer(
            event
                .dyn_ref::<MouseEvent>()
                .map(|mouse| f64::from(mouse.page_x()))
                .unwrap_or_default(),
        ),
    };

    if let Some(target) = event.target() {
        let option = target
            .dyn_ref::<Element>()
            .and_then(|el| el.get_attribute("data-option"));
        dom_event = dom_event.with_target(card_index(cards, &target), option);
    }
    dom_event
}

impl PageHost for WebPage {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.window
            .screen()
            .ok()
            .map(|screen| {
                (
                    screen.width().unwrap_or_default().max(0) as u32,
                    screen.height().unwrap_or_default().max(0) as u32,
                )
            })
            .unwrap_or_default()
    }

    fn viewport_size(&self) -> (u32, u32) {
        let dimension = |value: Result<JsValue, JsValue>| {
            value
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or_default()
                .max(0.0) as u32
        };
        (
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn cards(&self) -> Vec<CardId> {
        (0..self.cards.len()).map(CardId).collect()
    }

    fn card_option(&self, card: CardId) -> Option<String> {
        self.card(card)?.get_attribute("data-option")
    }

    fn card_title(&self, card: CardId) -> Option<String> {
        self.card(card)?
            .query_selector("h3")
            .ok()
            .flatten()?
            .text_content()
    }

    fn card_markup(&self, card: CardId) -> String {
        self.card(card).map(|el| el.inner_html()).unwrap_or_default()
    }

    fn set_card_markup(&self, card: CardId, markup: &str) {
        if let Some(el) = self.card(card) {
            el.set_inner_html(markup);
        }
    }

    fn card_attribute(&self, card: CardId, name: &str) -> Option<String> {
        self.card(card)?.get_attribute(name)
    }

    fn set_card_attribute(&self, card: CardId, name: &str, value: &str) {
        if let Some(el) = self.card(card) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn set_card_transform(&self, card: CardId, transform: &str) {
        if let Some(el) = self.card(card) {
            let _ = el.style().set_property("transform", transform);
        }
    }

    fn scroll_card_into_view(&self, card: CardId) {
        if let Some(el) = self.card(card) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Center);
            el.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn click_card(&self, card: CardId) {
        if let Some(el) = self.card(card) {
            el.click();
        }
    }

    fn set_container_class(&self, class: &str) {
        self.container.set_class_name(class);
    }

    fn container_offset_left(&self) -> f64 {
        f64::from(self.container.offset_left())
    }

    fn container_scroll_left(&self) -> f64 {
        f64::from(self.container.scroll_left())
    }

    fn set_container_scroll_left(&self, value: f64) {
        let _ = js_sys::Reflect::set(
            &self.container,
            &JsValue::from_str("scrollLeft"),
            &JsValue::from_f64(value),
        );
    }

    fn add_body_class(&self, class: &str) {
        if let Some(body) = self.body() {
            let _ = body.class_list().add_1(class);
        }
    }

    fn remove_body_class(&self, class: &str) {
        if let Some(body) = self.body() {
            let _ = body.class_list().remove_1(class);
        }
    }

    fn set_body_style(&self, property: &str, value: &str) {
        if let Some(body) = self.body() {
            let _ = body.style().set_property(property, value);
        }
    }

    fn open_new_context(&self, url: &str) -> Result<()> {
        match self
            .window
            .open_with_url_and_target(url, "_blank")
            .map_err(js_err)?
        {
            Some(_) => Ok(()),
            None => bail!("popup blocked"),
        }
    }

    fn assign_location(&self, url: &str) -> Result<()> {
        self.window.location().set_href(url).map_err(js_err)
    }

    fn performance_timing(&self) -> Option<PerformanceTiming> {
        let performance = self.window.performance()?;
        let timing = performance.timing();
        let entries = performance.get_entries_by_type("paint");
        let first_paint = entries
            .iter()
            .filter_map(|entry| entry.dyn_into::<PerformanceEntry>().ok())
            .find(|entry| entry.name() == "first-paint")
            .map(|entry| entry.start_time());

        Some(PerformanceTiming {
            navigation_start: timing.navigation_start(),
            dom_content_loaded_event_end: timing.dom_content_loaded_event_end(),
            load_event_end: timing.load_event_end(),
            first_paint,
        })
    }

    fn listen(&self, target: ListenTarget, kind: DomEventKind, handler: Handler) {
        let Some(event_target) = self.event_target(target) else {
            return;
        };

        let cards = self.cards.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let dom_event = to_dom_event(&cards, &event);
            handler(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
        });

        if event_target
            .add_event_listener_with_callback(kind.dom_name(), callback.as_ref().unchecked_ref())
            .is_ok()
        {
            // Listeners live as long as the page.
            callback.forget();
        }
    }
}

/// `window.localStorage`.
pub struct WebStorage {
    inner: Option<web_sys::Storage>,
}

impl WebStorage {
    pub fn local(window: &Window) -> Self {
        Self {
            inner: window.local_storage().ok().flatten(),
        }
    }
}

impl Storage for WebStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let storage = self
            .inner
            .as_ref()
            .ok_or_else(|| anyhow!("localStorage unavailable"))?;
        storage.set_item(key, value).map_err(js_err)
    }
}

/// `setTimeout`-backed scheduler.
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay_ms,
            )
        {
            log::warn!("setTimeout failed: {:#}", js_err(err));
        }
    }
}

/// Forwards to the page's `gtag` global.
pub struct GtagSink {
    gtag: js_sys::Function,
}

impl GtagSink {
    /// Present only when `window.gtag` is a function at startup.
    pub fn detect(window: &Window) -> Option<Self> {
        js_sys::Reflect::get(window, &JsValue::from_str("gtag"))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
            .map(|gtag| Self { gtag })
    }
}

impl AnalyticsSink for GtagSink {
    fn send(&self, event_name: &str, params: &AnalyticsParams) -> Result<()> {
        let payload = js_sys::Object::new();
        let as_js = |value: &Option<String>| {
            value
                .as_deref()
                .map(JsValue::from_str)
                .unwrap_or(JsValue::UNDEFINED)
        };
        js_sys::Reflect::set(
            &payload,
            &JsValue::from_str("custom_parameter_1"),
            &as_js(&params.custom_parameter_1),
        )
        .map_err(js_err)?;
        js_sys::Reflect::set(
            &payload,
            &JsValue::from_str("custom_parameter_2"),
            &as_js(&params.custom_parameter_2),
        )
        .map_err(js_err)?;

        self.gtag
            .call3(
                &JsValue::NULL,
                &JsValue::from_str("event"),
                &JsValue::from_str(event_name),
                &payload,
            )
            .map(|_| ())
            .map_err(js_err)
    }
}
