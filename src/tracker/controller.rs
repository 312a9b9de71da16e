use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::analytics::{self, AnalyticsSink};
use crate::event_log::{EventLog, SessionSnapshot};
use crate::host::{CardId, Clock, DomEvent, DomEventKind, ListenTarget, PageHost};
use crate::models::{Event, EventFields, EventType, FieldsBuilder, SessionContext};
use crate::navigation::{NavigationGate, NavigationOutcome};
use crate::perf::{LoadTiming, PerfMonitor};
use crate::settings::TrackerSettings;
use crate::{log_info, PageContext};

const ENABLE_LOGS: bool = true;

const UNKNOWN_TARGET: &str = "unknown";

/// Records card interactions for one page load and hands activations to the
/// [`NavigationGate`].
pub struct InteractionTracker {
    session: SessionContext,
    settings: TrackerSettings,
    page: Rc<dyn PageHost>,
    clock: Rc<dyn Clock>,
    analytics: Rc<dyn AnalyticsSink>,
    log: RefCell<EventLog>,
    gate: NavigationGate,
    perf: PerfMonitor,
    page_load_tracked: Cell<bool>,
}

impl InteractionTracker {
    pub fn new(ctx: &PageContext, session: SessionContext, settings: TrackerSettings) -> Rc<Self> {
        let log = EventLog::new(&session.session_id, ctx.storage.clone(), &settings.storage_key);
        let gate = NavigationGate::new(
            ctx.page.clone(),
            ctx.scheduler.clone(),
            settings.navigation_delay(),
            settings.click_feedback(),
        );

        Rc::new(Self {
            session,
            settings,
            page: ctx.page.clone(),
            clock: ctx.clock.clone(),
            analytics: ctx.analytics.clone(),
            log: RefCell::new(log),
            gate,
            perf: PerfMonitor::new(),
            page_load_tracked: Cell::new(false),
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().events().to_vec()
    }

    pub fn last_navigation_outcome(&self) -> Option<NavigationOutcome> {
        self.gate.last_outcome()
    }

    /// Page-load timing seen by the monitor started with
    /// [`InteractionTracker::attach_perf_monitor`].
    pub fn load_timing(&self) -> LoadTiming {
        self.perf.load_timing()
    }

    pub fn attach_perf_monitor(&self) {
        self.perf.attach(&self.page);
    }

    pub fn export_snapshot(&self) -> SessionSnapshot {
        self.log
            .borrow()
            .export_snapshot(&self.session, self.clock.now_ms())
    }

    /// Stamp, append, persist and forward one event.
    pub fn log_event(&self, event_type: EventType, fields: EventFields) -> Event {
        let event = Event {
            session_id: self.session.session_id.clone(),
            timestamp: self.clock.now_ms(),
            event_type,
            fields,
        };

        if ENABLE_LOGS && log::log_enabled!(log::Level::Info) {
            match serde_json::to_string(&event) {
                Ok(json) => log_info!("User interaction: {json}"),
                Err(_) => log_info!("User interaction: {}", event.event_type),
            }
        }

        self.log.borrow_mut().append(event.clone());
        analytics::forward(self.analytics.as_ref(), &event);
        event
    }

    /// Append the `page_load` event. Only the first call records anything.
    pub fn track_page_load(&self) -> Option<Event> {
        if self.page_load_tracked.replace(true) {
            return None;
        }

        let (screen_w, screen_h) = self.page.screen_size();
        let (view_w, view_h) = self.page.viewport_size();
        let fields = FieldsBuilder::new()
            .with("layout_version", self.session.layout.as_str())
            .with("user_agent", self.page.user_agent())
            .with("screen_size", format!("{screen_w}x{screen_h}"))
            .with("viewport_size", format!("{view_w}x{view_h}"))
            .build();
        Some(self.log_event(EventType::PageLoad, fields))
    }

    /// Attach click and hover listeners to every option card.
    pub fn bind_cards(self: &Rc<Self>) {
        for card in self.page.cards() {
            let tracker = Rc::downgrade(self);
            self.page.listen(
                ListenTarget::Card(card),
                DomEventKind::Click,
                Rc::new(move |_: &DomEvent| {
                    with_tracker(&tracker, |t| t.handle_card_click(card))
                }),
            );

            let tracker = Rc::downgrade(self);
            self.page.listen(
                ListenTarget::Card(card),
                DomEventKind::MouseEnter,
                Rc::new(move |_: &DomEvent| {
                    with_tracker(&tracker, |t| t.handle_card_hover(card))
                }),
            );
        }
    }

    /// Attach the document-level keydown listener.
    pub fn bind_keyboard(self: &Rc<Self>) {
        let tracker = Rc::downgrade(self);
        self.page.listen(
            ListenTarget::Document,
            DomEventKind::KeyDown,
            Rc::new(move |event: &DomEvent| {
                with_tracker(&tracker, |t| t.handle_keydown(event))
            }),
        );
    }

    pub fn handle_card_click(&self, card: CardId) {
        let option = self.page.card_option(card);
        let title = self.page.card_title(card);
        let destination = option
            .as_deref()
            .and_then(|option| self.settings.destination(option))
            .map(str::to_string);
        let elapsed = self.session.elapsed_ms(self.clock.now_ms());

        let fields = FieldsBuilder::new()
            .with_opt("option", option.clone())
            .with_opt("title", title)
            .with_opt("destination", destination.clone())
            .with("layout_version", self.session.layout.as_str())
            .with("time_on_page", elapsed)
            .build();
        self.log_event(EventType::OptionClick, fields);

        self.gate.show_click_feedback(card);
        self.gate.activate(
            option.as_deref().unwrap_or(UNKNOWN_TARGET),
            destination.as_deref(),
        );
    }

    pub fn handle_card_hover(&self, card: CardId) {
        let elapsed = self.session.elapsed_ms(self.clock.now_ms());
        let fields = FieldsBuilder::new()
            .with_opt("option", self.page.card_option(card))
            .with("time_on_page", elapsed)
            .build();
        self.log_event(EventType::OptionHover, fields);
    }

    pub fn handle_keydown(&self, event: &DomEvent) {
        match event.key.as_deref() {
            Some("Tab") => {
                let target = event
                    .target_option
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_TARGET.to_string());
                let fields = FieldsBuilder::new()
                    .with("key", "Tab")
                    .with("target", target)
                    .build();
                self.log_event(EventType::KeyboardNavigation, fields);
            }
            Some("Enter") => {
                // The synthetic click goes through the card's click listeners,
                // which log the option_click.
                if let Some(card) = event.target_card {
                    self.page.click_card(card);
                }
            }
            _ => {}
        }
    }
}

fn with_tracker(tracker: &Weak<InteractionTracker>, f: impl FnOnce(&InteractionTracker)) {
    if let Some(tracker) = tracker.upgrade() {
        f(&tracker);
    }
}
