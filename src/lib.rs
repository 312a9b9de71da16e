#![forbid(unsafe_code)]

//! Interaction tracking and A/B layout switching for an option-card landing
//! page.
//!
//! The page is reached only through the [`host`] traits, so the same tracker
//! runs in the browser (`wasm32`, via `web-sys`) and natively against
//! [`host::memory::MemoryPage`].

pub mod ab_testing;
pub mod analytics;
pub mod event_log;
pub mod host;
pub mod layout;
pub mod models;
pub mod navigation;
pub mod perf;
pub mod settings;
pub mod tracker;
pub mod utils;

#[cfg(target_arch = "wasm32")]
mod wasm;

use std::rc::Rc;

use analytics::AnalyticsSink;
use host::{Clock, PageHost, Scheduler, Storage};
use layout::LayoutDispatcher;
use models::SessionContext;
use settings::TrackerSettings;
use tracker::InteractionTracker;

const ENABLE_LOGS: bool = true;

/// Collaborators shared by every component for one page load.
#[derive(Clone)]
pub struct PageContext {
    pub page: Rc<dyn PageHost>,
    pub storage: Rc<dyn Storage>,
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn Scheduler>,
    pub analytics: Rc<dyn AnalyticsSink>,
}

/// Bring the page up: resolve the session, apply the layout, attach
/// listeners, record `page_load` and schedule the fade-in.
///
/// Listeners hold weak references; keep the returned tracker alive for the
/// lifetime of the page.
pub fn start(ctx: &PageContext, settings: TrackerSettings) -> Rc<InteractionTracker> {
    let session = SessionContext::new(ctx.clock.now_ms(), &ctx.page.href());
    log_info!(
        "Session {} starting with {} layout",
        session.session_id,
        session.layout.as_str()
    );

    LayoutDispatcher::new(ctx.page.clone(), settings.drag_multiplier).apply(session.layout);

    let reveal_delay = settings.reveal_delay();
    let tracker = InteractionTracker::new(ctx, session, settings);
    tracker.bind_cards();
    tracker.track_page_load();
    tracker.bind_keyboard();

    tracker.attach_perf_monitor();
    schedule_reveal(ctx, reveal_delay);

    tracker
}

fn schedule_reveal(ctx: &PageContext, delay: std::time::Duration) {
    ctx.page.set_body_style("opacity", "0");
    ctx.page.set_body_style("transition", "opacity 0.3s ease");

    let page = ctx.page.clone();
    ctx.scheduler
        .schedule(delay, Box::new(move || page.set_body_style("opacity", "1")));
}
