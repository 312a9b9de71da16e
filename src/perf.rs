use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::{DomEvent, DomEventKind, ListenTarget, PageHost};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Navigation timing marks, epoch milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTiming {
    pub navigation_start: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
    /// `first-paint` start time relative to navigation start, when the
    /// browser reports it.
    pub first_paint: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub page_load_ms: f64,
    pub dom_content_loaded_ms: f64,
    pub first_paint_ms: Option<f64>,
}

impl PerformanceReport {
    pub fn from_timing(timing: &PerformanceTiming) -> Self {
        Self {
            page_load_ms: timing.load_event_end - timing.navigation_start,
            dom_content_loaded_ms: timing.dom_content_loaded_event_end - timing.navigation_start,
            first_paint_ms: timing.first_paint,
        }
    }
}

/// What the monitor saw for this page load.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadTiming {
    /// The window `load` event has not fired yet.
    #[default]
    Pending,
    /// `load` fired but the browser exposed no navigation timing.
    Unavailable,
    Measured(PerformanceReport),
}

/// Logs a page-load timing report once the window `load` event fires and
/// keeps the result for inspection.
#[derive(Debug, Clone, Default)]
pub struct PerfMonitor {
    timing: Rc<Cell<LoadTiming>>,
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, page: &Rc<dyn PageHost>) {
        let host = page.clone();
        let timing = self.timing.clone();
        page.listen(
            ListenTarget::Window,
            DomEventKind::Load,
            Rc::new(move |_: &DomEvent| timing.set(record_load(host.as_ref()))),
        );
    }

    pub fn load_timing(&self) -> LoadTiming {
        self.timing.get()
    }
}

fn record_load(page: &dyn PageHost) -> LoadTiming {
    let Some(timing) = page.performance_timing() else {
        log_warn!("Navigation timing unavailable");
        return LoadTiming::Unavailable;
    };

    let report = PerformanceReport::from_timing(&timing);
    let first_paint = report
        .first_paint_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "n/a".to_string());
    log_info!(
        "Page load performance: pageLoadTime={}ms domContentLoaded={}ms firstPaint={}",
        report.page_load_ms,
        report.dom_content_loaded_ms,
        first_paint
    );
    LoadTiming::Measured(report)
}
