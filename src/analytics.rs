use std::cell::RefCell;

use anyhow::Result;
use serde::Serialize;

use crate::models::Event;

/// Parameters sent with every forwarded event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnalyticsParams {
    pub custom_parameter_1: Option<String>,
    pub custom_parameter_2: Option<String>,
}

impl AnalyticsParams {
    pub fn from_event(event: &Event) -> Self {
        Self {
            custom_parameter_1: event.text("option").map(str::to_string),
            custom_parameter_2: event.text("layout_version").map(str::to_string),
        }
    }
}

/// Optional third-party analytics hook.
pub trait AnalyticsSink {
    fn send(&self, event_name: &str, params: &AnalyticsParams) -> Result<()>;
}

/// Used when no hook is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn send(&self, _event_name: &str, _params: &AnalyticsParams) -> Result<()> {
        Ok(())
    }
}

/// Keeps every forwarded call in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: RefCell<Vec<(String, AnalyticsParams)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, AnalyticsParams)> {
        self.sent.borrow().clone()
    }
}

impl AnalyticsSink for RecordingSink {
    fn send(&self, event_name: &str, params: &AnalyticsParams) -> Result<()> {
        self.sent
            .borrow_mut()
            .push((event_name.to_string(), params.clone()));
        Ok(())
    }
}

/// Best-effort forward; sink errors never reach the caller.
pub fn forward(sink: &dyn AnalyticsSink, event: &Event) {
    let params = AnalyticsParams::from_event(event);
    if let Err(err) = sink.send(event.event_type.as_str(), &params) {
        log::debug!("Analytics hook rejected {}: {err:#}", event.event_type);
    }
}
