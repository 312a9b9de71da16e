mod snapshot;

pub use snapshot::{PersistedLog, SessionSnapshot};

use std::rc::Rc;

use anyhow::{Context, Result};

use crate::host::Storage;
use crate::log_warn;
use crate::models::{Event, SessionContext};
use snapshot::PersistedLogRef;

const ENABLE_LOGS: bool = true;

/// Append-only interaction log mirrored to local storage.
///
/// Every append rewrites the whole stored document; the last snapshot wins.
pub struct EventLog {
    session_id: String,
    storage_key: String,
    storage: Rc<dyn Storage>,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(session_id: &str, storage: Rc<dyn Storage>, storage_key: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            storage_key: storage_key.to_string(),
            storage,
            events: Vec::new(),
        }
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
        self.persist();
    }

    /// Write the full log to storage. Failures are logged and swallowed;
    /// returns whether the write landed.
    pub fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(err) => {
                log_warn!("Could not save interactions to storage: {err:#}");
                false
            }
        }
    }

    fn try_persist(&self) -> Result<()> {
        let document = PersistedLogRef {
            session_id: &self.session_id,
            interactions: &self.events,
        };
        let serialized =
            serde_json::to_string(&document).context("failed to serialize interactions")?;
        self.storage
            .set_item(&self.storage_key, &serialized)
            .with_context(|| format!("failed to write storage key '{}'", self.storage_key))
    }

    pub fn export_snapshot(&self, session: &SessionContext, now_ms: i64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            layout_variant: session.layout,
            total_interactions: self.events.len(),
            session_duration_ms: session.elapsed_ms(now_ms),
            interactions: self.events.clone(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Read back the last persisted document. Missing or malformed data yields
/// `None`.
pub fn load_persisted(storage: &dyn Storage, storage_key: &str) -> Option<PersistedLog> {
    let raw = storage.get_item(storage_key)?;
    match serde_json::from_str(&raw) {
        Ok(log) => Some(log),
        Err(err) => {
            log_warn!("Ignoring malformed stored interactions: {err}");
            None
        }
    }
}
