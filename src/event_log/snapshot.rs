use serde::{Deserialize, Serialize};

use crate::models::{Event, LayoutVariant};

/// Document stored under the storage key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLog {
    pub session_id: String,
    pub interactions: Vec<Event>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PersistedLogRef<'a> {
    pub session_id: &'a str,
    pub interactions: &'a [Event],
}

/// Point-in-time export of the session for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub layout_variant: LayoutVariant,
    pub total_interactions: usize,
    pub session_duration_ms: i64,
    pub interactions: Vec<Event>,
}
