use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageLoad,
    OptionClick,
    OptionHover,
    KeyboardNavigation,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageLoad => "page_load",
            EventType::OptionClick => "option_click",
            EventType::OptionHover => "option_hover",
            EventType::KeyboardNavigation => "keyboard_navigation",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive value carried in an event's free-form fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

pub type EventFields = BTreeMap<String, FieldValue>;

/// One recorded interaction. The fixed keys sit next to the flattened
/// fields in the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub session_id: String,
    pub timestamp: i64,
    pub event_type: EventType,
    #[serde(flatten)]
    pub fields: EventFields,
}

impl Event {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_text)
    }
}

/// Builder for an event's field map. `None` values are skipped so absent
/// data never reaches the wire.
#[derive(Debug, Default, Clone)]
pub struct FieldsBuilder {
    fields: EventFields,
}

impl FieldsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_opt<V: Into<FieldValue>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn build(self) -> EventFields {
        self.fields
    }
}
