pub mod event;
pub mod layout;
pub mod session;

pub use event::{Event, EventFields, EventType, FieldValue, FieldsBuilder};
pub use layout::LayoutVariant;
pub use session::SessionContext;
