use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use super::LayoutVariant;

pub const SESSION_ID_PREFIX: &str = "session_";
const TOKEN_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identity and layout of one page load. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: String,
    pub start_time_ms: i64,
    pub layout: LayoutVariant,
}

impl SessionContext {
    pub fn new(now_ms: i64, href: &str) -> Self {
        let layout_param = resolve_layout_param(href);
        Self {
            session_id: generate_session_id(now_ms, &mut rand::thread_rng()),
            start_time_ms: now_ms,
            layout: LayoutVariant::from_param(layout_param.as_deref()),
        }
    }

    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.start_time_ms).max(0)
    }
}

/// `session_<epoch ms>_<9 base-36 chars>`.
pub fn generate_session_id<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> String {
    let token: String = (0..TOKEN_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{SESSION_ID_PREFIX}{now_ms}_{token}")
}

/// Raw `layout` query value of `href`, if any.
pub fn resolve_layout_param(href: &str) -> Option<String> {
    query_param(href, "layout")
}

pub(crate) fn query_param(href: &str, name: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
