use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "userTestingData";

fn default_destinations() -> BTreeMap<String, String> {
    [
        ("scratch", "https://platform-beta.aiml.asu.edu/"),
        (
            "learn-first",
            "https://ai.asu.edu/technical-foundation/articles-and-documentation",
        ),
        (
            "watch-learn",
            "https://drive.google.com/file/d/1PjQ7xnUmFoj2BoOK9X9969LemSSVQorA/view?usp=sharing",
        ),
        (
            "template",
            "https://danielennis11111.github.io/gpt-marketplace/#/marketplace",
        ),
        (
            "chat-build",
            "https://app-beta.aiml.asu.edu/d127e308d80943adb9493ce1e3dac300",
        ),
    ]
    .into_iter()
    .map(|(option, url)| (option.to_string(), url.to_string()))
    .collect()
}

/// Page configuration. Every field has a default, so partial JSON documents
/// are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerSettings {
    /// Option id → absolute destination URL.
    pub destinations: BTreeMap<String, String>,
    pub storage_key: String,
    pub navigation_delay_ms: u64,
    pub click_feedback_ms: u64,
    pub reveal_delay_ms: u64,
    pub drag_multiplier: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            destinations: default_destinations(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            navigation_delay_ms: 300,
            click_feedback_ms: 150,
            reveal_delay_ms: 100,
            drag_multiplier: 2.0,
        }
    }
}

impl TrackerSettings {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse tracker settings")
    }

    /// Read settings from `path`; a missing file yields the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn destination(&self, option: &str) -> Option<&str> {
        self.destinations.get(option).map(String::as_str)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn click_feedback(&self) -> Duration {
        Duration::from_millis(self.click_feedback_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}
