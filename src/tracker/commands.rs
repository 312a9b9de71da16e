//! Console debugging entry points.

use anyhow::{Context, Result};

use crate::ab_testing::{self, LayoutUrls};
use crate::log_info;
use crate::tracker::InteractionTracker;

const ENABLE_LOGS: bool = true;

/// Log and return the session snapshot as JSON.
pub fn export_user_data(tracker: &InteractionTracker) -> Result<String> {
    let snapshot = tracker.export_snapshot();
    let json = serde_json::to_string(&snapshot).context("failed to serialize session snapshot")?;
    log_info!("User testing data: {json}");
    Ok(json)
}

/// The A/B helpers only need the page URL, so they work on any page, with
/// or without the options container.
pub fn current_variant(href: &str) -> String {
    ab_testing::variant(href)
}

pub fn layout_test_urls(href: &str) -> Result<LayoutUrls> {
    ab_testing::test_urls(href)
}

/// Reload `href` with `layout` set, handing the new URL to `navigate`.
/// Returns the URL navigated to.
pub fn switch_layout(
    href: &str,
    layout: &str,
    navigate: impl FnOnce(&str) -> Result<()>,
) -> Result<String> {
    let url = ab_testing::switch_layout_url(href, layout)?;
    navigate(&url).with_context(|| format!("failed to navigate to {url}"))?;
    log_info!("Switching layout to {layout}");
    Ok(url)
}
