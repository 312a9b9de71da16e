//! A/B helpers exposed for console testing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::session::query_param;
use crate::models::LayoutVariant;

pub const DEFAULT_VARIANT: &str = "A";

/// Current test variant from the `variant` query parameter.
pub fn variant(href: &str) -> String {
    query_param(href, "variant").unwrap_or_else(|| DEFAULT_VARIANT.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutUrls {
    pub grid: String,
    pub list: String,
    pub carousel: String,
}

/// Same-page URLs, one per layout, with every other query parameter dropped.
pub fn test_urls(href: &str) -> Result<LayoutUrls> {
    let url = Url::parse(href).with_context(|| format!("invalid page URL '{href}'"))?;
    let base = format!("{}{}", url.origin().ascii_serialization(), url.path());
    let build = |layout: LayoutVariant| format!("{base}?layout={}", layout.as_str());

    Ok(LayoutUrls {
        grid: build(LayoutVariant::Grid),
        list: build(LayoutVariant::List),
        carousel: build(LayoutVariant::Carousel),
    })
}

/// The current URL with `layout` set, other query pairs kept in order.
pub fn switch_layout_url(href: &str, layout: &str) -> Result<String> {
    let mut url = Url::parse(href).with_context(|| format!("invalid page URL '{href}'"))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "layout")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("layout", layout);
    }

    Ok(url.to_string())
}
