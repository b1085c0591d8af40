// Resource and API endpoint discovery for a single page

use crate::normalize::{normalize, resolve};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static RESOURCE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img[src], link[href], script[src], a[href]").expect("resource selector is valid")
});

/// The call shape inline scripts use to load data at runtime. This is a
/// textual heuristic: a literal `self.fetchTextDataAsync(`, optional
/// whitespace, a backtick string, then a comma.
static API_CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"self\.fetchTextDataAsync\(\s*`([^`]*)`,").expect("api call regex is valid")
});

/// Element/attribute pair a resource was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ImageSrc,
    LinkHref,
    ScriptSrc,
    AnchorHref,
}

impl ResourceKind {
    fn from_element(name: &str) -> Option<Self> {
        match name {
            "img" => Some(ResourceKind::ImageSrc),
            "link" => Some(ResourceKind::LinkHref),
            "script" => Some(ResourceKind::ScriptSrc),
            "a" => Some(ResourceKind::AnchorHref),
            _ => None,
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            ResourceKind::ImageSrc | ResourceKind::ScriptSrc => "src",
            ResourceKind::LinkHref | ResourceKind::AnchorHref => "href",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub url: Url,
    pub kind: ResourceKind,
}

/// Collect same-host `img[src]`, `link[href]`, `script[src]` and `a[href]`
/// targets in document order, deduplicated by resolved URL.
pub fn extract_resources(document: &Html, base: &Url) -> Vec<ResourceRef> {
    let mut seen = HashSet::new();
    let mut resources = Vec::new();

    for element in document.select(&RESOURCE_SELECTOR) {
        let Some(kind) = ResourceKind::from_element(element.value().name()) else {
            continue;
        };
        let Some(value) = element.value().attr(kind.attribute()) else {
            continue;
        };
        let Some(candidate) = normalize(value, base) else {
            continue;
        };

        let Some(url) = candidate.into_same_host() else {
            debug!("Dropping cross-host {:?} value {}", kind, value);
            continue;
        };

        if seen.insert(url.as_str().to_string()) {
            debug!("Found {:?}: {}", kind, url);
            resources.push(ResourceRef { url, kind });
        }
    }

    resources
}

/// Scan raw page text for `self.fetchTextDataAsync` calls and resolve each
/// backtick argument against `base`. Every occurrence is returned, in order;
/// no host filtering is applied since data endpoints may live elsewhere.
pub fn extract_api_calls(raw: &str, base: &Url) -> Vec<Url> {
    API_CALL_PATTERN
        .captures_iter(raw)
        .filter_map(|caps| {
            let target = caps.get(1).map_or("", |m| m.as_str());
            let resolved = resolve_api_target(target, base);
            if let Some(ref url) = resolved {
                debug!("Found API call: {}", url);
            }
            resolved
        })
        .collect()
}

fn resolve_api_target(target: &str, base: &Url) -> Option<Url> {
    // An empty template literal points back at the page itself.
    if target.trim().is_empty() {
        return Some(base.clone());
    }
    resolve(target, base)
}
