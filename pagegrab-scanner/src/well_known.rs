use crate::error::{Result, ScanError};
use crate::normalize::origin_root;
use url::Url;

/// Conventional site files pulled from the origin root after the page
/// resources, in this order.
pub const WELL_KNOWN_FILES: [&str; 4] = [
    "robots.txt",
    "sitemap.xml",
    "site.webmanifest",
    "favicon.ico",
];

/// Location of `file` at the origin root of `base`, ignoring the page path.
pub fn well_known_url(base: &Url, file: &str) -> Result<Url> {
    let root = origin_root(base)
        .map_err(|e| ScanError::InvalidUrl(format!("{} has no origin root: {}", base, e)))?;

    root.join(file.trim_start_matches('/'))
        .map_err(|e| ScanError::InvalidUrl(format!("{} relative to {}: {}", file, root, e)))
}
