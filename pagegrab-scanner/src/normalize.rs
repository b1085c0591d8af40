// URL normalization for attribute values found in a page

use tracing::trace;
use url::Url;

/// A resolved attribute value, classified against the page host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    SameHost(Url),
    CrossHost(Url),
}

impl Candidate {
    pub fn url(&self) -> &Url {
        match self {
            Candidate::SameHost(url) | Candidate::CrossHost(url) => url,
        }
    }

    pub fn into_same_host(self) -> Option<Url> {
        match self {
            Candidate::SameHost(url) => Some(url),
            Candidate::CrossHost(_) => None,
        }
    }
}

/// Resolve `value` against `base` and classify it by host.
///
/// Absolute values are kept as-is, relative ones go through standard
/// relative resolution (path, protocol-relative, query and fragment
/// preserved). Blank or unresolvable values yield `None`.
pub fn normalize(value: &str, base: &Url) -> Option<Candidate> {
    let resolved = resolve(value, base)?;

    if resolved.host_str() == base.host_str() {
        Some(Candidate::SameHost(resolved))
    } else {
        Some(Candidate::CrossHost(resolved))
    }
}

/// Plain relative resolution with no host check.
pub fn resolve(value: &str, base: &Url) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    match Url::parse(value) {
        Ok(absolute) => Some(absolute),
        Err(_) => match base.join(value) {
            Ok(joined) => Some(joined),
            Err(e) => {
                trace!("Skipping unresolvable value {:?}: {}", value, e);
                None
            }
        },
    }
}

/// The `scheme://host[:port]/` root of a URL.
pub fn origin_root(url: &Url) -> Result<Url, url::ParseError> {
    url.join("/")
}
