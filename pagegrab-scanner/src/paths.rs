// Mapping of remote URLs onto the local output tree

use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

const DIRECTORY_INDEX: &str = "index.html";

/// Derive the output-relative path for `resource`.
///
/// When the resource lives under the page URL the page prefix is stripped,
/// otherwise the origin-relative path is used. Both forms share one tree,
/// so distinct URLs can land on the same file:
///
/// - query strings and fragments never take part, so `a.css?v=1` and
///   `a.css?v=2` collide;
/// - on a page at `/docs/`, `/docs/img/a.png` (prefix stripped) and
///   `/img/a.png` (origin path) both map to `img/a.png`.
///
/// The spider writes resources in discovery order and records the
/// replaced URL on the later outcome.
pub fn relative_path(resource: &Url, base: &Url) -> PathBuf {
    let target = without_query(resource);
    let prefix = without_query(base);

    let remainder = match target.strip_prefix(prefix.as_str()) {
        Some(rest) if prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/') => {
            rest.to_string()
        }
        _ if resource.origin() == base.origin() => resource.path().to_string(),
        _ => foreign_prefix(resource),
    };

    build_path(&remainder)
}

/// Absolute location of `resource` below `output_dir`.
pub fn local_path(output_dir: &Path, resource: &Url, base: &Url) -> PathBuf {
    output_dir.join(relative_path(resource, base))
}

/// A fresh `<uuid>.json` file directly below `output_dir`.
pub fn api_response_path(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.json", Uuid::new_v4()))
}

fn without_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.into()
}

fn foreign_prefix(resource: &Url) -> String {
    let host = resource.host_str().unwrap_or("_");
    match resource.port() {
        Some(port) => format!("{}_{}{}", host, port, resource.path()),
        None => format!("{}{}", host, resource.path()),
    }
}

fn build_path(remainder: &str) -> PathBuf {
    let directory_like = remainder.is_empty() || remainder.ends_with('/');

    let mut segments: Vec<&str> = remainder
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    if directory_like || segments.is_empty() {
        segments.push(DIRECTORY_INDEX);
    }

    let mut path: PathBuf = segments.iter().collect();
    let has_extension = path
        .extension()
        .is_some_and(|extension| !extension.is_empty());

    if !has_extension && let Some(name) = path.file_name() {
        // Extensionless routes are pages
        let mut name = name.to_os_string();
        name.push(".html");
        path.set_file_name(name);
    }

    path
}
