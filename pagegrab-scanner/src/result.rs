use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which stage of a grab an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Resource,
    ApiCall,
    WellKnown,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Resource => "resource",
            ItemKind::ApiCall => "api_call",
            ItemKind::WellKnown => "well_known",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Body written to disk
    Saved,
    /// Server answered with a non-success status (well-known files only)
    Missing,
    /// Transport, status or filesystem failure
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub url: String,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub status_code: Option<u16>,
    pub local_path: Option<PathBuf>,
    pub bytes_written: u64,
    pub response_time: Duration,
    pub error: Option<String>,
    /// Earlier resource whose file this save overwrote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}

impl ItemOutcome {
    pub fn saved(url: String, kind: ItemKind, local_path: PathBuf, bytes_written: u64) -> Self {
        Self {
            url,
            kind,
            status: ItemStatus::Saved,
            status_code: None,
            local_path: Some(local_path),
            bytes_written,
            response_time: Duration::from_secs(0),
            error: None,
            replaces: None,
        }
    }

    pub fn missing(url: String, kind: ItemKind, status_code: u16) -> Self {
        Self {
            url,
            kind,
            status: ItemStatus::Missing,
            status_code: Some(status_code),
            local_path: None,
            bytes_written: 0,
            response_time: Duration::from_secs(0),
            error: None,
            replaces: None,
        }
    }

    pub fn with_error(url: String, kind: ItemKind, error: String) -> Self {
        Self {
            url,
            kind,
            status: ItemStatus::Failed,
            status_code: None,
            local_path: None,
            bytes_written: 0,
            response_time: Duration::from_secs(0),
            error: Some(error),
            replaces: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ItemStatus::Failed
    }
}

/// Everything a single grab produced, per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiderReport {
    pub page_url: String,
    pub output_dir: PathBuf,
    pub page_bytes: u64,
    pub resources: Vec<ItemOutcome>,
    pub api_calls: Vec<ItemOutcome>,
    pub well_known: Vec<ItemOutcome>,
    pub elapsed: Duration,
}

impl SpiderReport {
    pub fn new(page_url: String, output_dir: PathBuf) -> Self {
        Self {
            page_url,
            output_dir,
            page_bytes: 0,
            resources: Vec::new(),
            api_calls: Vec::new(),
            well_known: Vec::new(),
            elapsed: Duration::from_secs(0),
        }
    }

    pub fn outcomes(&self, kind: ItemKind) -> &[ItemOutcome] {
        match kind {
            ItemKind::Resource => &self.resources,
            ItemKind::ApiCall => &self.api_calls,
            ItemKind::WellKnown => &self.well_known,
        }
    }

    pub fn all_outcomes(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.api_calls
            .iter()
            .chain(self.resources.iter())
            .chain(self.well_known.iter())
    }

    pub fn count(&self, kind: ItemKind, status: ItemStatus) -> usize {
        self.outcomes(kind)
            .iter()
            .filter(|o| o.status == status)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.all_outcomes().filter(|o| o.is_failed()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Saved items that replaced a file written earlier in the same run
    pub fn overwrites(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.all_outcomes().filter(|o| o.replaces.is_some())
    }

    pub fn bytes_written(&self) -> u64 {
        self.all_outcomes().map(|o| o.bytes_written).sum()
    }
}
