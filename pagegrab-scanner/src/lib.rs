pub mod error;
pub mod extract;
pub mod normalize;
pub mod paths;
pub mod result;
pub mod spider;
pub mod well_known;

pub use error::ScanError;
pub use extract::{ResourceKind, ResourceRef, extract_api_calls, extract_resources};
pub use result::{ItemKind, ItemOutcome, ItemStatus, SpiderReport};
pub use spider::{ProgressCallback, Spider, SpiderEvent};
pub use well_known::WELL_KNOWN_FILES;
