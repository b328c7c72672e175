pub mod external;
pub mod filter;
pub mod normalizer;

pub use external::{from_external, ExternalTable};
pub use filter::dedup_and_trim;
pub use normalizer::{merge_categories, normalize_all};

use crate::models::{NormalizedRow, RawListing};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a table to clean comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    /// Rows produced by our own scraper
    Native,
    /// A table exported by another scraping tool
    External,
}

impl SourceKind {
    /// Prefix of the cleaned snapshot file name
    pub fn snapshot_prefix(&self) -> &'static str {
        match self {
            SourceKind::Native => "cleaned",
            SourceKind::External => "webscraper_cleaned",
        }
    }
}

/// Normalize, deduplicate and trim scraped listings
pub fn clean_listings(rows: Vec<RawListing>) -> Vec<NormalizedRow> {
    let cleaned = dedup_and_trim(normalize_all(rows));
    info!(count = cleaned.len(), "Cleaned scraped listings");
    cleaned
}

/// Normalize, deduplicate and trim an externally exported table
pub fn clean_external(table: &ExternalTable) -> Vec<NormalizedRow> {
    let cleaned = dedup_and_trim(normalize_all(from_external(table)));
    info!(count = cleaned.len(), "Cleaned imported table");
    cleaned
}
