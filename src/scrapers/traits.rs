use crate::models::{Category, RawListing};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("could not read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// HTTP GET capability used by the category scraper
/// Kept behind a trait so pages can be served from memory in tests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML of a page
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Common trait for listing scrapers
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape the first `pages` pages of a category
    async fn scrape_category(&self, category: Category, pages: u32) -> Result<Vec<RawListing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
