pub mod dakar_auto;
pub mod extractor;
pub mod http;
pub mod locator;
pub mod traits;
pub mod types;

pub use dakar_auto::DakarAutoScraper;
pub use http::HttpFetcher;
pub use traits::{FetchError, PageFetcher, ScraperTrait};
pub use types::ScrapeParams;
