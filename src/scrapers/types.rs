use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Request and pacing parameters for category scraping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeParams {
    /// User-Agent header sent with every page request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause between two page fetches of the same category
    pub page_delay: Duration,
}

impl Default for ScrapeParams {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            page_delay: Duration::from_secs(2),
        }
    }
}
