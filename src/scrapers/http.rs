use crate::scrapers::traits::{FetchError, PageFetcher};
use crate::scrapers::types::ScrapeParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// `PageFetcher` backed by a reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default User-Agent and timeout
    pub fn new() -> Result<Self> {
        Self::with_params(&ScrapeParams::default())
    }

    /// Create a fetcher with custom request parameters
    pub fn with_params(params: &ScrapeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .user_agent(params.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}
