use crate::models::{Category, RawListing};
use crate::scrapers::extractor::extract_listing;
use crate::scrapers::http::HttpFetcher;
use crate::scrapers::locator::find_listings;
use crate::scrapers::traits::{PageFetcher, ScraperTrait};
use crate::scrapers::types::ScrapeParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

/// Category scraper for dakar-auto.com
pub struct DakarAutoScraper<F = HttpFetcher> {
    fetcher: F,
    params: ScrapeParams,
}

impl DakarAutoScraper<HttpFetcher> {
    /// Create a scraper with the default request parameters
    pub fn new() -> Result<Self> {
        Self::with_params(ScrapeParams::default())
    }

    /// Create a scraper with custom request parameters
    pub fn with_params(params: ScrapeParams) -> Result<Self> {
        let fetcher = HttpFetcher::with_params(&params)?;
        Ok(Self { fetcher, params })
    }
}

impl<F: PageFetcher> DakarAutoScraper<F> {
    /// Create a scraper on top of any page fetcher
    pub fn with_fetcher(fetcher: F, params: ScrapeParams) -> Self {
        Self { fetcher, params }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrape pages `1..=pages` of a category listing starting at `base_url`.
    ///
    /// A page that fails to download contributes no rows; the remaining pages
    /// are still scraped.
    pub async fn scrape_url(
        &self,
        base_url: &str,
        category: Category,
        pages: u32,
    ) -> Result<Vec<RawListing>> {
        if pages == 0 {
            anyhow::bail!("page count must be at least 1 for {}", category);
        }

        let mut all = Vec::new();

        for page in 1..=pages {
            let page_url = page_url(base_url, page);
            info!(page, url = %page_url, "Scraping page");

            match self.scrape_page(&page_url, category).await {
                Ok(rows) if !rows.is_empty() => {
                    info!(page, count = rows.len(), "✓ Listings found");
                    all.extend(rows);
                }
                Ok(_) => warn!(page, "No listings on page"),
                Err(e) => error!(page, url = %page_url, error = %e, "Failed to scrape page"),
            }

            if page < pages {
                sleep(self.params.page_delay).await;
            }
        }

        info!(%category, count = all.len(), "Category scrape finished");
        Ok(all)
    }

    async fn scrape_page(&self, url: &str, category: Category) -> Result<Vec<RawListing>> {
        let html = self
            .fetcher
            .fetch(url)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        Ok(parse_page(&html, url, category))
    }
}

#[async_trait]
impl<F: PageFetcher> ScraperTrait for DakarAutoScraper<F> {
    async fn scrape_category(&self, category: Category, pages: u32) -> Result<Vec<RawListing>> {
        self.scrape_url(category.source_url(), category, pages).await
    }

    fn source_name(&self) -> &'static str {
        "dakar-auto.com"
    }
}

/// Extract every listing of one downloaded page, tagged with its category and URL
pub fn parse_page(html: &str, url: &str, category: Category) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let nodes = find_listings(&document);
    debug!(count = nodes.len(), "Listing nodes located");

    nodes
        .iter()
        .filter_map(|node| extract_listing(node, category))
        .map(|mut listing| {
            listing.categorie = Some(category);
            listing.url_page = Some(url.to_string());
            listing
        })
        .collect()
}

/// URL of page `page`: the bare URL for page 1, `page=<n>` appended otherwise
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        return base_url.to_string();
    }

    match Url::parse(base_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("page", &page.to_string());
            url.to_string()
        }
        Err(_) => format!("{}?page={}", base_url, page),
    }
}
