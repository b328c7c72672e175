use crate::cleaning::{self, ExternalTable, SourceKind};
use crate::models::{Category, NormalizedRow, RawListing};
use crate::scrapers::ScraperTrait;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// What to scrape and whether to clean the result
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub categories: Vec<Category>,
    pub pages: u32,
    pub auto_clean: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            pages: 1,
            auto_clean: true,
        }
    }
}

/// A category whose scrape could not complete
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFailure {
    pub category: Category,
    pub message: String,
}

/// Tables produced by one scrape/clean cycle
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub source: SourceKind,
    /// Scraped rows per category; categories without rows are absent
    pub raw: BTreeMap<Category, Vec<RawListing>>,
    /// Cleaned dataset, when cleaning ran
    pub cleaned: Option<Vec<NormalizedRow>>,
    pub failures: Vec<CategoryFailure>,
    /// Rows fed to cleaning
    pub input_rows: usize,
}

impl PipelineResult {
    pub fn scraped_count(&self) -> usize {
        self.raw.values().map(Vec::len).sum()
    }

    pub fn cleaned_count(&self) -> usize {
        self.cleaned.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// Scrape each category in turn. A failing category is logged and reported;
/// the others still run.
pub async fn scrape_all_categories<S: ScraperTrait + ?Sized>(
    scraper: &S,
    categories: &[Category],
    pages: u32,
) -> (BTreeMap<Category, Vec<RawListing>>, Vec<CategoryFailure>) {
    let mut tables = BTreeMap::new();
    let mut failures = Vec::new();

    for &category in categories {
        info!(%category, source = scraper.source_name(), "Scraping category");

        match scraper.scrape_category(category, pages).await {
            Ok(rows) if !rows.is_empty() => {
                tables.insert(category, rows);
            }
            Ok(_) => warn!(%category, "No listings scraped"),
            Err(e) => {
                error!(%category, error = %e, "Category scrape failed");
                failures.push(CategoryFailure {
                    category,
                    message: format!("{:#}", e),
                });
            }
        }
    }

    (tables, failures)
}

/// Scrape the selected categories, then merge and clean them when asked
pub async fn run<S: ScraperTrait + ?Sized>(
    scraper: &S,
    options: &PipelineOptions,
) -> PipelineResult {
    let (raw, failures) = scrape_all_categories(scraper, &options.categories, options.pages).await;

    let input_rows = raw.values().map(Vec::len).sum();
    let cleaned = options
        .auto_clean
        .then(|| cleaning::clean_listings(cleaning::merge_categories(raw.clone())));

    let result = PipelineResult {
        source: SourceKind::Native,
        raw,
        cleaned,
        failures,
        input_rows,
    };

    info!(
        scraped = result.scraped_count(),
        cleaned = result.cleaned_count(),
        failures = result.failures.len(),
        "✅ Pipeline finished"
    );
    result
}

/// Clean a table exported by another tool
pub fn import_external(table: &ExternalTable) -> PipelineResult {
    let cleaned = cleaning::clean_external(table);
    info!(before = table.len(), after = cleaned.len(), "Imported table cleaned");

    PipelineResult {
        source: SourceKind::External,
        raw: BTreeMap::new(),
        cleaned: Some(cleaned),
        failures: Vec::new(),
        input_rows: table.len(),
    }
}
