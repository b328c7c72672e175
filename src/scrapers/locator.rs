use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

lazy_static! {
    static ref DIV: Selector = Selector::parse("div").unwrap();
    static ref H2: Selector = Selector::parse("h2").unwrap();
    static ref H3: Selector = Selector::parse("h3").unwrap();
    static ref DIV_OR_ARTICLE: Selector = Selector::parse("div, article").unwrap();
}

/// Minimum number of matches for a strategy to be accepted
const MIN_LISTINGS: usize = 3;

/// Class-name keywords for the last-resort scan
const CLASS_KEYWORDS: [&str; 4] = ["listing", "card", "annonce", "item"];

/// One way of finding listing containers in a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    Css(&'static str),
    /// `<div>` holding both an `<h2>` and an `<h3>`
    HeadingPair,
}

/// Tried in order; the first one yielding enough matches wins
pub const STRATEGIES: [LocatorStrategy; 6] = [
    LocatorStrategy::Css(r#"div[class*="listing"]"#),
    LocatorStrategy::Css(r#"div[class*="card"]"#),
    LocatorStrategy::Css("article"),
    LocatorStrategy::Css("div.col-lg-4"),
    LocatorStrategy::Css("div.col-md-6"),
    LocatorStrategy::HeadingPair,
];

impl LocatorStrategy {
    fn select<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            LocatorStrategy::Css(css) => match Selector::parse(css) {
                Ok(selector) => document.select(&selector).collect(),
                Err(e) => {
                    warn!(selector = css, error = ?e, "Invalid locator selector");
                    Vec::new()
                }
            },
            LocatorStrategy::HeadingPair => document
                .select(&DIV)
                .filter(|el| el.select(&H2).next().is_some() && el.select(&H3).next().is_some())
                .collect(),
        }
    }
}

/// Find the nodes that look like individual listings
pub fn find_listings(document: &Html) -> Vec<ElementRef<'_>> {
    for strategy in STRATEGIES {
        let found = strategy.select(document);
        if found.len() >= MIN_LISTINGS {
            debug!(?strategy, count = found.len(), "Listing strategy matched");
            return found;
        }
    }

    let found = class_keyword_scan(document);
    debug!(count = found.len(), "Fell back to class keyword scan");
    found
}

fn class_keyword_scan(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&DIV_OR_ARTICLE)
        .filter(|el| {
            el.value()
                .attr("class")
                .map(|class| {
                    let class = class.to_lowercase();
                    CLASS_KEYWORDS.iter().any(|kw| class.contains(kw))
                })
                .unwrap_or(false)
        })
        .collect()
}
