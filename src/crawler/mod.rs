//! Crawler module for listing page fetching and item extraction
//!
//! This module contains the extraction stage of the pipeline, including:
//! - HTTP fetching over a single session per crawl
//! - HTML parsing of product cards into raw records
//! - The paginated crawl loop with its item limit

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{crawl_range, page_url, CrawlOutcome, CrawlReport, Crawler};
pub use fetcher::{fetch_page, Fetch, FetchError, HttpSession};
pub use parser::{parse_items, ItemError};

use crate::config::ScraperConfig;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for the extraction stage. It will:
/// 1. Open an HTTP session for the whole crawl
/// 2. Walk the configured page range in order
/// 3. Collect raw product records up to the configured limit
/// 4. Close the session
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; the report may hold no records
/// * `Err(HarvestError)` - The HTTP session could not be opened
pub async fn crawl(config: ScraperConfig) -> Result<CrawlReport, HarvestError> {
    let session = HttpSession::open(&config)?;
    Ok(Crawler::new(session, config).run().await)
}
