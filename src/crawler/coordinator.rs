//! Crawl coordinator - the paginated crawl loop
//!
//! This module walks the configured page range in order, fetching each
//! listing page and collecting its product records until the range is
//! exhausted or the item limit is reached. Page-level failures skip the
//! page; anything else aborts the crawl but still returns what was collected.

use crate::config::ScraperConfig;
use crate::crawler::fetcher::{fetch_page, Fetch};
use crate::crawler::parser::parse_items;
use crate::record::RawItemRecord;
use crate::HarvestError;
use tracing::Instrument;

/// How a crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Every page in the range was visited
    Exhausted,

    /// The item limit was reached
    LimitReached,

    /// Too many consecutive pages came back without items
    EmptyPageStop { page: u32 },

    /// An unrecoverable error stopped the crawl early
    Aborted { reason: String },
}

/// Result of a crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Records collected, in page and document order
    pub records: Vec<RawItemRecord>,

    pub outcome: CrawlOutcome,

    /// Pages whose body was retrieved successfully
    pub pages_fetched: u32,
}

/// Drives one crawl over a single network session
///
/// The crawler owns its session; [`Crawler::run`] consumes the crawler, so
/// the session is released on every exit path.
pub struct Crawler<F: Fetch> {
    session: F,
    config: ScraperConfig,
}

impl<F: Fetch> Crawler<F> {
    pub fn new(session: F, config: ScraperConfig) -> Self {
        Self { session, config }
    }

    /// Runs the crawl loop
    ///
    /// Never fails: a catastrophic error is logged and reported as
    /// [`CrawlOutcome::Aborted`] alongside the records gathered so far.
    pub async fn run(self) -> CrawlReport {
        let span = tracing::info_span!("crawl", base_url = %self.config.base_url);
        let mut state = CrawlState::default();

        let outcome = match self.crawl_pages(&mut state).instrument(span).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Critical error in scraping process: {}", e);
                CrawlOutcome::Aborted {
                    reason: e.to_string(),
                }
            }
        };

        tracing::info!(
            "Crawl finished with {} records from {} pages ({:?})",
            state.records.len(),
            state.pages_fetched,
            outcome
        );

        CrawlReport {
            records: state.records,
            outcome,
            pages_fetched: state.pages_fetched,
        }
    }

    async fn crawl_pages(&self, state: &mut CrawlState) -> Result<CrawlOutcome, HarvestError> {
        let limit = self.config.limit;
        let timeout = self.config.timeout();
        let mut empty_streak = 0u32;

        for page in self.config.start_page..=self.config.end_page {
            if state.records.len() >= limit {
                return Ok(CrawlOutcome::LimitReached);
            }

            let url = page_url(&self.config.base_url, page);
            tracing::info!("Scraping page: {}", page);

            let Some(body) = fetch_page(&self.session, &url, timeout).await? else {
                continue;
            };
            state.pages_fetched += 1;

            let items = parse_items(&String::from_utf8_lossy(&body))?;
            if items.is_empty() {
                tracing::warn!("No products found on page {}", page);
                empty_streak += 1;
                if self
                    .config
                    .stop_after_empty_pages
                    .is_some_and(|threshold| empty_streak >= threshold)
                {
                    tracing::info!(
                        "Stopping after {} consecutive empty pages",
                        empty_streak
                    );
                    return Ok(CrawlOutcome::EmptyPageStop { page });
                }
                continue;
            }
            empty_streak = 0;

            tracing::debug!("Found {} products on page {}", items.len(), page);
            for item in items {
                if state.records.len() >= limit {
                    break;
                }
                state.records.push(item);
            }
        }

        if state.records.len() >= limit {
            Ok(CrawlOutcome::LimitReached)
        } else {
            Ok(CrawlOutcome::Exhausted)
        }
    }
}

#[derive(Debug, Default)]
struct CrawlState {
    records: Vec<RawItemRecord>,
    pages_fetched: u32,
}

/// Listing URL for `page`: the base URL itself for page 1
pub fn page_url(base_url: &str, page: u32) -> String {
    if page > 1 {
        format!("{}/page{}", base_url, page)
    } else {
        base_url.to_string()
    }
}

/// Crawls `base_url` over `start_page..=end_page` with the given item limit
///
/// Convenience wrapper around [`Crawler`] returning only the records.
pub async fn crawl_range<F: Fetch>(
    session: F,
    base_url: &str,
    start_page: u32,
    end_page: u32,
    limit: usize,
) -> Vec<RawItemRecord> {
    let mut config = ScraperConfig::new(base_url);
    config.start_page = start_page;
    config.end_page = end_page;
    config.limit = limit;

    Crawler::new(session, config).run().await.records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const BASE: &str = "http://shop.test";

    fn card(title: &str) -> String {
        format!(
            r#"<div class="collection-card">
                <h3 class="product-title">{}</h3>
                <span class="price">$10.00</span>
                <div class="product-details">
                    <p>Rating: 4.0</p><p>2 Colors</p><p>Size: L</p><p>Gender: Unisex</p>
                </div>
            </div>"#,
            title
        )
    }

    fn page_of(titles: &[&str]) -> Vec<u8> {
        let cards: Vec<String> = titles.iter().map(|t| card(t)).collect();
        format!("<html><body>{}</body></html>", cards.join("")).into_bytes()
    }

    /// Serves canned pages by URL and records every request
    #[derive(Clone, Default)]
    struct ScriptedFetch {
        pages: HashMap<String, Result<Vec<u8>, fn(&str) -> FetchError>>,
        requested: Arc<Mutex<Vec<String>>>,
        dropped: Arc<AtomicBool>,
    }

    impl ScriptedFetch {
        fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
            self.pages.insert(url.to_string(), Ok(body));
            self
        }

        fn fail(mut self, url: &str, error: fn(&str) -> FetchError) -> Self {
            self.pages.insert(url.to_string(), Err(error));
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Fetch for ScriptedFetch {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(error)) => Err(error(url)),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status_code: 404,
                }),
            }
        }
    }

    impl Drop for ScriptedFetch {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn timeout(url: &str) -> FetchError {
        FetchError::Timeout {
            url: url.to_string(),
        }
    }

    fn session_lost(_url: &str) -> FetchError {
        FetchError::Session("connection pool shut down".to_string())
    }

    fn config(start_page: u32, end_page: u32, limit: usize) -> ScraperConfig {
        let mut config = ScraperConfig::new(BASE);
        config.start_page = start_page;
        config.end_page = end_page;
        config.limit = limit;
        config
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(BASE, 1), "http://shop.test");
        assert_eq!(page_url(BASE, 2), "http://shop.test/page2");
        assert_eq!(page_url(BASE, 50), "http://shop.test/page50");
    }

    #[tokio::test]
    async fn test_limit_stops_within_page_and_skips_remaining_pages() {
        let fetch = ScriptedFetch::default()
            .serve(BASE, page_of(&["Item 1", "Item 2", "Item 3"]))
            .serve("http://shop.test/page2", page_of(&["Item 4"]));
        let probe = fetch.clone();

        let report = Crawler::new(fetch, config(1, 2, 1)).run().await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].title, "Item 1");
        assert_eq!(report.outcome, CrawlOutcome::LimitReached);
        assert_eq!(probe.requested(), vec![BASE.to_string()]);
    }

    #[tokio::test]
    async fn test_absent_page_is_skipped() {
        let fetch = ScriptedFetch::default()
            .fail(BASE, timeout)
            .serve("http://shop.test/page2", page_of(&["Item Page 2"]));

        let records = crawl_range(fetch, BASE, 1, 2, 10).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Item Page 2");
    }

    #[tokio::test]
    async fn test_failing_fetch_returns_empty() {
        let fetch = ScriptedFetch::default()
            .fail(BASE, session_lost)
            .fail("http://shop.test/page2", session_lost);
        let probe = fetch.clone();

        let report = Crawler::new(fetch, config(1, 2, 10)).run().await;

        assert!(report.records.is_empty());
        assert!(matches!(report.outcome, CrawlOutcome::Aborted { .. }));
        // The abort happens on the first failure
        assert_eq!(probe.requested().len(), 1);
        assert!(probe.dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_transport_failures_on_every_page_return_empty() {
        let fetch = ScriptedFetch::default()
            .fail(BASE, timeout)
            .fail("http://shop.test/page2", timeout);

        let report = Crawler::new(fetch, config(1, 2, 10)).run().await;

        assert!(report.records.is_empty());
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_abort_keeps_records_collected_so_far() {
        let fetch = ScriptedFetch::default()
            .serve(BASE, page_of(&["Kept"]))
            .fail("http://shop.test/page2", session_lost)
            .serve("http://shop.test/page3", page_of(&["Never"]));
        let probe = fetch.clone();

        let report = Crawler::new(fetch, config(1, 3, 10)).run().await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].title, "Kept");
        assert!(matches!(report.outcome, CrawlOutcome::Aborted { .. }));
        assert_eq!(probe.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_continues_by_default() {
        let fetch = ScriptedFetch::default()
            .serve(BASE, page_of(&[]))
            .serve("http://shop.test/page2", page_of(&[]))
            .serve("http://shop.test/page3", page_of(&["Late Item"]));

        let report = Crawler::new(fetch, config(1, 3, 10)).run().await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_empty_page_stop_policy() {
        let fetch = ScriptedFetch::default()
            .serve(BASE, page_of(&["First"]))
            .serve("http://shop.test/page2", page_of(&[]))
            .fail("http://shop.test/page3", timeout)
            .serve("http://shop.test/page4", page_of(&[]))
            .serve("http://shop.test/page5", page_of(&["Unreached"]));
        let probe = fetch.clone();

        let mut config = config(1, 5, 10);
        config.stop_after_empty_pages = Some(2);
        let report = Crawler::new(fetch, config).run().await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.outcome, CrawlOutcome::EmptyPageStop { page: 4 });
        assert_eq!(probe.requested().len(), 4);
    }

    #[tokio::test]
    async fn test_collects_across_pages_in_order() {
        let fetch = ScriptedFetch::default()
            .serve(BASE, page_of(&["A", "B"]))
            .serve("http://shop.test/page2", page_of(&["C", "D"]))
            .serve("http://shop.test/page3", page_of(&["E"]));

        let report = Crawler::new(fetch, config(1, 3, 4)).run().await;

        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
        assert_eq!(report.outcome, CrawlOutcome::LimitReached);
    }

    #[tokio::test]
    async fn test_start_page_beyond_one() {
        let fetch = ScriptedFetch::default().serve("http://shop.test/page3", page_of(&["Three"]));
        let probe = fetch.clone();

        let records = crawl_range(fetch, BASE, 3, 3, 10).await;

        assert_eq!(records.len(), 1);
        assert_eq!(probe.requested(), vec!["http://shop.test/page3".to_string()]);
    }
}
