//! Run summary
//!
//! Collects what each pipeline stage produced so a run can be reported in
//! one place once every sink has been attempted.

use crate::crawler::{CrawlOutcome, CrawlReport};
use crate::output::SinkResult;

/// What one pipeline run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Hash of the configuration file the run was started with
    pub config_hash: String,

    pub outcome: CrawlOutcome,

    /// Pages whose body was retrieved
    pub pages_fetched: u32,

    /// Raw records extracted before cleaning
    pub raw_records: usize,

    /// Rows left after cleaning
    pub rows: usize,

    pub sinks: Vec<SinkResult>,
}

impl RunSummary {
    pub fn new(config_hash: String, report: &CrawlReport, rows: usize) -> Self {
        Self {
            config_hash,
            outcome: report.outcome.clone(),
            pages_fetched: report.pages_fetched,
            raw_records: report.records.len(),
            rows,
            sinks: Vec::new(),
        }
    }

    /// Records dropped by cleaning
    pub fn rows_dropped(&self) -> usize {
        self.raw_records.saturating_sub(self.rows)
    }

    pub fn sinks_saved(&self) -> usize {
        self.sinks.iter().filter(|s| s.saved).count()
    }

    pub fn all_sinks_saved(&self) -> bool {
        self.sinks.iter().all(|s| s.saved)
    }
}

fn describe_outcome(outcome: &CrawlOutcome) -> String {
    match outcome {
        CrawlOutcome::Exhausted => "page range exhausted".to_string(),
        CrawlOutcome::LimitReached => "item limit reached".to_string(),
        CrawlOutcome::EmptyPageStop { page } => {
            format!("stopped at empty page {}", page)
        }
        CrawlOutcome::Aborted { reason } => format!("aborted: {}", reason),
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Crawl:");
    println!("  Config hash: {}", summary.config_hash);
    println!("  Ended: {}", describe_outcome(&summary.outcome));
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Raw records: {}", summary.raw_records);
    println!();

    let kept = if summary.raw_records > 0 {
        (summary.rows as f64 / summary.raw_records as f64) * 100.0
    } else {
        0.0
    };
    println!("Cleaning:");
    println!("  Rows kept: {} ({:.1}%)", summary.rows, kept);
    println!("  Rows dropped: {}", summary.rows_dropped());
    println!();

    println!("Sinks ({} / {} saved):", summary.sinks_saved(), summary.sinks.len());
    for sink in &summary.sinks {
        let mark = if sink.saved { "✓" } else { "✗" };
        println!("  {} {}", mark, sink.name);
    }
}
