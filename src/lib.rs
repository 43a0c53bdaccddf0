//! Storefront-Harvest: a paginated storefront scraper
//!
//! This crate implements a three-stage batch pipeline: it crawls paginated
//! product listings, normalizes the scraped text into typed product rows,
//! and persists the resulting table to flat-file, spreadsheet, and SQLite
//! sinks.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod transform;

use thiserror::Error;

/// Main error type for Storefront-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML parse error: {message}")]
    HtmlParse { message: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Storefront-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome, CrawlReport, Crawler};
pub use record::{RawItemRecord, TypedRecord};
pub use transform::build_table;
