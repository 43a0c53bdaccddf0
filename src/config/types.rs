use serde::Deserialize;
use std::time::Duration;

/// Default storefront crawled when no base URL override is given
pub const DEFAULT_BASE_URL: &str = "https://fashion-studio.dicoding.dev";

/// Browser-like user agent sent with every listing request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Storefront-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Listing URL of page 1; later pages live at `{base-url}/page{n}`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// First page to crawl (inclusive)
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last page to crawl (inclusive)
    #[serde(rename = "end-page", default = "default_end_page")]
    pub end_page: u32,

    /// Maximum number of raw records collected across all pages
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Stop after this many consecutive fetched pages with no items.
    /// Unset means every page in the range is visited.
    #[serde(rename = "stop-after-empty-pages", default)]
    pub stop_after_empty_pages: Option<u32>,
}

impl ScraperConfig {
    /// Creates a scraper configuration for `base_url` with default paging
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            start_page: default_start_page(),
            end_page: default_end_page(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            stop_after_empty_pages: None,
        }
    }

    /// Returns the per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the cleaned product CSV
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,

    /// Optional path for a snapshot of the raw, unvalidated records
    #[serde(rename = "raw-csv-path", default)]
    pub raw_csv_path: Option<String>,

    #[serde(default)]
    pub sheets: Option<SheetsConfig>,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            raw_csv_path: None,
            sheets: None,
            database: None,
        }
    }
}

/// Google Sheets sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Service-account JSON key file
    #[serde(rename = "credentials-path")]
    pub credentials_path: String,

    #[serde(rename = "spreadsheet-id")]
    pub spreadsheet_id: String,

    #[serde(rename = "sheet-name", default = "default_sheet_name")]
    pub sheet_name: String,

    /// Sheets REST endpoint; overridable for testing
    #[serde(rename = "api-base", default = "default_sheets_api_base")]
    pub api_base: String,
}

/// Relational sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path or `file:` URI
    pub uri: String,

    #[serde(rename = "table-name", default = "default_table_name")]
    pub table_name: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_end_page() -> u32 {
    50
}

fn default_limit() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_csv_path() -> String {
    "products.csv".to_string()
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_table_name() -> String {
    "fashion_products".to_string()
}
