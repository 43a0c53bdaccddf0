use crate::config::types::{Config, DatabaseConfig, OutputConfig, ScraperConfig, SheetsConfig};
use crate::output::is_identifier;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl loop configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must be >= start_page ({})",
            config.end_page, config.start_page
        )));
    }

    if config.limit < 1 {
        return Err(ConfigError::Validation("limit must be >= 1".to_string()));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.stop_after_empty_pages == Some(0) {
        return Err(ConfigError::Validation(
            "stop_after_empty_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.raw_csv_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "raw_csv_path cannot be empty when set".to_string(),
        ));
    }

    if let Some(sheets) = &config.sheets {
        validate_sheets_config(sheets)?;
    }

    if let Some(database) = &config.database {
        validate_database_config(database)?;
    }

    Ok(())
}

fn validate_sheets_config(config: &SheetsConfig) -> Result<(), ConfigError> {
    if config.credentials_path.is_empty() {
        return Err(ConfigError::Validation(
            "sheets credentials_path cannot be empty".to_string(),
        ));
    }

    if config.spreadsheet_id.is_empty() {
        return Err(ConfigError::Validation(
            "sheets spreadsheet_id cannot be empty".to_string(),
        ));
    }

    if config.sheet_name.is_empty() {
        return Err(ConfigError::Validation(
            "sheets sheet_name cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sheets api_base: {}", e)))?;

    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.uri.is_empty() {
        return Err(ConfigError::Validation(
            "database uri cannot be empty".to_string(),
        ));
    }

    validate_table_name(&config.table_name)
}

/// Table names are interpolated into DDL, so only plain identifiers pass
fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    if !is_identifier(name) {
        return Err(ConfigError::Validation(format!(
            "table_name must be a plain SQL identifier, got '{}'",
            name
        )));
    }

    Ok(())
}
