//! Google Sheets output
//!
//! Authenticates with a service-account key file, clears the target sheet,
//! and writes the header row followed by every data row.

use crate::config::SheetsConfig;
use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::record::TypedRecord;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use url::Url;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file this sink needs
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Reads and parses a service-account JSON key file
    pub fn load(path: &Path) -> OutputResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OutputError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            OutputError::Credentials(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Spreadsheet sink
pub struct SheetsSink {
    client: Client,
    config: SheetsConfig,
}

impl SheetsSink {
    pub fn new(client: Client, config: SheetsConfig) -> Self {
        Self { client, config }
    }

    /// Exchanges a signed assertion for an OAuth access token
    async fn access_token(&self, key: &ServiceAccountKey) -> OutputResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SHEETS_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| OutputError::Credentials(format!("invalid private key: {}", e)))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| OutputError::Auth(format!("cannot sign assertion: {}", e)))?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutputError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Builds `{api-base}/spreadsheets/{id}/values/{range}`
    fn values_url(&self, range: &str) -> OutputResult<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| OutputError::Write(format!("invalid sheets api base: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| OutputError::Write("sheets api base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["spreadsheets", self.config.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }

    async fn clear_sheet(&self, token: &str) -> OutputResult<()> {
        let url = self.values_url(&format!("{}:clear", self.config.sheet_name))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }

    async fn write_values(&self, token: &str, values: Vec<Value>) -> OutputResult<()> {
        let mut url = self.values_url(&self.config.sheet_name)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": self.config.sheet_name,
            "majorDimension": "ROWS",
            "values": values,
        });

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Header row followed by one row per record
fn sheet_values(table: &[TypedRecord]) -> Vec<Value> {
    let mut values = Vec::with_capacity(table.len() + 1);
    values.push(json!(TypedRecord::HEADERS));
    for record in table {
        values.push(json!([
            record.title(),
            record.price(),
            record.rating(),
            record.color_count(),
            record.size(),
            record.gender(),
            record.captured_at_string(),
        ]));
    }
    values
}

impl Sink for SheetsSink {
    fn name(&self) -> &str {
        "Google Sheets"
    }

    async fn write_table(&self, table: &[TypedRecord]) -> OutputResult<()> {
        let key = ServiceAccountKey::load(Path::new(&self.config.credentials_path))?;
        let token = self.access_token(&key).await?;

        self.clear_sheet(&token).await?;
        self.write_values(&token, sheet_values(table)).await
    }
}
