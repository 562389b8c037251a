//! Numverify API client
//!
//! The existence/line-type source: authoritative for whether a number exists
//! and what kind of line it is. Carrier and line type from this provider win
//! ties against Veriphone.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const NUMVERIFY_BASE_URL: &str = "http://apilayer.net/api/validate";

/// Bounded per-request timeout; a timeout counts as a transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Numverify client errors
#[derive(Debug, Error)]
pub enum NumverifyError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {code}: {info}")]
    ApiError { code: i64, info: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Raw response envelope. Success payloads carry the validation fields;
/// provider-level failures carry `error` instead.
#[derive(Debug, Clone, Deserialize)]
struct NumverifyResponse {
    #[serde(default)]
    valid: bool,
    line_type: Option<String>,
    carrier: Option<String>,
    error: Option<NumverifyApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct NumverifyApiError {
    code: Option<i64>,
    info: Option<String>,
}

/// Validation fields from a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumverifyData {
    pub valid: bool,
    pub line_type: Option<String>,
    pub carrier: Option<String>,
}

/// Numverify API client
pub struct NumverifyClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl NumverifyClient {
    pub fn new(api_key: String) -> Result<Self, NumverifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NumverifyError::NetworkError(e.to_string()))?;

        Ok(Self { http_client, api_key })
    }

    /// Validate a canonical phone number.
    ///
    /// This provider expects the number without its `+` prefix.
    pub async fn validate(&self, canonical: &str) -> Result<NumverifyData, NumverifyError> {
        let number = canonical.strip_prefix('+').unwrap_or(canonical);

        tracing::debug!(number = number, "Querying Numverify API");

        let response = self
            .http_client
            .get(NUMVERIFY_BASE_URL)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("number", number),
                ("format", "1"),
            ])
            .send()
            .await
            .map_err(|e| NumverifyError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NumverifyError::NetworkError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NumverifyError::NetworkError(e.to_string()))?;

        parse_body(&body)
    }
}

/// Decode a response body, mapping the provider's error envelope to
/// [`NumverifyError::ApiError`].
fn parse_body(body: &str) -> Result<NumverifyData, NumverifyError> {
    let response: NumverifyResponse =
        serde_json::from_str(body).map_err(|e| NumverifyError::ParseError(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(NumverifyError::ApiError {
            code: error.code.unwrap_or(0),
            info: error.info.unwrap_or_default(),
        });
    }

    Ok(NumverifyData {
        valid: response.valid,
        line_type: response.line_type,
        carrier: response.carrier,
    })
}
