//! Veriphone API client
//!
//! The risk-signal source: its `risk_level` field is the only explicit
//! provider risk flag in the pipeline. Carrier/line-type fields from this
//! provider only fill slots Numverify left at `Unknown`.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const VERIPHONE_BASE_URL: &str = "https://api.veriphone.io/v2/verify";

/// Bounded per-request timeout; a timeout counts as a transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Veriphone client errors
#[derive(Debug, Error)]
pub enum VeriphoneError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Raw response envelope. A usable payload has `status == "success"`;
/// anything else (including an `error` string) is no-data.
#[derive(Debug, Clone, Deserialize)]
struct VeriphoneResponse {
    status: Option<String>,
    phone_type: Option<String>,
    carrier: Option<String>,
    risk_level: Option<String>,
    is_valid: Option<bool>,
    error: Option<String>,
}

/// Verification fields from a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VeriphoneData {
    pub is_valid: bool,
    pub phone_type: Option<String>,
    pub carrier: Option<String>,
    /// "high" | "medium" | "low", absent when the provider has no opinion
    pub risk_level: Option<String>,
}

/// Veriphone API client
pub struct VeriphoneClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl VeriphoneClient {
    pub fn new(api_key: String) -> Result<Self, VeriphoneError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VeriphoneError::NetworkError(e.to_string()))?;

        Ok(Self { http_client, api_key })
    }

    /// Verify a canonical phone number.
    ///
    /// This provider expects the `+`-prefixed international form.
    pub async fn verify(&self, canonical: &str) -> Result<VeriphoneData, VeriphoneError> {
        tracing::debug!(phone = canonical, "Querying Veriphone API");

        let response = self
            .http_client
            .get(VERIPHONE_BASE_URL)
            .query(&[("key", self.api_key.as_str()), ("phone", canonical)])
            .send()
            .await
            .map_err(|e| VeriphoneError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VeriphoneError::NetworkError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VeriphoneError::NetworkError(e.to_string()))?;

        parse_body(&body)
    }
}

/// Decode a response body. Only `status == "success"` envelopes yield data.
fn parse_body(body: &str) -> Result<VeriphoneData, VeriphoneError> {
    let response: VeriphoneResponse =
        serde_json::from_str(body).map_err(|e| VeriphoneError::ParseError(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(VeriphoneError::ApiError(error));
    }

    if response.status.as_deref() != Some("success") {
        return Err(VeriphoneError::ApiError(format!(
            "unexpected status: {}",
            response.status.as_deref().unwrap_or("<missing>")
        )));
    }

    Ok(VeriphoneData {
        is_valid: response.is_valid.unwrap_or(false),
        phone_type: response.phone_type,
        carrier: response.carrier,
        risk_level: response.risk_level,
    })
}
