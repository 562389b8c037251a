//! Generative-text oracle client
//!
//! Two uses of the same endpoint: a per-number yes/no scam check consulted
//! during search, and a bulk feed of documented scam cases that moderators
//! can import into the curated list.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const ORACLE_ENDPOINT: &str = "https://api.gemini.ai/v1/generate";

/// Bounded per-request timeout; a timeout counts as a transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// News sources the oracle is asked to ground its answers in
const NEWS_SOURCES: &str = "https://vnexpress.net, https://tuoitre.vn, \
     https://thanhnien.vn, https://dantri.com.vn, https://vietnamnet.vn";

/// Oracle client errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One scam case from the bulk feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedScam {
    pub name: String,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Generative-text oracle client
pub struct ScamOracle {
    http_client: reqwest::Client,
}

impl ScamOracle {
    pub fn new() -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OracleError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Ask whether a phone number is a documented scam.
    ///
    /// Failures never propagate: a transport error, a non-200 status,
    /// malformed JSON or any answer other than the exact token "true" all
    /// read as `false`.
    pub async fn check_phone(&self, canonical: &str) -> bool {
        match self.ask(canonical).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                tracing::warn!("Scam oracle lookup failed: {}", e);
                false
            }
        }
    }

    async fn ask(&self, canonical: &str) -> Result<bool, OracleError> {
        let prompt = format!(
            "Check whether the phone number {} is involved in scams, based on \
             coverage from news sites such as {}. Return only true if there is \
             evidence, false otherwise.",
            canonical, NEWS_SOURCES
        );

        let body = self.post_prompt(&prompt).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| OracleError::ParseError(e.to_string()))?;

        Ok(is_affirmative(&value))
    }

    /// Fetch a batch of documented scam cases for the curated list.
    ///
    /// Unlike [`check_phone`], failures here surface to the caller: the
    /// moderator triggering the import should see why it failed.
    pub async fn fetch_feed(&self) -> Result<Vec<FeedScam>, OracleError> {
        let prompt = format!(
            "Return a JSON array of 3 documented scam cases as \
             [{{\"name\": ..., \"bank_account\": ..., \"phone_number\": ..., \
             \"description\": ...}}]. Only include cases with at least a phone \
             number or a bank account, drawn from news sites such as {}. \
             Return only the JSON, no surrounding text.",
            NEWS_SOURCES
        );

        let body = self.post_prompt(&prompt).await?;
        let entries: Vec<FeedScam> =
            serde_json::from_str(&body).map_err(|e| OracleError::ParseError(e.to_string()))?;

        tracing::info!(count = entries.len(), "Fetched scam feed from oracle");
        Ok(entries)
    }

    async fn post_prompt(&self, prompt: &str) -> Result<String, OracleError> {
        let response = self
            .http_client
            .post(ORACLE_ENDPOINT)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| OracleError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError(status.as_u16(), error_text));
        }

        response
            .text()
            .await
            .map_err(|e| OracleError::NetworkError(e.to_string()))
    }
}

/// The oracle returns a string-typed boolean. Only the exact token "true"
/// (case folded) counts; absence or any other value is `false`.
fn is_affirmative(body: &Value) -> bool {
    body.get("result")
        .and_then(|v| v.as_str())
        .map(|s| s.to_lowercase() == "true")
        .unwrap_or(false)
}
