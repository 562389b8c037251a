//! Generative scam-feed import (moderator)
//!
//! Pulls documented scam cases from the oracle and upserts them into the
//! curated list, keyed by case name.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::db::posts;
use crate::services::scam_oracle::OracleError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub imported: usize,
}

/// POST /api/feed/fetch  (moderator)
pub async fn fetch_feed(State(state): State<AppState>) -> Result<Json<FeedResponse>, FeedError> {
    let entries = state.oracle.fetch_feed().await.map_err(FeedError::Oracle)?;

    let mut imported = 0;
    for entry in entries {
        let name = entry.name.trim();
        if name.is_empty() {
            continue;
        }

        let phone = entry
            .phone_number
            .as_deref()
            .map(sanitize_phone_digits)
            .filter(|digits| !digits.is_empty());

        posts::upsert_feed_entry(
            &state.db,
            name,
            entry.bank_account.as_deref().filter(|s| !s.trim().is_empty()),
            phone.as_deref(),
            entry.description.as_deref().unwrap_or(""),
        )
        .await
        .map_err(|e| FeedError::Database(e.to_string()))?;

        imported += 1;
    }

    info!(imported, "Scam feed import complete");
    Ok(Json(FeedResponse { imported }))
}

/// Keep only digits; feed entries arrive in arbitrary prose formats.
fn sanitize_phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Feed import errors
#[derive(Debug)]
pub enum FeedError {
    Oracle(OracleError),
    Database(String),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            FeedError::Oracle(e) => {
                (StatusCode::BAD_GATEWAY, format!("Feed source error: {}", e))
            }
            FeedError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_digits_only() {
        assert_eq!(sanitize_phone_digits("097-200 9161"), "0972009161");
        assert_eq!(sanitize_phone_digits("+84 972 009 161"), "84972009161");
        assert_eq!(sanitize_phone_digits("none reported"), "");
    }
}
