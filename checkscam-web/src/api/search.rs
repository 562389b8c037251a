//! Phone number search
//!
//! The core flow: curated database first, then the live multi-provider
//! check, with valid live results persisted back into the curated list.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use checkscam_common::db::models::ScamPost;
use checkscam_common::phone::{self, PhoneReputation, PhoneVerdict, RiskLevel, UNKNOWN};

use crate::db::posts;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Phone number, any format
    pub q: Option<String>,
    /// Set to 0 to skip the generative oracle
    #[serde(default = "default_oracle")]
    pub oracle: i64,
}

fn default_oracle() -> i64 {
    1
}

/// Search response: the verdict plus the matched (or newly curated) report
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// "curated" when the answer came from the database, "live" otherwise
    pub source: &'static str,
    pub verdict: PhoneVerdict,
    /// True for Medium/High verdicts; the UI renders a caution banner
    pub warning: bool,
    pub post: Option<ScamPost>,
}

/// GET /api/search?q=PHONE[&oracle=0]
///
/// 1. Exact match against approved reports wins outright.
/// 2. Otherwise both validators are consulted (and the oracle, unless
///    disabled); a valid verdict is persisted as a curated record.
/// 3. Invalid numbers are never stored, but the verdict still renders.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, SearchError> {
    let q = params.q.unwrap_or_default().trim().to_string();
    if q.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    // Curated hit: answer from storage, no provider calls.
    if let Some(post) = posts::find_approved_by_phone(&state.db, &q)
        .await
        .map_err(|e| SearchError::DatabaseError(e.to_string()))?
    {
        let verdict = verdict_from_record(&post);
        info!(query = %q, risk = %verdict.risk_level, "Search served from curated list");
        return Ok(Json(SearchResponse {
            warning: verdict.warrants_warning(),
            query: q,
            source: "curated",
            verdict,
            post: Some(post),
        }));
    }

    // Live check across both validators.
    let mut verdict = state.phone_check.assess(&q).await;

    if params.oracle != 0 {
        let canonical = phone::normalize(&q);
        let confirmed = state.oracle.check_phone(&canonical).await;
        verdict.apply_oracle(confirmed);
    }

    // Only valid numbers enter the curated list.
    let post = if verdict.reputation.is_valid {
        let created = posts::insert_auto_curated(&state.db, &q, &verdict)
            .await
            .map_err(|e| SearchError::DatabaseError(e.to_string()))?;
        Some(created)
    } else {
        None
    };

    info!(
        query = %q,
        risk = %verdict.risk_level,
        persisted = post.is_some(),
        "Live phone check complete"
    );

    Ok(Json(SearchResponse {
        warning: verdict.warrants_warning(),
        query: q,
        source: "live",
        verdict,
        post,
    }))
}

/// Rebuild a verdict from a stored curated record.
///
/// Stored rows are known-valid by construction; the suspicion flag is a live
/// Validator-B signal and reads as false here.
fn verdict_from_record(post: &ScamPost) -> PhoneVerdict {
    let line_type = post
        .line_type
        .clone()
        .unwrap_or_else(|| UNKNOWN.to_string());

    let reputation = PhoneReputation {
        is_valid: true,
        is_virtual: phone::is_virtual_line_type(&line_type),
        line_type,
        carrier: post.carrier.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        is_suspicious: false,
        has_data: true,
    };

    PhoneVerdict {
        risk_level: RiskLevel::from_str_lossy(post.risk_level.as_deref().unwrap_or("Low")),
        reputation,
    }
}

/// Search errors
#[derive(Debug)]
pub enum SearchError {
    EmptyQuery,
    DatabaseError(String),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SearchError::EmptyQuery => {
                (StatusCode::BAD_REQUEST, "Empty search query".to_string())
            }
            SearchError::DatabaseError(msg) => {
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

    fn record(line_type: Option<&str>, carrier: Option<&str>, risk: Option<&str>) -> ScamPost {
        ScamPost {
            guid: "g".to_string(),
            name: "n".to_string(),
            bank_account: None,
            phone: Some("0972009161".to_string()),
            description: "d".to_string(),
            status: "approved".to_string(),
            line_type: line_type.map(str::to_string),
            carrier: carrier.map(str::to_string),
            risk_level: risk.map(str::to_string),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn stored_record_round_trips_to_verdict() {
        let verdict = verdict_from_record(&record(Some("mobile"), Some("Viettel"), Some("High")));
        assert!(verdict.reputation.is_valid);
        assert_eq!(verdict.reputation.line_type, "mobile");
        assert_eq!(verdict.reputation.carrier, "Viettel");
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(!verdict.reputation.is_suspicious);
        assert!(verdict.warrants_warning());
    }

    #[test]
    fn sparse_record_defaults_to_unknown_low() {
        let verdict = verdict_from_record(&record(None, None, None));
        assert_eq!(verdict.reputation.line_type, UNKNOWN);
        assert_eq!(verdict.reputation.carrier, UNKNOWN);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert!(!verdict.warrants_warning());
    }

    #[test]
    fn voip_record_reads_back_as_virtual() {
        let verdict = verdict_from_record(&record(Some("voip"), Some("X"), Some("High")));
        assert!(verdict.reputation.is_virtual);
    }
}
