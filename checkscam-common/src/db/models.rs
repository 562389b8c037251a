//! Database models

use serde::{Deserialize, Serialize};

/// Report status: awaiting moderation
pub const STATUS_PENDING: &str = "pending";
/// Report status: curated, publicly visible and searchable
pub const STATUS_APPROVED: &str = "approved";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// A scam report. Submitted by users (pending) or derived from a valid
/// phone-check verdict / the generative feed (approved).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScamPost {
    pub guid: String,
    /// Display name of the suspected scammer or scheme
    pub name: String,
    /// Reported bank account number, if any
    pub bank_account: Option<String>,
    /// Reported phone number as submitted (curated lookups match on this)
    pub phone: Option<String>,
    pub description: String,
    pub status: String,
    /// Line type from the validators at submission/check time
    pub line_type: Option<String>,
    /// Carrier from the validators at submission/check time
    pub carrier: Option<String>,
    /// Derived risk label ("Low"/"Medium"/"High") for curated lookups
    pub risk_level: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Uploaded evidence image attached to a report
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScamImage {
    pub guid: String,
    pub post_guid: String,
    /// Public path under /media
    pub image_path: String,
    pub created_at: String,
}

/// Authenticated user attached to a request by the session middleware
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionUser {
    pub guid: String,
    pub username: String,
    pub is_moderator: bool,
}
