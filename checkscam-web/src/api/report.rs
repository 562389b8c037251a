//! Authenticated report submission with evidence images
//!
//! Multipart form: text fields `name`, `bank_account`, `phone`,
//! `description` plus any number of `image` file parts. Images are
//! content-sniffed before they touch disk; declared file names and
//! content types are not trusted.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use checkscam_common::db::models::SessionUser;

use crate::db::posts;
use crate::AppState;

/// Accepted evidence image types (by sniffed content, not extension)
const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub guid: String,
    pub images: usize,
    /// Present when the reported number itself looks risky
    pub warning: Option<String>,
}

/// POST /api/report  (authenticated, multipart)
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    mut multipart: Multipart,
) -> Result<Response, ReportError> {
    let mut name = String::new();
    let mut bank_account = String::new();
    let mut phone = String::new();
    let mut description = String::new();
    let mut uploads: Vec<Vec<u8>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReportError::Upload(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = read_text(field).await?,
            "bank_account" => bank_account = read_text(field).await?,
            "phone" => phone = read_text(field).await?,
            "description" => description = read_text(field).await?,
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ReportError::Upload(e.to_string()))?;
                if !bytes.is_empty() {
                    uploads.push(bytes.to_vec());
                }
            }
            other => {
                warn!(field = other, "Ignoring unknown form field");
            }
        }
    }

    let name = name.trim().to_string();
    let description = description.trim().to_string();
    let phone = phone.trim().to_string();

    if name.is_empty() || description.is_empty() {
        return Err(ReportError::Validation(
            "Name and description are required".to_string(),
        ));
    }

    // Verify the reported number before accepting it. Affirmative evidence
    // of invalidity rejects the report; no data at all (providers down or
    // unconfigured) lets it through with Unknown fields.
    let mut line_type = None;
    let mut carrier = None;
    let mut warning = None;

    if !phone.is_empty() {
        let reputation = state.phone_check.check(&phone).await;

        if reputation.has_data && !reputation.is_valid {
            return Err(ReportError::InvalidPhone);
        }

        if reputation.is_suspicious {
            warning = Some("This number is flagged as risky by the validators".to_string());
        } else if reputation.line_type == "voip" {
            warning = Some("VoIP numbers carry elevated scam risk".to_string());
        }

        line_type = Some(reputation.line_type);
        carrier = Some(reputation.carrier);
    }

    let guid = posts::insert_pending(
        &state.db,
        &posts::NewPost {
            name: &name,
            bank_account: Some(bank_account.trim()).filter(|s| !s.is_empty()),
            phone: Some(phone.as_str()).filter(|s| !s.is_empty()),
            description: &description,
            line_type: line_type.as_deref(),
            carrier: carrier.as_deref(),
        },
    )
    .await
    .map_err(|e| ReportError::Database(e.to_string()))?;

    let image_count = uploads.len();
    for bytes in uploads {
        store_image(&state, &guid, &bytes).await?;
    }

    info!(
        guid = %guid,
        reporter = %user.username,
        images = image_count,
        "Report submitted for moderation"
    );

    let body = ReportResponse {
        guid,
        images: image_count,
        warning,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ReportError> {
    field
        .text()
        .await
        .map_err(|e| ReportError::Upload(e.to_string()))
}

/// Sniff, persist and record one evidence image.
async fn store_image(state: &AppState, post_guid: &str, bytes: &[u8]) -> Result<(), ReportError> {
    let kind = infer::get(bytes).ok_or(ReportError::UnsupportedImage)?;
    if !ACCEPTED_IMAGE_TYPES.contains(&kind.mime_type()) {
        return Err(ReportError::UnsupportedImage);
    }

    let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
    let file_path = state.images_dir.join(&file_name);

    tokio::fs::create_dir_all(&state.images_dir)
        .await
        .map_err(|e| ReportError::Storage(e.to_string()))?;
    tokio::fs::write(&file_path, bytes)
        .await
        .map_err(|e| ReportError::Storage(e.to_string()))?;

    let public_path = format!("/media/scam_images/{}", file_name);
    posts::insert_image(&state.db, post_guid, &public_path)
        .await
        .map_err(|e| ReportError::Database(e.to_string()))?;

    Ok(())
}

/// Report submission errors
#[derive(Debug)]
pub enum ReportError {
    Validation(String),
    InvalidPhone,
    UnsupportedImage,
    Upload(String),
    Storage(String),
    Database(String),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ReportError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ReportError::InvalidPhone => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The reported phone number is not a valid number".to_string(),
            ),
            ReportError::UnsupportedImage => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Evidence images must be JPEG, PNG, GIF or WebP".to_string(),
            ),
            ReportError::Upload(msg) => {
                (StatusCode::BAD_REQUEST, format!("Upload error: {}", msg))
            }
            ReportError::Storage(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {}", msg))
            }
            ReportError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
