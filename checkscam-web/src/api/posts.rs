//! Scam report listing, detail, JSON submission and moderation

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use checkscam_common::db::models::{ScamImage, ScamPost};
use checkscam_common::db::settings;

use crate::db::posts;
use crate::pagination::calculate_pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Paginated listing response
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub posts: Vec<ScamPost>,
}

/// GET /api/posts?page=N
///
/// Approved reports, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, PostError> {
    let page_size = settings::get_report_page_size(&state.db)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    let total_results = posts::count_approved(&state.db)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    let pagination = calculate_pagination(total_results, query.page, page_size);

    let page_posts = posts::list_approved(&state.db, page_size, pagination.offset)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    Ok(Json(PostListResponse {
        total_results,
        page: pagination.page,
        page_size,
        total_pages: pagination.total_pages,
        posts: page_posts,
    }))
}

/// GET /api/moderation/pending  (moderator)
///
/// The moderation queue, oldest first.
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, PostError> {
    let pending = posts::list_pending(&state.db)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    Ok(Json(json!({ "posts": pending })))
}

/// Report detail with attached evidence images
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: ScamPost,
    pub images: Vec<ScamImage>,
}

/// GET /api/posts/:guid
pub async fn get_post(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<PostDetailResponse>, PostError> {
    let post = posts::fetch_post(&state.db, &guid)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?
        .ok_or(PostError::NotFound)?;

    let images = posts::fetch_images(&state.db, &guid)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    Ok(Json(PostDetailResponse { post, images }))
}

/// JSON report submission (no images)
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub name: String,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub description: String,
}

/// POST /api/posts
///
/// Creates a pending report awaiting moderation.
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Response, PostError> {
    if request.name.trim().is_empty() || request.description.trim().is_empty() {
        return Err(PostError::Validation(
            "Name and description are required".to_string(),
        ));
    }

    let guid = posts::insert_pending(
        &state.db,
        &posts::NewPost {
            name: request.name.trim(),
            bank_account: request.bank_account.as_deref().filter(|s| !s.trim().is_empty()),
            phone: request.phone.as_deref().filter(|s| !s.trim().is_empty()),
            description: request.description.trim(),
            line_type: None,
            carrier: None,
        },
    )
    .await
    .map_err(|e| PostError::Database(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(json!({ "guid": guid }))).into_response())
}

/// POST /api/posts/:guid/approve  (moderator)
pub async fn approve_post(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<serde_json::Value>, PostError> {
    let approved = posts::approve(&state.db, &guid)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?;

    if !approved {
        return Err(PostError::NotFound);
    }

    info!(guid = %guid, "Report approved");
    Ok(Json(json!({ "approved": guid })))
}

/// POST /api/posts/:guid/delete  (moderator)
///
/// Removes the report, its image rows and the image files on disk. File
/// removal is best effort; a missing file is not an error.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<serde_json::Value>, PostError> {
    let (post, images) = posts::delete(&state.db, &guid)
        .await
        .map_err(|e| PostError::Database(e.to_string()))?
        .ok_or(PostError::NotFound)?;

    for image in &images {
        let relative = image.image_path.trim_start_matches("/media/");
        let file_path = state.media_root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&file_path).await {
            warn!(path = %file_path.display(), "Could not remove image file: {}", e);
        }
    }

    info!(guid = %guid, name = %post.name, images = images.len(), "Report deleted");
    Ok(Json(json!({ "deleted": post.name })))
}

/// Post handler errors
#[derive(Debug)]
pub enum PostError {
    NotFound,
    Validation(String),
    Database(String),
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PostError::NotFound => (StatusCode::NOT_FOUND, "Report not found".to_string()),
            PostError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            PostError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
