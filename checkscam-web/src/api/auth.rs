//! Session authentication
//!
//! Register/login/logout handlers plus the middleware layers protecting the
//! report and moderation routes. Sessions are opaque bearer tokens issued at
//! login and resolved against the sessions table on every protected request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use checkscam_common::db::models::SessionUser;
use checkscam_common::db::users;
use checkscam_common::Error;

use crate::AppState;

/// Registration request. Two password fields, matching the signup form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
    pub is_moderator: bool,
}

/// POST /api/auth/register
///
/// Validates the form, creates the account and logs the user straight in.
/// The reserved username "admin" becomes a moderator.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password1.is_empty()
        || request.password2.is_empty()
    {
        return Err(AuthError::Validation("All fields are required".to_string()));
    }

    if request.password1 != request.password2 {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }

    if !is_plausible_email(&request.email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }

    let is_moderator = request.username.to_lowercase() == "admin";

    let user = users::create_user(
        &state.db,
        request.username.trim(),
        request.email.trim(),
        &request.password1,
        is_moderator,
    )
    .await
    .map_err(|e| match e {
        Error::InvalidInput(msg) => AuthError::Conflict(msg),
        other => AuthError::Internal(other.to_string()),
    })?;

    info!(username = %user.username, is_moderator, "User registered");

    issue_session(&state, user).await
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    let user = users::verify_credentials(&state.db, &request.username, &request.password)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::BadCredentials)?;

    issue_session(&state, user).await
}

/// POST /api/auth/logout
///
/// Deletes the presented session. A missing or unknown token is still a
/// successful logout.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    if let Some(token) = bearer_token(&headers) {
        users::delete_session(&state.db, token)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
    }

    Ok(Json(json!({ "logged_out": true })))
}

async fn issue_session(
    state: &AppState,
    user: SessionUser,
) -> Result<Json<SessionResponse>, AuthError> {
    let token = users::create_session(&state.db, &user.guid)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    Ok(Json(SessionResponse {
        token,
        username: user.username,
        is_moderator: user.is_moderator,
    }))
}

/// Middleware: any logged-in user
///
/// Resolves the bearer token and attaches the [`SessionUser`] as a request
/// extension for the handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Middleware: moderators only
pub async fn require_moderator(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&state, request.headers()).await?;
    if !user.is_moderator {
        return Err(AuthError::Forbidden);
    }
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<SessionUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;

    users::session_user(&state.db, token)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidSession)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Plausibility check mirroring `local@host.tld` with no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidSession,
    BadCredentials,
    Forbidden,
    Validation(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "Missing bearer token".to_string())
            }
            AuthError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired session".to_string())
            }
            AuthError::BadCredentials => {
                (StatusCode::UNAUTHORIZED, "Wrong username or password".to_string())
            }
            AuthError::Forbidden => {
                (StatusCode::FORBIDDEN, "Moderator access required".to_string())
            }
            AuthError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Authentication error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
