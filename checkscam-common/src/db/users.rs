//! User accounts and session tokens
//!
//! Passwords are stored as SHA-256 of a per-user random salt concatenated
//! with the password. Sessions are opaque UUID tokens with an absolute
//! expiry; expired rows are deleted lazily on lookup.

use crate::db::models::SessionUser;
use crate::db::settings;
use crate::{Error, Result};
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Hash a password with the given salt (hex SHA-256 of salt + password)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a random 16-byte salt as hex
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create a user account. Fails with `InvalidInput` when the username or
/// email is already taken.
pub async fn create_user(
    db: &Pool<Sqlite>,
    username: &str,
    email: &str,
    password: &str,
    is_moderator: bool,
) -> Result<SessionUser> {
    if find_by_username(db, username).await?.is_some() {
        return Err(Error::InvalidInput("Username already taken".to_string()));
    }
    if email_exists(db, email).await? {
        return Err(Error::InvalidInput("Email already in use".to_string()));
    }

    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    sqlx::query(
        "INSERT INTO users (guid, username, email, password_hash, password_salt, is_moderator)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(username)
    .bind(email)
    .bind(&hash)
    .bind(&salt)
    .bind(is_moderator)
    .execute(db)
    .await?;

    Ok(SessionUser {
        guid,
        username: username.to_string(),
        is_moderator,
    })
}

/// Look up a user by username
pub async fn find_by_username(db: &Pool<Sqlite>, username: &str) -> Result<Option<SessionUser>> {
    let user = sqlx::query_as::<_, SessionUser>(
        "SELECT guid, username, is_moderator FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

async fn email_exists(db: &Pool<Sqlite>, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?;

    Ok(count > 0)
}

/// Check a username/password pair. Returns the user on success, None on any
/// mismatch (unknown user and wrong password are indistinguishable).
pub async fn verify_credentials(
    db: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<SessionUser>> {
    let row: Option<(String, String, String, String, bool)> = sqlx::query_as(
        "SELECT guid, username, password_hash, password_salt, is_moderator
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    let Some((guid, username, password_hash, password_salt, is_moderator)) = row else {
        return Ok(None);
    };

    if hash_password(password, &password_salt) != password_hash {
        return Ok(None);
    }

    Ok(Some(SessionUser {
        guid,
        username,
        is_moderator,
    }))
}

/// Open a session for the user. Lifetime comes from the
/// `session_timeout_seconds` setting.
pub async fn create_session(db: &Pool<Sqlite>, user_guid: &str) -> Result<String> {
    let timeout_seconds = settings::get_session_timeout_seconds(db).await?;
    let token = Uuid::new_v4().to_string();
    let expires_at = (Utc::now() + Duration::seconds(timeout_seconds)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (token, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(&expires_at)
        .execute(db)
        .await?;

    Ok(token)
}

/// Resolve a session token to its user. Expired sessions are removed and
/// read as None.
pub async fn session_user(db: &Pool<Sqlite>, token: &str) -> Result<Option<SessionUser>> {
    let row: Option<(String, String, bool, String)> = sqlx::query_as(
        "SELECT u.guid, u.username, u.is_moderator, s.expires_at
         FROM sessions s JOIN users u ON u.guid = s.user_guid
         WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let Some((guid, username, is_moderator, expires_at)) = row else {
        return Ok(None);
    };

    let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
        .map(|t| t < Utc::now())
        .unwrap_or(true);

    if expired {
        delete_session(db, token).await?;
        return Ok(None);
    }

    Ok(Some(SessionUser {
        guid,
        username,
        is_moderator,
    }))
}

/// Remove a session token (logout). Unknown tokens are a no-op.
pub async fn delete_session(db: &Pool<Sqlite>, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}
