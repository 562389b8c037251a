//! Scam report queries
//!
//! All reads against the public surface filter on approved status; pending
//! reports are only reachable through the moderation endpoints.

use checkscam_common::db::models::{ScamImage, ScamPost, STATUS_APPROVED, STATUS_PENDING};
use checkscam_common::phone::PhoneVerdict;
use checkscam_common::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

const POST_COLUMNS: &str = "guid, name, bank_account, phone, description, status, \
     line_type, carrier, risk_level, created_at, updated_at";

/// Fields for a user-submitted report
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub name: &'a str,
    pub bank_account: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub description: &'a str,
    pub line_type: Option<&'a str>,
    pub carrier: Option<&'a str>,
}

/// Curated lookup: the first approved report matching the phone exactly
pub async fn find_approved_by_phone(db: &Pool<Sqlite>, phone: &str) -> Result<Option<ScamPost>> {
    let post = sqlx::query_as::<_, ScamPost>(&format!(
        "SELECT {} FROM scam_posts WHERE phone = ? AND status = ? ORDER BY created_at ASC LIMIT 1",
        POST_COLUMNS
    ))
    .bind(phone)
    .bind(STATUS_APPROVED)
    .fetch_optional(db)
    .await?;

    Ok(post)
}

pub async fn count_approved(db: &Pool<Sqlite>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scam_posts WHERE status = ?")
        .bind(STATUS_APPROVED)
        .fetch_one(db)
        .await?;

    Ok(count)
}

/// Approved reports, newest first
pub async fn list_approved(db: &Pool<Sqlite>, limit: i64, offset: i64) -> Result<Vec<ScamPost>> {
    let posts = sqlx::query_as::<_, ScamPost>(&format!(
        "SELECT {} FROM scam_posts WHERE status = ?
         ORDER BY created_at DESC, guid DESC LIMIT ? OFFSET ?",
        POST_COLUMNS
    ))
    .bind(STATUS_APPROVED)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

/// Reports awaiting moderation, oldest first
pub async fn list_pending(db: &Pool<Sqlite>) -> Result<Vec<ScamPost>> {
    let posts = sqlx::query_as::<_, ScamPost>(&format!(
        "SELECT {} FROM scam_posts WHERE status = ? ORDER BY created_at ASC",
        POST_COLUMNS
    ))
    .bind(STATUS_PENDING)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

pub async fn fetch_post(db: &Pool<Sqlite>, guid: &str) -> Result<Option<ScamPost>> {
    let post = sqlx::query_as::<_, ScamPost>(&format!(
        "SELECT {} FROM scam_posts WHERE guid = ?",
        POST_COLUMNS
    ))
    .bind(guid)
    .fetch_optional(db)
    .await?;

    Ok(post)
}

pub async fn fetch_images(db: &Pool<Sqlite>, post_guid: &str) -> Result<Vec<ScamImage>> {
    let images = sqlx::query_as::<_, ScamImage>(
        "SELECT guid, post_guid, image_path, created_at
         FROM scam_images WHERE post_guid = ? ORDER BY created_at ASC",
    )
    .bind(post_guid)
    .fetch_all(db)
    .await?;

    Ok(images)
}

/// Insert a user-submitted report in pending status. Returns the new guid.
pub async fn insert_pending(db: &Pool<Sqlite>, post: &NewPost<'_>) -> Result<String> {
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO scam_posts (guid, name, bank_account, phone, description, status, line_type, carrier)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(post.name)
    .bind(post.bank_account)
    .bind(post.phone)
    .bind(post.description)
    .bind(STATUS_PENDING)
    .bind(post.line_type)
    .bind(post.carrier)
    .execute(db)
    .await?;

    Ok(guid)
}

pub async fn insert_image(db: &Pool<Sqlite>, post_guid: &str, image_path: &str) -> Result<()> {
    sqlx::query("INSERT INTO scam_images (guid, post_guid, image_path) VALUES (?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(post_guid)
        .bind(image_path)
        .execute(db)
        .await?;

    Ok(())
}

/// Persist a curated record derived from a valid phone-check verdict.
///
/// The caller guarantees the verdict is valid; invalid numbers are never
/// stored.
pub async fn insert_auto_curated(
    db: &Pool<Sqlite>,
    phone: &str,
    verdict: &PhoneVerdict,
) -> Result<ScamPost> {
    let guid = Uuid::new_v4().to_string();
    let name = format!("Automated check for {}", phone);
    let description = format!(
        "Validator data: line type {}, carrier {}, risk {}",
        verdict.reputation.line_type, verdict.reputation.carrier, verdict.risk_level
    );

    sqlx::query(
        "INSERT INTO scam_posts (guid, name, phone, description, status, line_type, carrier, risk_level)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(&name)
    .bind(phone)
    .bind(&description)
    .bind(STATUS_APPROVED)
    .bind(&verdict.reputation.line_type)
    .bind(&verdict.reputation.carrier)
    .bind(verdict.risk_level.as_str())
    .execute(db)
    .await?;

    fetch_post(db, &guid)
        .await?
        .ok_or_else(|| checkscam_common::Error::Internal("Curated record vanished".to_string()))
}

/// Approve a pending report. Returns false when no such report exists.
pub async fn approve(db: &Pool<Sqlite>, guid: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE scam_posts SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(STATUS_APPROVED)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a report and its image rows; the caller removes the files.
/// Returns the deleted post with its images, or None.
pub async fn delete(db: &Pool<Sqlite>, guid: &str) -> Result<Option<(ScamPost, Vec<ScamImage>)>> {
    let Some(post) = fetch_post(db, guid).await? else {
        return Ok(None);
    };
    let images = fetch_images(db, guid).await?;

    sqlx::query("DELETE FROM scam_images WHERE post_guid = ?")
        .bind(guid)
        .execute(db)
        .await?;
    sqlx::query("DELETE FROM scam_posts WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    Ok(Some((post, images)))
}

/// Upsert one feed entry by name, always landing in approved status.
pub async fn upsert_feed_entry(
    db: &Pool<Sqlite>,
    name: &str,
    bank_account: Option<&str>,
    phone: Option<&str>,
    description: &str,
) -> Result<()> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT guid FROM scam_posts WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(db)
            .await?;

    match existing {
        Some((guid,)) => {
            sqlx::query(
                "UPDATE scam_posts
                 SET bank_account = ?, phone = ?, description = ?, status = ?,
                     updated_at = CURRENT_TIMESTAMP
                 WHERE guid = ?",
            )
            .bind(bank_account)
            .bind(phone)
            .bind(description)
            .bind(STATUS_APPROVED)
            .bind(&guid)
            .execute(db)
            .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO scam_posts (guid, name, bank_account, phone, description, status)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(bank_account)
            .bind(phone)
            .bind(description)
            .bind(STATUS_APPROVED)
            .execute(db)
            .await?;
        }
    }

    Ok(())
}
