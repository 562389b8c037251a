//! Settings database operations
//!
//! Get/set accessors for the settings table following the key-value pattern.
//! Provider API keys stored here take precedence over the environment and
//! the TOML config file.

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Get Numverify access key from database
///
/// Returns Some(key) if present, None if not set
pub async fn get_numverify_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, "numverify_api_key").await
}

/// Set Numverify access key in database
pub async fn set_numverify_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, "numverify_api_key", key).await
}

/// Get Veriphone API key from database
pub async fn get_veriphone_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, "veriphone_api_key").await
}

/// Set Veriphone API key in database
pub async fn set_veriphone_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, "veriphone_api_key", key).await
}

/// Session lifetime in seconds
///
/// Default: 14 days
pub async fn get_session_timeout_seconds(db: &Pool<Sqlite>) -> Result<i64> {
    get_setting(db, "session_timeout_seconds")
        .await
        .map(|opt| opt.unwrap_or(1_209_600))
}

/// Rows per page for the public report listing
///
/// Default: 20
pub async fn get_report_page_size(db: &Pool<Sqlite>) -> Result<i64> {
    get_setting(db, "report_page_size").await.map(|opt| opt.unwrap_or(20))
}

/// Generic setting getter (internal)
async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value {
        Some((Some(raw),)) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Internal(format!("Setting '{}' unparseable: {}", key, e))),
        _ => Ok(None),
    }
}

/// Generic setting setter (internal)
async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::init::create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let pool = setup_test_db().await;
        assert_eq!(get_numverify_api_key(&pool).await.unwrap(), None);
        assert_eq!(get_veriphone_api_key(&pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let pool = setup_test_db().await;

        set_numverify_api_key(&pool, "nv_key".to_string()).await.unwrap();
        set_veriphone_api_key(&pool, "vp_key".to_string()).await.unwrap();

        assert_eq!(
            get_numverify_api_key(&pool).await.unwrap(),
            Some("nv_key".to_string())
        );
        assert_eq!(
            get_veriphone_api_key(&pool).await.unwrap(),
            Some("vp_key".to_string())
        );

        // Overwrite is an upsert, not a duplicate row.
        set_numverify_api_key(&pool, "nv_key2".to_string()).await.unwrap();
        assert_eq!(
            get_numverify_api_key(&pool).await.unwrap(),
            Some("nv_key2".to_string())
        );
    }

    #[tokio::test]
    async fn numeric_settings_fall_back_to_defaults() {
        let pool = setup_test_db().await;
        assert_eq!(get_session_timeout_seconds(&pool).await.unwrap(), 1_209_600);
        assert_eq!(get_report_page_size(&pool).await.unwrap(), 20);
    }
}
