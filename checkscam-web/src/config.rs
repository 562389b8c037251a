//! Provider API key resolution for checkscam-web
//!
//! Multi-tier resolution with Database -> ENV -> TOML priority. Keys are
//! optional everywhere: a missing key degrades the phone check to its
//! default verdict instead of refusing to start.

use checkscam_common::config::TomlConfig;
use checkscam_common::db::settings;
use checkscam_common::Result;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

/// Resolve the Numverify access key (Database -> ENV -> TOML)
pub async fn resolve_numverify_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    Ok(resolve_key(
        "Numverify",
        settings::get_numverify_api_key(db).await?,
        std::env::var("CHECKSCAM_NUMVERIFY_API_KEY").ok(),
        toml_config.numverify_api_key.clone(),
    ))
}

/// Resolve the Veriphone API key (Database -> ENV -> TOML)
pub async fn resolve_veriphone_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    Ok(resolve_key(
        "Veriphone",
        settings::get_veriphone_api_key(db).await?,
        std::env::var("CHECKSCAM_VERIPHONE_API_KEY").ok(),
        toml_config.veriphone_api_key.clone(),
    ))
}

fn resolve_key(
    provider: &str,
    db_key: Option<String>,
    env_key: Option<String>,
    toml_key: Option<String>,
) -> Option<String> {
    let mut sources = Vec::new();
    if db_key.as_deref().is_some_and(is_valid_key) {
        sources.push("database");
    }
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }
    if toml_key.as_deref().is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    // Multiple sources usually means a stale leftover somewhere.
    if sources.len() > 1 {
        warn!(
            "{} API key found in multiple sources: {}. Using {} (highest priority).",
            provider,
            sources.join(", "),
            sources[0]
        );
    }

    match sources.first() {
        Some(&source) => {
            info!("{} API key loaded from {}", provider, source);
            let key = match source {
                "database" => db_key,
                "environment" => env_key,
                _ => toml_key,
            };
            key.filter(|k| is_valid_key(k))
        }
        None => {
            warn!(
                "{} API key not configured (settings table, CHECKSCAM_{}_API_KEY, or TOML)",
                provider,
                provider.to_uppercase()
            );
            None
        }
    }
}

/// Validate an API key (non-empty, non-whitespace)
fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
