//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML configuration file contents (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root data folder (database + uploaded media)
    pub root_folder: Option<String>,
    /// Numverify access key (lowest-priority source)
    pub numverify_api_key: Option<String>,
    /// Veriphone API key (lowest-priority source)
    pub veriphone_api_key: Option<String>,
}

/// Resolve the root data folder.
///
/// Priority order:
/// 1. Explicit override (CLI flag or CHECKSCAM_ROOT_FOLDER, both handled by
///    the binary's argument parser)
/// 2. `root_folder` from the TOML config file
/// 3. OS-dependent default data directory
pub fn resolve_root_folder(override_path: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = override_path {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Load the TOML config file, best effort.
///
/// A missing or unparseable file degrades to the empty config; the service
/// must come up without any configuration present.
pub fn load_toml_config() -> TomlConfig {
    match read_toml_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!("No usable TOML config: {}", e);
            TomlConfig::default()
        }
    }
}

fn read_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse failed for {}: {}", path.display(), e)))
}

/// Locate the configuration file for the platform.
///
/// Linux additionally falls back to /etc/checkscam/config.toml for
/// system-wide installs.
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("checkscam").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/checkscam/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("checkscam"))
        .unwrap_or_else(|| PathBuf::from("./checkscam_data"))
}

/// Database file location inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("checkscam.db")
}

/// Directory served under /media (uploaded evidence images live in the
/// scam_images subdirectory)
pub fn media_root(root_folder: &Path) -> PathBuf {
    root_folder.join("media")
}

/// Upload target for report evidence images
pub fn scam_images_dir(root_folder: &Path) -> PathBuf {
    media_root(root_folder).join("scam_images")
}
