// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::defaults::*;
use crate::consts::{
    ENV_API_BASE_URL, ENV_CONFIG_PATH, ENV_DB_KEY, ENV_DB_PATH, ENV_FRONTEND_URL,
    ENV_REFERENCE_KEY,
};
use crate::error::ConfigError;

/// Raw configuration as read from TOML. Validate with
/// [`Settings::from_config`](super::Settings::from_config) before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keys: Keys,
    pub paths: Paths,
    pub urls: Urls,
    pub issuance: Issuance,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Keys {
    /// 64 hex characters; `PDF_ENCRYPTION_KEY` takes precedence
    pub reference_key: Option<String>,
    /// SQLCipher passphrase for the certificate database
    pub database_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub database: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Urls {
    /// Base of the public verification page
    pub frontend_url: String,
    /// Base of the PDF download API
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Issuance {
    pub max_attempts: u32,
}

impl Default for Paths {
    fn default() -> Self {
        default_paths()
    }
}

impl Default for Urls {
    fn default() -> Self {
        default_urls()
    }
}

impl Default for Issuance {
    fn default() -> Self {
        default_issuance()
    }
}

/// Load the configuration file (if any) and apply environment overrides.
///
/// Lookup order: `$CERTVAULT_CONFIG`, `./certvault.toml`, then
/// `<config dir>/certificate-vault/config.toml`. A missing file falls back to
/// built-in defaults; an unreadable or invalid one is an error.
pub fn load() -> Result<Config, ConfigError> {
    let conf = match config_path() {
        Some(path) => load_from(&path)?,
        None => {
            warn!("no configuration file found, using built-in defaults");
            Config::default()
        }
    };

    Ok(apply_overrides(conf, |name| std::env::var(name).ok()))
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading configuration");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply environment-style overrides through `lookup`, so callers (and
/// tests) decide where values come from.
pub fn apply_overrides<F>(mut conf: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_REFERENCE_KEY) {
        conf.keys.reference_key = Some(key);
    }
    if let Some(key) = lookup(ENV_DB_KEY) {
        conf.keys.database_key = Some(key);
    }
    if let Some(path) = lookup(ENV_DB_PATH) {
        conf.paths.database = PathBuf::from(path);
    }
    if let Some(url) = lookup(ENV_FRONTEND_URL) {
        conf.urls.frontend_url = url;
    }
    if let Some(url) = lookup(ENV_API_BASE_URL) {
        conf.urls.api_base_url = url;
    }
    conf
}

fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(explicit));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
        .filter(|path| path.exists())
}
