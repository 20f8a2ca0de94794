// src/config/defaults.rs
use crate::config::app::{Issuance, Paths, Urls};
use crate::consts::DEFAULT_MAX_ISSUANCE_ATTEMPTS;

pub const DEFAULT_CONFIG_FILE: &str = "certvault.toml";
pub const CONFIG_DIR_NAME: &str = "certificate-vault";

pub const DEFAULT_DATABASE: &str = "data/certvault.db";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

pub fn default_paths() -> Paths {
    Paths {
        database: DEFAULT_DATABASE.into(),
    }
}

pub fn default_urls() -> Urls {
    Urls {
        frontend_url: DEFAULT_FRONTEND_URL.into(),
        api_base_url: DEFAULT_API_BASE_URL.into(),
    }
}

pub fn default_issuance() -> Issuance {
    Issuance {
        max_attempts: DEFAULT_MAX_ISSUANCE_ATTEMPTS,
    }
}
