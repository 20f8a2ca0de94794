// src/config/settings.rs
//! Validated, typed settings built once at start-up
//!
//! Construction fails fast on a missing or malformed reference key; nothing
//! downstream re-reads the environment.

use std::path::PathBuf;

use crate::config::app::Config;
use crate::core::{CertificateId, ReferenceKey};
use crate::error::ConfigError;
use crate::records::{PdfLinks, PdfRecord};

#[derive(Debug)]
pub struct Settings {
    pub reference_key: ReferenceKey,
    pub database: DatabaseSettings,
    pub issuance: IssuancePolicy,
    pub pdf_links: PdfLinkBase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub key: Option<String>,
}

/// Where verification links point and how hard issuance tries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuancePolicy {
    pub frontend_url: String,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLinkBase {
    pub api_base_url: String,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let reference_key = match config.keys.reference_key.as_deref().map(str::trim) {
            Some(hex_key) if !hex_key.is_empty() => ReferenceKey::from_hex(hex_key)?,
            _ => return Err(ConfigError::MissingReferenceKey),
        };

        if config.issuance.max_attempts == 0 {
            return Err(ConfigError::NoIssuanceAttempts);
        }

        Ok(Self {
            reference_key,
            database: DatabaseSettings {
                path: config.paths.database.clone(),
                key: config
                    .keys
                    .database_key
                    .clone()
                    .filter(|key| !key.is_empty()),
            },
            issuance: IssuancePolicy {
                frontend_url: trim_base(&config.urls.frontend_url),
                max_attempts: config.issuance.max_attempts,
            },
            pdf_links: PdfLinkBase {
                api_base_url: trim_base(&config.urls.api_base_url),
            },
        })
    }
}

impl IssuancePolicy {
    /// Public page a printed QR code sends verifiers to
    pub fn verification_url(&self, certificate_id: &CertificateId) -> String {
        format!("{}/verify-certificate/{certificate_id}", self.frontend_url)
    }
}

impl PdfLinkBase {
    pub fn links_for(&self, record: &PdfRecord) -> PdfLinks {
        PdfLinks {
            pdf_url: format!(
                "{}/api/pdf/{}",
                self.api_base_url,
                urlencoding::encode(&record.filename)
            ),
            download_url: format!("{}/api/pdf/by-id/{}", self.api_base_url, record.internal_id),
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::app::apply_overrides;

    const KEY: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b2";

    fn with_env(vars: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        apply_overrides(Config::default(), |name| env.get(name).cloned())
    }

    #[test]
    fn missing_key_prevents_start() {
        let err = Settings::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReferenceKey));

        let err = Settings::from_config(&with_env(&[("PDF_ENCRYPTION_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReferenceKey));
    }

    #[test]
    fn malformed_key_prevents_start() {
        let short = &KEY[..63];
        let err = Settings::from_config(&with_env(&[("PDF_ENCRYPTION_KEY", short)])).unwrap_err();
        assert!(matches!(err, ConfigError::ReferenceKeyLength { actual: 63, .. }));

        let not_hex = KEY.replace('a', "x");
        let err =
            Settings::from_config(&with_env(&[("PDF_ENCRYPTION_KEY", &not_hex)])).unwrap_err();
        assert!(matches!(err, ConfigError::ReferenceKeyNotHex));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut conf = Config::default();
        conf.keys.reference_key = Some("00".repeat(32));
        let env: HashMap<&str, &str> = [
            ("PDF_ENCRYPTION_KEY", KEY),
            ("FRONTEND_URL", "https://certs.example.org/"),
            ("CERTVAULT_DB", "/var/lib/certvault/certs.db"),
        ]
        .into_iter()
        .collect();
        let conf = apply_overrides(conf, |name| env.get(name).map(|v| v.to_string()));

        let settings = Settings::from_config(&conf).unwrap();
        assert_eq!(settings.reference_key.to_hex(), KEY);
        assert_eq!(settings.issuance.frontend_url, "https://certs.example.org");
        assert_eq!(
            settings.database.path,
            PathBuf::from("/var/lib/certvault/certs.db")
        );
        assert_eq!(settings.database.key, None);
    }

    #[test]
    fn zero_issuance_attempts_is_rejected() {
        let mut conf = with_env(&[("PDF_ENCRYPTION_KEY", KEY)]);
        conf.issuance.max_attempts = 0;
        assert!(matches!(
            Settings::from_config(&conf),
            Err(ConfigError::NoIssuanceAttempts)
        ));
    }

    #[test]
    fn verification_url_uses_frontend_base() {
        let policy = IssuancePolicy {
            frontend_url: "https://certs.example.org".into(),
            max_attempts: 5,
        };
        let id = CertificateId::parse("a1b2c3d4e5f67890").unwrap();
        assert_eq!(
            policy.verification_url(&id),
            "https://certs.example.org/verify-certificate/a1b2c3d4e5f67890"
        );
    }
}
