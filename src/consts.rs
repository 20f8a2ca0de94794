// src/consts.rs
//! Shared constants: wire formats and security parameters

/// Random bytes behind a certificate id (rendered as 16 hex characters)
pub const CERTIFICATE_ID_BYTES: usize = 8;

/// Length of a certificate id in lowercase hex characters
pub const CERTIFICATE_ID_HEX_LEN: usize = CERTIFICATE_ID_BYTES * 2;

/// AES-256 key size
pub const REFERENCE_KEY_BYTES: usize = 32;

/// Length of the configured reference key in hex characters
pub const REFERENCE_KEY_HEX_LEN: usize = REFERENCE_KEY_BYTES * 2;

/// CBC initialization vector size (one AES block)
pub const IV_LENGTH: usize = 16;

/// Separates `hex(iv)` from `hex(ciphertext)` in a reference token
pub const TOKEN_SEPARATOR: char = ':';

/// Default bound on id regeneration after a unique-constraint collision
pub const DEFAULT_MAX_ISSUANCE_ATTEMPTS: u32 = 5;

/// KDF iterations applied when the certificate database is keyed with SQLCipher
pub const DB_KDF_ITERATIONS: u32 = 256_000;

/// Title stored for PDFs uploaded without one
pub const DEFAULT_PDF_TITLE: &str = "Untitled";

/// Environment variable names read at start-up
pub const ENV_CONFIG_PATH: &str = "CERTVAULT_CONFIG";
pub const ENV_REFERENCE_KEY: &str = "PDF_ENCRYPTION_KEY";
pub const ENV_DB_PATH: &str = "CERTVAULT_DB";
pub const ENV_DB_KEY: &str = "CERTVAULT_DB_KEY";
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
