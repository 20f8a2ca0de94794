// src/error.rs
//! Public error types for the entire crate
//!
//! Only [`CoreError::public_message`] may cross the trust boundary; the
//! `Display` output of these types is for logs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidToken(#[from] InvalidToken),

    #[error("record not found")]
    NotFound,

    #[error("certificate issuance failed after {attempts} attempt(s)")]
    IssuanceFailed { attempts: u32 },

    #[error("pdf record {internal_id} exists but has no encrypted reference")]
    ReferencePending {
        internal_id: i64,
        #[source]
        source: Option<Box<CoreError>>,
    },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("cipher failure: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    #[error("QR encoding failed: {0}")]
    Qr(#[from] QrError),
}

/// Rejected reference token. Carries no detail on purpose: the reason is
/// logged where the token is opened and never returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reference key is not configured (set PDF_ENCRYPTION_KEY or keys.reference_key)")]
    MissingReferenceKey,

    #[error("reference key must be {expected} hex characters (32 bytes), got {actual}")]
    ReferenceKeyLength { expected: usize, actual: usize },

    #[error("reference key is not valid hex")]
    ReferenceKeyNotHex,

    #[error("issuance.max_attempts must be at least 1")]
    NoIssuanceAttempts,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique-constraint violation
    #[error("unique constraint violated")]
    Conflict,

    #[error("database error: {0}")]
    Sql(rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
                    && (e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                        || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY) =>
            {
                StoreError::Conflict
            }
            _ => StoreError::Sql(err),
        }
    }
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct QrError(pub String);

/// How a failure is presented to an external caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Malformed or undecryptable input (400-equivalent)
    BadRequest,
    /// No valid record behind the identifier (404-equivalent)
    NotFound,
    /// Anything else (500-equivalent)
    ServerFault,
}

impl Rejection {
    pub fn status_code(self) -> u16 {
        match self {
            Rejection::BadRequest => 400,
            Rejection::NotFound => 404,
            Rejection::ServerFault => 500,
        }
    }

    pub fn public_message(self) -> &'static str {
        match self {
            Rejection::BadRequest => "Invalid encrypted string",
            Rejection::NotFound => "Not found",
            Rejection::ServerFault => "Internal server error",
        }
    }
}

impl CoreError {
    pub fn rejection(&self) -> Rejection {
        match self {
            CoreError::InvalidToken(_) => Rejection::BadRequest,
            CoreError::NotFound => Rejection::NotFound,
            _ => Rejection::ServerFault,
        }
    }

    pub fn public_message(&self) -> &'static str {
        self.rejection().public_message()
    }
}
