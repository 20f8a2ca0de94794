// src/lib.rs
//! certificate-vault: opaque certificate ids and encrypted PDF references
//!
//! Features:
//! - 64-bit random certificate ids with collision-retrying issuance
//! - AES-256-CBC reference tokens (`hex(iv):hex(ciphertext)`) for QR hand-off
//! - Verification that never distinguishes revoked from unknown certificates
//! - SQLite/SQLCipher store behind plain traits

pub mod aliases;
pub mod config;
pub mod consts;
pub mod core;
pub mod db;
pub mod error;
pub mod issuance;
pub mod pdf_refs;
pub mod qr;
pub mod records;
pub mod verification;

// Re-export everything users need at the crate root
pub use config::{load as load_config, Config, Settings};
pub use crate::core::{CertificateId, ReferenceCipher, ReferenceKey, Result as CoreResult};
pub use db::{CertificateStore, ExamResultStore, PdfStore, SqliteStore};
pub use error::{ConfigError, CoreError, InvalidToken, QrError, Rejection, StoreError};
pub use issuance::{issue_certificate, IssuedCertificate};
pub use pdf_refs::{complete_reference, create_with_reference, resolve_reference};
pub use qr::QrEncoder;
pub use verification::{certificates_for_user, revoke_certificate, verify_certificate};
