// src/db/sqlite_conn.rs
use std::{fs, path::Path};

use rusqlite::{Connection, Result};
use tracing::debug;

use crate::config::DatabaseSettings;
use crate::consts::DB_KDF_ITERATIONS;

/// SQLite (optionally SQLCipher-keyed) implementation of every store trait
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`. With `key` set the
    /// file is encrypted with SQLCipher.
    pub fn open<P: AsRef<Path>>(path: P, key: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        debug!(path = %path.display(), keyed = key.is_some(), "opening certificate database");
        let conn = Connection::open(path)?;

        if let Some(key) = key {
            conn.pragma_update(None, "key", key)?;
            conn.execute_batch(&format!(
                r#"
                PRAGMA cipher_page_size = 4096;
                PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
                PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
                PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
                "#
            ))?;
        }

        Self::with_schema(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        Self::open(&settings.path, settings.key.as_deref())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn with_schema(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS exam_results (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_ref    TEXT NOT NULL,
                exam_name   TEXT NOT NULL,
                year        INTEGER NOT NULL,
                scores      TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exam_results_user
                ON exam_results(user_ref, year DESC, created_at DESC);

            CREATE TABLE IF NOT EXISTS certificates (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                certificate_id  TEXT NOT NULL UNIQUE,
                user_ref        TEXT NOT NULL,
                exam_result_ref TEXT NOT NULL,
                issued_at       TEXT NOT NULL,
                revoked         INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_certificates_user ON certificates(user_ref);

            -- Only the revoked flag may change after issuance
            CREATE TRIGGER IF NOT EXISTS certificates_identity_immutable
            BEFORE UPDATE OF certificate_id, user_ref, exam_result_ref, issued_at ON certificates
            BEGIN
                SELECT RAISE(ABORT, 'certificate identity is immutable');
            END;

            CREATE TABLE IF NOT EXISTS pdf_certificates (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                title               TEXT NOT NULL,
                filename            TEXT NOT NULL,
                encrypted_reference TEXT,
                uploaded_by         TEXT,
                created_at          TEXT NOT NULL
            );

            -- A reference, once stored, is permanent
            CREATE TRIGGER IF NOT EXISTS pdf_reference_write_once
            BEFORE UPDATE OF encrypted_reference ON pdf_certificates
            WHEN OLD.encrypted_reference IS NOT NULL
            BEGIN
                SELECT RAISE(ABORT, 'encrypted reference is already set');
            END;
            "#,
        )?;

        Ok(Self { conn })
    }
}
