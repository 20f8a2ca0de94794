// src/db/mod.rs
//! Persistence: store traits plus the SQLite/SQLCipher adapter

pub mod sqlite_conn;
pub mod sqlite_ops;
pub mod store;

pub use sqlite_conn::SqliteStore;
pub use store::{CertificateStore, ExamResultStore, PdfStore, StoreResult};
