// src/db/store.rs
//! Persistence capabilities the workflows consume
//!
//! Each call is expected to be atomic. Implementations report a
//! unique-constraint violation as [`StoreError::Conflict`] so issuance can
//! regenerate the certificate id.

use crate::error::StoreError;
use crate::records::{
    CertificateRecord, ExamResult, NewExamResult, NewPdf, PdfRecord,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait CertificateStore {
    /// Insert a freshly issued certificate; `Conflict` if the id is taken
    fn insert_certificate(&self, record: &CertificateRecord) -> StoreResult<()>;

    fn find_by_certificate_id(&self, certificate_id: &str)
        -> StoreResult<Option<CertificateRecord>>;

    /// Returns `false` when no certificate has that id
    fn set_revoked(&self, certificate_id: &str, revoked: bool) -> StoreResult<bool>;

    fn certificates_for_user(&self, user_ref: &str) -> StoreResult<Vec<CertificateRecord>>;
}

pub trait ExamResultStore {
    fn insert_exam_result(&self, new: &NewExamResult) -> StoreResult<ExamResult>;

    /// `None` for unknown or unparseable references
    fn find_exam_result(&self, exam_result_ref: &str) -> StoreResult<Option<ExamResult>>;
}

pub trait PdfStore {
    /// Phase one: create the record without a reference
    fn create_pdf(&self, new: &NewPdf) -> StoreResult<PdfRecord>;

    /// Phase two: attach the encrypted reference to an existing record
    fn set_encrypted_reference(&self, internal_id: i64, token: &str) -> StoreResult<()>;

    fn find_pdf(&self, internal_id: i64) -> StoreResult<Option<PdfRecord>>;

    /// Records stranded between the two phases
    fn pdfs_pending_reference(&self) -> StoreResult<Vec<PdfRecord>>;
}
