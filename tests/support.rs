// tests/support.rs
//! Shared test fixtures: fixed key, in-memory stores, fake QR encoder

use std::cell::Cell;
use std::collections::BTreeMap;

use certificate_vault::config::{IssuancePolicy, PdfLinkBase};
use certificate_vault::db::{PdfStore, StoreResult};
use certificate_vault::records::{ExamResult, NewExamResult, NewPdf, PdfRecord};
use certificate_vault::{ExamResultStore, QrError, ReferenceCipher, ReferenceKey, SqliteStore, StoreError};

#[allow(dead_code)]
pub const TEST_KEY_HEX: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b2";

/// Test-friendly logging; respects RUST_LOG, safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[allow(dead_code)]
pub fn cipher() -> ReferenceCipher {
    ReferenceCipher::new(ReferenceKey::from_hex(TEST_KEY_HEX).expect("valid test key"))
}

#[allow(dead_code)]
pub fn store() -> SqliteStore {
    init_tracing();
    SqliteStore::open_in_memory().expect("open in-memory store")
}

#[allow(dead_code)]
pub fn policy() -> IssuancePolicy {
    IssuancePolicy {
        frontend_url: "https://certs.example.org".into(),
        max_attempts: 5,
    }
}

#[allow(dead_code)]
pub fn link_base() -> PdfLinkBase {
    PdfLinkBase {
        api_base_url: "https://api.example.org".into(),
    }
}

/// Stands in for a real QR renderer
#[allow(dead_code)]
pub fn fake_qr(text: &str) -> Result<String, QrError> {
    Ok(format!("qr:{text}"))
}

#[allow(dead_code)]
pub fn seed_exam<S: ExamResultStore>(store: &S, user_ref: &str, scores: &[(&str, f64)]) -> ExamResult {
    store
        .insert_exam_result(&NewExamResult {
            user_ref: user_ref.into(),
            exam_name: "National Finals".into(),
            year: 2024,
            scores: scores
                .iter()
                .map(|(subject, score)| (subject.to_string(), *score))
                .collect::<BTreeMap<_, _>>(),
        })
        .expect("insert exam result")
}

#[allow(dead_code)]
pub fn new_pdf(filename: &str) -> NewPdf {
    NewPdf {
        filename: filename.into(),
        title: Some("Diploma".into()),
        uploaded_by: Some("admin-1".into()),
    }
}

/// PDF store whose second phase can be made to fail
#[allow(dead_code)]
pub struct FlakyPdfStore {
    pub inner: SqliteStore,
    pub fail_reference_writes: Cell<bool>,
}

#[allow(dead_code)]
impl FlakyPdfStore {
    pub fn new() -> Self {
        Self {
            inner: store(),
            fail_reference_writes: Cell::new(true),
        }
    }
}

impl PdfStore for FlakyPdfStore {
    fn create_pdf(&self, new: &NewPdf) -> StoreResult<PdfRecord> {
        self.inner.create_pdf(new)
    }

    fn set_encrypted_reference(&self, internal_id: i64, token: &str) -> StoreResult<()> {
        if self.fail_reference_writes.get() {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.set_encrypted_reference(internal_id, token)
    }

    fn find_pdf(&self, internal_id: i64) -> StoreResult<Option<PdfRecord>> {
        self.inner.find_pdf(internal_id)
    }

    fn pdfs_pending_reference(&self) -> StoreResult<Vec<PdfRecord>> {
        self.inner.pdfs_pending_reference()
    }
}
