// src/verification.rs
//! Certificate lookup, revocation and per-student listings
//!
//! A revoked certificate and an unknown id are indistinguishable to callers:
//! both come back as [`CoreError::NotFound`].

use tracing::{debug, info};

use crate::core::{CertificateId, Result};
use crate::db::{CertificateStore, ExamResultStore};
use crate::error::CoreError;
use crate::records::{CertificateSummary, CertificateView};

pub fn verify_certificate<S>(store: &S, certificate_id: &str) -> Result<CertificateView>
where
    S: CertificateStore + ExamResultStore + ?Sized,
{
    let Some(id) = CertificateId::parse(certificate_id) else {
        debug!("malformed certificate id rejected before lookup");
        return Err(CoreError::NotFound);
    };

    let record = match store.find_by_certificate_id(id.as_str())? {
        Some(record) if !record.revoked => record,
        _ => return Err(CoreError::NotFound),
    };

    let exam_result = store.find_exam_result(&record.exam_result_ref)?;
    Ok(CertificateView::new(record, exam_result))
}

/// Mark a certificate revoked. Revoking twice is not an error.
pub fn revoke_certificate<S>(store: &S, certificate_id: &str) -> Result<()>
where
    S: CertificateStore + ?Sized,
{
    if !store.set_revoked(certificate_id, true)? {
        return Err(CoreError::NotFound);
    }
    info!(certificate_id, "certificate revoked");
    Ok(())
}

/// Every certificate issued to `user_ref`, revoked ones included and flagged
pub fn certificates_for_user<S>(store: &S, user_ref: &str) -> Result<Vec<CertificateSummary>>
where
    S: CertificateStore + ExamResultStore + ?Sized,
{
    store
        .certificates_for_user(user_ref)?
        .into_iter()
        .map(|record| -> Result<CertificateSummary> {
            let exam_result = store.find_exam_result(&record.exam_result_ref)?;
            Ok(CertificateSummary::new(record, exam_result))
        })
        .collect()
}
