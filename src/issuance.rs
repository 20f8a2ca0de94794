// src/issuance.rs
//! Certificate issuance with bounded retry on id collisions

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::IssuancePolicy;
use crate::core::{CertificateId, Result};
use crate::db::{CertificateStore, ExamResultStore};
use crate::error::{CoreError, StoreError};
use crate::qr::QrEncoder;
use crate::records::{CertificateRecord, NewCertificate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedCertificate {
    pub record: CertificateRecord,
    pub verification_url: String,
    /// QR image of `verification_url`
    pub qr_code: String,
}

/// Issue a certificate for an existing exam result.
pub fn issue_certificate<S, Q>(
    store: &S,
    qr: &Q,
    policy: &IssuancePolicy,
    request: &NewCertificate,
) -> Result<IssuedCertificate>
where
    S: CertificateStore + ExamResultStore + ?Sized,
    Q: QrEncoder + ?Sized,
{
    issue_certificate_with(store, qr, policy, request, CertificateId::generate)
}

/// [`issue_certificate`] with a caller-supplied id source.
///
/// Each attempt draws a new id from `next_id`; a `Conflict` from the store
/// triggers another draw, up to `policy.max_attempts` in total.
pub fn issue_certificate_with<S, Q, G>(
    store: &S,
    qr: &Q,
    policy: &IssuancePolicy,
    request: &NewCertificate,
    mut next_id: G,
) -> Result<IssuedCertificate>
where
    S: CertificateStore + ExamResultStore + ?Sized,
    Q: QrEncoder + ?Sized,
    G: FnMut() -> CertificateId,
{
    if store.find_exam_result(&request.exam_result_ref)?.is_none() {
        return Err(CoreError::NotFound);
    }

    let record = insert_with_retry(store, policy.max_attempts, request, &mut next_id)?;
    let verification_url = policy.verification_url(&record.certificate_id);
    let qr_code = qr.encode_as_qr_image(&verification_url)?;

    info!(
        certificate_id = %record.certificate_id,
        user_ref = %record.user_ref,
        "certificate issued"
    );

    Ok(IssuedCertificate {
        record,
        verification_url,
        qr_code,
    })
}

fn insert_with_retry<S, G>(
    store: &S,
    max_attempts: u32,
    request: &NewCertificate,
    next_id: &mut G,
) -> Result<CertificateRecord>
where
    S: CertificateStore + ?Sized,
    G: FnMut() -> CertificateId,
{
    for attempt in 1..=max_attempts {
        let record = CertificateRecord {
            certificate_id: next_id(),
            user_ref: request.user_ref.clone(),
            exam_result_ref: request.exam_result_ref.clone(),
            issued_at: Utc::now(),
            revoked: false,
        };

        match store.insert_certificate(&record) {
            Ok(()) => return Ok(record),
            Err(StoreError::Conflict) => {
                warn!(attempt, max_attempts, "certificate id collision; regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CoreError::IssuanceFailed {
        attempts: max_attempts,
    })
}
