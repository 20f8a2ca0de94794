// src/pdf_refs.rs
//! PDF records reachable through encrypted references
//!
//! Creation is two-phase because the plaintext is the record's own
//! store-assigned id: create → encrypt the id → store the token. A failure
//! after the first phase leaves a `Pending` record, reported as
//! [`CoreError::ReferencePending`] and repairable with
//! [`complete_reference`].

use tracing::{debug, info, warn};

use crate::config::PdfLinkBase;
use crate::core::{ReferenceCipher, Result};
use crate::db::PdfStore;
use crate::error::CoreError;
use crate::qr::QrEncoder;
use crate::records::{NewPdf, PdfLinks, PdfRecord, PdfReference};

/// Create a PDF record and attach its encrypted reference in one call.
pub fn create_with_reference<S>(
    store: &S,
    cipher: &ReferenceCipher,
    new: &NewPdf,
) -> Result<PdfRecord>
where
    S: PdfStore + ?Sized,
{
    let record = store.create_pdf(new)?;
    let internal_id = record.internal_id;

    let record = attach_reference(store, cipher, record).map_err(|err| {
        warn!(internal_id, error = %err, "pdf record left without a reference");
        CoreError::ReferencePending {
            internal_id,
            source: Some(Box::new(err)),
        }
    })?;

    info!(internal_id, filename = %record.filename, "pdf record referenced");
    Ok(record)
}

/// Fill in the reference of a record stranded between the two phases.
/// Already-referenced records come back unchanged.
pub fn complete_reference<S>(
    store: &S,
    cipher: &ReferenceCipher,
    internal_id: i64,
) -> Result<PdfRecord>
where
    S: PdfStore + ?Sized,
{
    let record = store.find_pdf(internal_id)?.ok_or(CoreError::NotFound)?;
    if record.is_referenced() {
        return Ok(record);
    }

    let record = attach_reference(store, cipher, record)?;
    info!(internal_id, "pending pdf reference completed");
    Ok(record)
}

pub fn pending_references<S>(store: &S) -> Result<Vec<PdfRecord>>
where
    S: PdfStore + ?Sized,
{
    Ok(store.pdfs_pending_reference()?)
}

/// Turn a scanned token back into download links.
///
/// An undecryptable token is `InvalidToken`; a token that decrypts to
/// something without a record behind it is `NotFound`.
pub fn resolve_reference<S>(
    store: &S,
    cipher: &ReferenceCipher,
    links: &PdfLinkBase,
    token: &str,
) -> Result<PdfLinks>
where
    S: PdfStore + ?Sized,
{
    let plaintext = cipher.decrypt(token)?;
    let internal_id: i64 = plaintext.parse().map_err(|_| {
        debug!("reference decrypted to a non-numeric id");
        CoreError::NotFound
    })?;

    let record = store.find_pdf(internal_id)?.ok_or(CoreError::NotFound)?;
    Ok(links.links_for(&record))
}

/// QR image carrying the record's reference token
pub fn reference_qr<Q>(qr: &Q, record: &PdfRecord) -> Result<String>
where
    Q: QrEncoder + ?Sized,
{
    match &record.reference {
        PdfReference::Issued(token) => Ok(qr.encode_as_qr_image(token)?),
        PdfReference::Pending => Err(CoreError::ReferencePending {
            internal_id: record.internal_id,
            source: None,
        }),
    }
}

fn attach_reference<S>(
    store: &S,
    cipher: &ReferenceCipher,
    mut record: PdfRecord,
) -> Result<PdfRecord>
where
    S: PdfStore + ?Sized,
{
    let token = cipher.encrypt(&record.internal_id.to_string())?;
    store.set_encrypted_reference(record.internal_id, &token)?;
    record.reference = PdfReference::Issued(token);
    Ok(record)
}
