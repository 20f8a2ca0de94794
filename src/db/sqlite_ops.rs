// src/db/sqlite_ops.rs
//! rusqlite implementations of the store traits

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, OptionalExtension, Row};

use crate::core::CertificateId;
use crate::db::sqlite_conn::SqliteStore;
use crate::db::store::{CertificateStore, ExamResultStore, PdfStore, StoreResult};
use crate::error::StoreError;
use crate::records::{
    CertificateRecord, ExamResult, NewExamResult, NewPdf, PdfRecord, PdfReference,
};

const CERTIFICATE_COLUMNS: &str = "certificate_id, user_ref, exam_result_ref, issued_at, revoked";
const EXAM_COLUMNS: &str = "id, user_ref, exam_name, year, scores, created_at";
const PDF_COLUMNS: &str = "id, encrypted_reference, filename, title, uploaded_by, created_at";

impl ToSql for CertificateId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CertificateId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        CertificateId::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("malformed certificate id {raw:?}").into()))
    }
}

fn certificate_from_row(row: &Row<'_>) -> rusqlite::Result<CertificateRecord> {
    Ok(CertificateRecord {
        certificate_id: row.get(0)?,
        user_ref: row.get(1)?,
        exam_result_ref: row.get(2)?,
        issued_at: row.get(3)?,
        revoked: row.get(4)?,
    })
}

fn exam_from_row(row: &Row<'_>) -> rusqlite::Result<ExamResult> {
    let raw_scores: String = row.get(4)?;
    let scores: BTreeMap<String, f64> = serde_json::from_str(&raw_scores)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(ExamResult {
        id: row.get(0)?,
        user_ref: row.get(1)?,
        exam_name: row.get(2)?,
        year: row.get(3)?,
        scores,
        created_at: row.get(5)?,
    })
}

fn pdf_from_row(row: &Row<'_>) -> rusqlite::Result<PdfRecord> {
    Ok(PdfRecord {
        internal_id: row.get(0)?,
        reference: PdfReference::from_column(row.get(1)?),
        filename: row.get(2)?,
        title: row.get(3)?,
        uploaded_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl CertificateStore for SqliteStore {
    fn insert_certificate(&self, record: &CertificateRecord) -> StoreResult<()> {
        self.conn.execute(
            &format!("INSERT INTO certificates ({CERTIFICATE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                record.certificate_id,
                record.user_ref,
                record.exam_result_ref,
                record.issued_at,
                record.revoked,
            ],
        )?;
        Ok(())
    }

    fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> StoreResult<Option<CertificateRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE certificate_id = ?1"),
                [certificate_id],
                certificate_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn set_revoked(&self, certificate_id: &str, revoked: bool) -> StoreResult<bool> {
        let rows = self.conn.execute(
            "UPDATE certificates SET revoked = ?2 WHERE certificate_id = ?1",
            params![certificate_id, revoked],
        )?;
        Ok(rows > 0)
    }

    fn certificates_for_user(&self, user_ref: &str) -> StoreResult<Vec<CertificateRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates
             WHERE user_ref = ?1
             ORDER BY issued_at DESC, id DESC"
        ))?;
        let records = stmt
            .query_map([user_ref], certificate_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

impl ExamResultStore for SqliteStore {
    fn insert_exam_result(&self, new: &NewExamResult) -> StoreResult<ExamResult> {
        let scores = serde_json::to_string(&new.scores)
            .map_err(|e| StoreError::Sql(rusqlite::Error::ToSqlConversionFailure(Box::new(e))))?;
        let created_at = Utc::now();

        self.conn.execute(
            "INSERT INTO exam_results (user_ref, exam_name, year, scores, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.user_ref, new.exam_name, new.year, scores, created_at],
        )?;

        Ok(ExamResult {
            id: self.conn.last_insert_rowid(),
            user_ref: new.user_ref.clone(),
            exam_name: new.exam_name.clone(),
            year: new.year,
            scores: new.scores.clone(),
            created_at,
        })
    }

    fn find_exam_result(&self, exam_result_ref: &str) -> StoreResult<Option<ExamResult>> {
        let Ok(id) = exam_result_ref.parse::<i64>() else {
            return Ok(None);
        };
        let exam = self
            .conn
            .query_row(
                &format!("SELECT {EXAM_COLUMNS} FROM exam_results WHERE id = ?1"),
                [id],
                exam_from_row,
            )
            .optional()?;
        Ok(exam)
    }
}

impl PdfStore for SqliteStore {
    fn create_pdf(&self, new: &NewPdf) -> StoreResult<PdfRecord> {
        let title = new.resolved_title().to_owned();
        let created_at = Utc::now();

        self.conn.execute(
            "INSERT INTO pdf_certificates (title, filename, encrypted_reference, uploaded_by, created_at)
             VALUES (?1, ?2, NULL, ?3, ?4)",
            params![title, new.filename, new.uploaded_by, created_at],
        )?;

        Ok(PdfRecord {
            internal_id: self.conn.last_insert_rowid(),
            reference: PdfReference::Pending,
            filename: new.filename.clone(),
            title,
            uploaded_by: new.uploaded_by.clone(),
            created_at,
        })
    }

    fn set_encrypted_reference(&self, internal_id: i64, token: &str) -> StoreResult<()> {
        let rows = self.conn.execute(
            "UPDATE pdf_certificates SET encrypted_reference = ?2 WHERE id = ?1",
            params![internal_id, token],
        )?;
        if rows == 0 {
            return Err(StoreError::Sql(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(())
    }

    fn find_pdf(&self, internal_id: i64) -> StoreResult<Option<PdfRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {PDF_COLUMNS} FROM pdf_certificates WHERE id = ?1"),
                [internal_id],
                pdf_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn pdfs_pending_reference(&self) -> StoreResult<Vec<PdfRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PDF_COLUMNS} FROM pdf_certificates
             WHERE encrypted_reference IS NULL
             ORDER BY id"
        ))?;
        let records = stmt
            .query_map([], pdf_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate(id: &str) -> CertificateRecord {
        CertificateRecord {
            certificate_id: CertificateId::parse(id).unwrap(),
            user_ref: "student-1".into(),
            exam_result_ref: "1".into(),
            issued_at: Utc::now(),
            revoked: false,
        }
    }

    #[test]
    fn duplicate_certificate_id_is_a_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_certificate(&certificate("0011223344556677")).unwrap();
        let err = store
            .insert_certificate(&certificate("0011223344556677"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict), "{err:?}");
    }

    #[test]
    fn certificate_identity_cannot_be_rewritten() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_certificate(&certificate("0011223344556677")).unwrap();

        let err = store
            .conn
            .execute(
                "UPDATE certificates SET user_ref = 'someone-else' WHERE certificate_id = ?1",
                ["0011223344556677"],
            )
            .unwrap_err();
        assert!(err.to_string().contains("immutable"), "{err}");

        assert!(store.set_revoked("0011223344556677", true).unwrap());
        let stored = store.find_by_certificate_id("0011223344556677").unwrap().unwrap();
        assert!(stored.revoked);
        assert_eq!(stored.user_ref, "student-1");
    }

    #[test]
    fn pdf_reference_is_write_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let pdf = store
            .create_pdf(&NewPdf {
                filename: "diploma.pdf".into(),
                title: None,
                uploaded_by: Some("admin-1".into()),
            })
            .unwrap();
        assert_eq!(pdf.title, "Untitled");
        assert_eq!(store.pdfs_pending_reference().unwrap().len(), 1);

        store.set_encrypted_reference(pdf.internal_id, "aa:bb").unwrap();
        assert!(store.pdfs_pending_reference().unwrap().is_empty());
        assert!(matches!(
            store.set_encrypted_reference(pdf.internal_id, "cc:dd"),
            Err(StoreError::Sql(_))
        ));

        let stored = store.find_pdf(pdf.internal_id).unwrap().unwrap();
        assert_eq!(stored.reference, PdfReference::Issued("aa:bb".into()));
    }

    #[test]
    fn reference_for_unknown_pdf_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.set_encrypted_reference(99, "aa:bb").is_err());
    }

    #[test]
    fn exam_scores_survive_storage() {
        let store = SqliteStore::open_in_memory().unwrap();
        let exam = store
            .insert_exam_result(&NewExamResult {
                user_ref: "student-1".into(),
                exam_name: "Finals".into(),
                year: 2024,
                scores: [("math".to_string(), 90.5), ("physics".to_string(), 81.0)]
                    .into_iter()
                    .collect(),
            })
            .unwrap();

        let stored = store
            .find_exam_result(&exam.id.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(stored.scores, exam.scores);
        assert_eq!(stored.exam_name, "Finals");
        assert!(store.find_exam_result("not-a-number").unwrap().is_none());
        assert!(store.find_exam_result("12345").unwrap().is_none());
    }
}
