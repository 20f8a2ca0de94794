// src/records.rs
//! Persisted entities and the views built from them
//!
//! The store owns these records; the core only computes and checks their
//! identifier fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PDF_TITLE;
use crate::core::CertificateId;

/// An issued certificate. Everything except `revoked` is fixed at issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub certificate_id: CertificateId,
    pub user_ref: String,
    pub exam_result_ref: String,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Issuance request; both references are validated by their owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCertificate {
    pub user_ref: String,
    pub exam_result_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub user_ref: String,
    pub exam_name: String,
    pub year: i32,
    /// Subject name → score
    pub scores: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExamResult {
    pub user_ref: String,
    pub exam_name: String,
    pub year: i32,
    pub scores: BTreeMap<String, f64>,
}

impl ExamResult {
    /// Mean score rounded to two decimals; 0 without scores
    pub fn average(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.scores.values().sum::<f64>() / self.scores.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    pub fn grade(&self) -> Grade {
        Grade::from_average(self.average())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_average(average: f64) -> Self {
        match average {
            a if a >= 90.0 => Grade::A,
            a if a >= 80.0 => Grade::B,
            a if a >= 70.0 => Grade::C,
            a if a >= 60.0 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// What a successful verification hands back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateView {
    pub certificate_id: CertificateId,
    pub user_ref: String,
    pub exam_result_ref: String,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
    pub exam_result: Option<ExamResult>,
}

impl CertificateView {
    pub fn new(record: CertificateRecord, exam_result: Option<ExamResult>) -> Self {
        Self {
            certificate_id: record.certificate_id,
            user_ref: record.user_ref,
            exam_result_ref: record.exam_result_ref,
            issued_at: record.issued_at,
            revoked: record.revoked,
            exam_result,
        }
    }
}

/// One row of a student's certificate listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateSummary {
    pub certificate_id: CertificateId,
    pub exam_name: Option<String>,
    pub year: Option<i32>,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
    pub scores: BTreeMap<String, f64>,
    pub average: f64,
    pub grade: Grade,
}

impl CertificateSummary {
    pub fn new(record: CertificateRecord, exam_result: Option<ExamResult>) -> Self {
        let (exam_name, year, scores, average) = match exam_result {
            Some(exam) => {
                let average = exam.average();
                (Some(exam.exam_name), Some(exam.year), exam.scores, average)
            }
            None => (None, None, BTreeMap::new(), 0.0),
        };

        Self {
            certificate_id: record.certificate_id,
            exam_name,
            year,
            issued_at: record.issued_at,
            revoked: record.revoked,
            scores,
            average,
            grade: Grade::from_average(average),
        }
    }
}

/// Two-phase reference state of a PDF record: created first, then
/// referenced once the store-assigned id has been encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "token", rename_all = "snake_case")]
pub enum PdfReference {
    Pending,
    Issued(String),
}

impl PdfReference {
    pub fn from_column(token: Option<String>) -> Self {
        token.map_or(PdfReference::Pending, PdfReference::Issued)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            PdfReference::Pending => None,
            PdfReference::Issued(token) => Some(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfRecord {
    /// Store-assigned; only ever handed out inside an encrypted reference
    pub internal_id: i64,
    pub reference: PdfReference,
    pub filename: String,
    pub title: String,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PdfRecord {
    pub fn is_referenced(&self) -> bool {
        matches!(self.reference, PdfReference::Issued(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPdf {
    pub filename: String,
    pub title: Option<String>,
    pub uploaded_by: Option<String>,
}

impl NewPdf {
    /// Title to store; blank titles become "Untitled"
    pub fn resolved_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => DEFAULT_PDF_TITLE,
        }
    }
}

/// Where a resolved reference can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfLinks {
    pub pdf_url: String,
    pub download_url: String,
}
