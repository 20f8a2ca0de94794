// src/qr.rs
//! QR encoding seam
//!
//! Rendering is left to the caller; this crate only decides *what* goes into
//! the code (a verification URL or a reference token).

use crate::error::QrError;

pub trait QrEncoder {
    /// Encode `text` as a QR image. The representation is opaque to this
    /// crate; web callers conventionally return a `data:image/png` URL.
    fn encode_as_qr_image(&self, text: &str) -> Result<String, QrError>;
}

impl<F> QrEncoder for F
where
    F: Fn(&str) -> Result<String, QrError>,
{
    fn encode_as_qr_image(&self, text: &str) -> Result<String, QrError> {
        self(text)
    }
}

/// Hands back the payload itself, for callers that render QR codes elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadOnly;

impl QrEncoder for PayloadOnly {
    fn encode_as_qr_image(&self, text: &str) -> Result<String, QrError> {
        Ok(text.to_owned())
    }
}
