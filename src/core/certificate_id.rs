// src/core/certificate_id.rs
//! Opaque public certificate identifiers
//!
//! 8 bytes from the thread-local CSPRNG, rendered as 16 lowercase hex
//! characters. Uniqueness is the store's job: issuance regenerates on a
//! unique-constraint collision.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::consts::{CERTIFICATE_ID_BYTES, CERTIFICATE_ID_HEX_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    /// Draw a fresh identifier
    pub fn generate() -> Self {
        let mut bytes = [0u8; CERTIFICATE_ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accept `candidate` only if it has the exact generated shape
    pub fn parse(candidate: &str) -> Option<Self> {
        is_well_formed(candidate).then(|| Self(candidate.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 16 characters, all in `[0-9a-f]`
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == CERTIFICATE_ID_HEX_LEN
        && candidate
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CertificateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
