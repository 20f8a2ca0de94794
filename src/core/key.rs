// src/core/key.rs
//! Reference key parsing and generation
//!
//! The key arrives as 64 hex characters from configuration and is held in a
//! zeroizing secure-gate buffer for the rest of the process lifetime.

use std::fmt;

use rand::RngCore;

use crate::aliases::ReferenceKey32;
use crate::consts::{REFERENCE_KEY_BYTES, REFERENCE_KEY_HEX_LEN};
use crate::error::ConfigError;

/// The 256-bit symmetric key behind every reference token
pub struct ReferenceKey(ReferenceKey32);

impl ReferenceKey {
    /// Parse a hex-encoded key. Surrounding whitespace is ignored; anything
    /// other than exactly 64 hex characters is rejected.
    pub fn from_hex(hex_key: &str) -> Result<Self, ConfigError> {
        let hex_key = hex_key.trim();
        if hex_key.len() != REFERENCE_KEY_HEX_LEN {
            return Err(ConfigError::ReferenceKeyLength {
                expected: REFERENCE_KEY_HEX_LEN,
                actual: hex_key.chars().count(),
            });
        }

        let mut bytes = [0u8; REFERENCE_KEY_BYTES];
        hex::decode_to_slice(hex_key, &mut bytes).map_err(|_| ConfigError::ReferenceKeyNotHex)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: [u8; REFERENCE_KEY_BYTES]) -> Self {
        Self(ReferenceKey32::new(bytes))
    }

    /// Generate a fresh random key (for provisioning a new deployment)
    pub fn generate() -> Self {
        let mut bytes = [0u8; REFERENCE_KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Lowercase hex form, suitable for `PDF_ENCRYPTION_KEY`
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; REFERENCE_KEY_BYTES] {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReferenceKey([REDACTED])")
    }
}
