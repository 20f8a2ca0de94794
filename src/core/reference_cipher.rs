// src/core/reference_cipher.rs
//! Encrypted references to internal record identifiers
//!
//! A reference token is `hex(iv) ":" hex(ciphertext)` where the ciphertext is
//! AES-256-CBC with PKCS#7 padding under the process-wide reference key. The
//! IV is drawn fresh for every call, so equal identifiers never produce equal
//! tokens.

use openssl::symm::{self, Cipher};
use rand::RngCore;
use thiserror::Error;
use tracing::debug;

use crate::consts::{IV_LENGTH, TOKEN_SEPARATOR};
use crate::core::key::ReferenceKey;
use crate::error::InvalidToken;

pub type Iv = [u8; IV_LENGTH];

/// Why a token was rejected. Logged, never returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenFault {
    #[error("missing ':' separator")]
    MissingSeparator,
    #[error("iv segment is not hex")]
    IvNotHex,
    #[error("iv is {0} bytes, expected 16")]
    IvLength(usize),
    #[error("ciphertext segment is not hex")]
    CiphertextNotHex,
    #[error("ciphertext is empty")]
    EmptyCiphertext,
    #[error("decryption or padding check failed")]
    BadPadding,
    #[error("plaintext is not UTF-8")]
    NotUtf8,
}

/// Symmetric encrypt/decrypt pair over one immutable key.
///
/// Holds no mutable state; share it by reference across threads.
#[derive(Debug)]
pub struct ReferenceCipher {
    key: ReferenceKey,
}

impl ReferenceCipher {
    pub fn new(key: ReferenceKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` under a freshly drawn IV
    pub fn encrypt(&self, plaintext: &str) -> Result<String, openssl::error::ErrorStack> {
        let mut iv = [0u8; IV_LENGTH];
        rand::rng().fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    /// Deterministic encryption under a caller-chosen IV.
    ///
    /// Only for pinned regression vectors: reusing an IV leaks plaintext
    /// equality, so production paths go through [`ReferenceCipher::encrypt`].
    pub fn encrypt_with_iv(
        &self,
        plaintext: &str,
        iv: &Iv,
    ) -> Result<String, openssl::error::ErrorStack> {
        let ciphertext = symm::encrypt(
            Cipher::aes_256_cbc(),
            self.key.as_bytes(),
            Some(iv.as_slice()),
            plaintext.as_bytes(),
        )?;

        let mut token = String::with_capacity((IV_LENGTH + ciphertext.len()) * 2 + 1);
        token.push_str(&hex::encode(iv));
        token.push(TOKEN_SEPARATOR);
        token.push_str(&hex::encode(ciphertext));
        Ok(token)
    }

    /// Recover the plaintext behind `token`.
    ///
    /// Every failure collapses into [`InvalidToken`]; the specific reason is
    /// only emitted as a debug event.
    pub fn decrypt(&self, token: &str) -> Result<String, InvalidToken> {
        self.open(token).map_err(|fault| {
            debug!(%fault, "rejected reference token");
            InvalidToken
        })
    }

    pub(crate) fn open(&self, token: &str) -> Result<String, TokenFault> {
        let (iv_hex, ciphertext_hex) = token
            .split_once(TOKEN_SEPARATOR)
            .ok_or(TokenFault::MissingSeparator)?;

        let iv_bytes = hex::decode(iv_hex).map_err(|_| TokenFault::IvNotHex)?;
        let iv: Iv = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| TokenFault::IvLength(iv_bytes.len()))?;

        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| TokenFault::CiphertextNotHex)?;
        if ciphertext.is_empty() {
            return Err(TokenFault::EmptyCiphertext);
        }

        let plaintext = symm::decrypt(
            Cipher::aes_256_cbc(),
            self.key.as_bytes(),
            Some(iv.as_slice()),
            &ciphertext,
        )
        .map_err(|_| TokenFault::BadPadding)?;

        String::from_utf8(plaintext).map_err(|_| TokenFault::NotUtf8)
    }
}
