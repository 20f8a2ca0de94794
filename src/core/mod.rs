// src/core/mod.rs
//! Pure identifier and reference operations; no I/O, no database
//!
//! Everything here works on in-memory values and is safe to call from any
//! number of threads at once.

pub mod certificate_id;
pub mod key;
pub mod reference_cipher;

pub use certificate_id::{is_well_formed, CertificateId};
pub use key::ReferenceKey;
pub use reference_cipher::{Iv, ReferenceCipher};

pub type Result<T> = std::result::Result<T, crate::error::CoreError>;
