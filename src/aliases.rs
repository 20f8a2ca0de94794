// src/aliases.rs
//! secure-gate secret types used throughout certificate-vault

pub use secure_gate::fixed_alias;

// 256-bit AES key behind every reference token; zeroized on drop
fixed_alias!(ReferenceKey32, 32);
