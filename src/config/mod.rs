// src/config/mod.rs
//! Configuration system for certificate-vault
//!
//! TOML file + environment overrides, validated once into [`Settings`] and
//! passed explicitly to whatever needs it.

pub use app::{apply_overrides, load, load_from, Config, Issuance, Keys, Paths, Urls};
pub use settings::{DatabaseSettings, IssuancePolicy, PdfLinkBase, Settings};

mod app;
mod defaults;
mod settings;
