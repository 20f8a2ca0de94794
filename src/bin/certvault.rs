// src/bin/certvault.rs
//! certvault: operator CLI over the certificate store and reference cipher
//!
//! Rejections print only the public message; details go to the log
//! (`RUST_LOG=debug` for token faults).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use certificate_vault::config::{self, Settings};
use certificate_vault::pdf_refs::{self, reference_qr};
use certificate_vault::qr::PayloadOnly;
use certificate_vault::records::{NewCertificate, NewExamResult, NewPdf};
use certificate_vault::{
    certificates_for_user, issue_certificate, revoke_certificate, verify_certificate,
    CertificateId, CoreError, ExamResultStore, ReferenceCipher, ReferenceKey, Rejection,
    SqliteStore,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "certvault", version, about = "Certificate ids and encrypted PDF references")]
struct Cli {
    /// Configuration file (defaults to ./certvault.toml or the user config dir)
    #[arg(long, env = "CERTVAULT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh reference key for PDF_ENCRYPTION_KEY
    GenKey,
    /// Print a fresh certificate id
    GenId,
    /// Encrypt a value into a reference token
    Encrypt { plaintext: String },
    /// Decrypt a reference token
    Decrypt { token: String },
    /// Record an exam result
    AddExam {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: i32,
        /// subject=score, repeatable
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(String, f64)>,
    },
    /// Issue a certificate for an exam result
    Issue {
        #[arg(long)]
        user: String,
        #[arg(long)]
        exam: String,
    },
    /// Check a certificate id
    Verify { certificate_id: String },
    /// Revoke a certificate
    Revoke { certificate_id: String },
    /// List a student's certificates with averages and grades
    MyCerts {
        #[arg(long)]
        user: String,
    },
    /// Register an uploaded PDF and print its reference token
    AddPdf {
        #[arg(long)]
        filename: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        uploaded_by: Option<String>,
    },
    /// Resolve a scanned reference token to download links
    Resolve { token: String },
    /// Fill in references for PDFs left pending by an interrupted upload
    Repair,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CoreError>() {
            Some(core) => {
                error!(error = ?err, "request rejected");
                eprintln!("{}", core.public_message());
                ExitCode::from(exit_code(core.rejection()))
            }
            None => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::GenKey => {
            println!("{}", ReferenceKey::generate().to_hex());
            return Ok(());
        }
        Command::GenId => {
            println!("{}", CertificateId::generate());
            return Ok(());
        }
        _ => {}
    }

    // Everything else needs a valid key: fail before touching any data
    let settings = load_settings(cli.config.as_deref())?;
    let cipher = ReferenceCipher::new(settings.reference_key);

    if let Command::Encrypt { plaintext } = &cli.command {
        println!("{}", cipher.encrypt(plaintext)?);
        return Ok(());
    }
    if let Command::Decrypt { token } = &cli.command {
        println!("{}", cipher.decrypt(token).map_err(CoreError::from)?);
        return Ok(());
    }

    let store = SqliteStore::from_settings(&settings.database).with_context(|| {
        format!(
            "failed to open certificate database at {}",
            settings.database.path.display()
        )
    })?;

    match cli.command {
        Command::AddExam {
            user,
            name,
            year,
            scores,
        } => {
            let exam = store
                .insert_exam_result(&NewExamResult {
                    user_ref: user,
                    exam_name: name,
                    year,
                    scores: scores.into_iter().collect(),
                })
                .map_err(CoreError::from)?;
            print_json(&exam)
        }
        Command::Issue { user, exam } => {
            let issued = issue_certificate(
                &store,
                &PayloadOnly,
                &settings.issuance,
                &NewCertificate {
                    user_ref: user,
                    exam_result_ref: exam,
                },
            )?;
            print_json(&issued)
        }
        Command::Verify { certificate_id } => {
            print_json(&verify_certificate(&store, &certificate_id)?)
        }
        Command::Revoke { certificate_id } => {
            revoke_certificate(&store, &certificate_id)?;
            println!("revoked {certificate_id}");
            Ok(())
        }
        Command::MyCerts { user } => print_json(&certificates_for_user(&store, &user)?),
        Command::AddPdf {
            filename,
            title,
            uploaded_by,
        } => {
            let record = pdf_refs::create_with_reference(
                &store,
                &cipher,
                &NewPdf {
                    filename,
                    title,
                    uploaded_by,
                },
            )?;
            print_json(&json!({
                "pdf": &record,
                "qr_code": reference_qr(&PayloadOnly, &record)?,
                "links": settings.pdf_links.links_for(&record),
            }))
        }
        Command::Resolve { token } => print_json(&pdf_refs::resolve_reference(
            &store,
            &cipher,
            &settings.pdf_links,
            &token,
        )?),
        Command::Repair => {
            let pending = pdf_refs::pending_references(&store)?;
            info!(count = pending.len(), "pending pdf references");
            for record in pending {
                match pdf_refs::complete_reference(&store, &cipher, record.internal_id) {
                    Ok(_) => info!(internal_id = record.internal_id, "reference completed"),
                    Err(err) => warn!(internal_id = record.internal_id, error = %err, "repair failed"),
                }
            }
            Ok(())
        }
        Command::GenKey | Command::GenId | Command::Encrypt { .. } | Command::Decrypt { .. } => {
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let conf = match path {
        Some(path) => config::apply_overrides(config::load_from(path)?, |name| {
            std::env::var(name).ok()
        }),
        None => config::load()?,
    };
    Settings::from_config(&conf).context("refusing to start")
}

fn parse_score(raw: &str) -> Result<(String, f64), String> {
    let (subject, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected subject=score, got {raw:?}"))?;
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid score for {subject}: {e}"))?;
    Ok((subject.trim().to_owned(), score))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(rejection: Rejection) -> u8 {
    match rejection {
        Rejection::BadRequest => 2,
        Rejection::NotFound => 3,
        Rejection::ServerFault => 1,
    }
}
