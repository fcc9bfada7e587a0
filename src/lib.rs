//! # contract-reader
//!
//! Client for a contract-analysis service: submit a PDF, follow the
//! analysis, and turn whatever JSON shape the service answers with into one
//! summary and a downloadable report.
//!
//! ## Why this crate?
//!
//! The analysis service has shipped three incompatible response shapes
//! (legacy, Board-Ready V2.3, UniversalContract V3), and clients must render
//! all of them. This crate resolves every display field through one ordered
//! fallback chain, so the on-screen summary and the PDF report never disagree
//! on which value wins.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Intake     PDF check by MIME type or `.pdf` extension
//!  ├─ 2. Upload     simulated 0..100 progress
//!  ├─ 3. Analyze    multipart POST under a 30 s deadline, status ticks
//!  ├─ 4. Detect     tag the JSON as V3 / Board-Ready / legacy / minimal
//!  ├─ 5. Normalize  fallback chains → NormalizedSummary
//!  └─ 6. Report     text summary + paginated PDF (link first, local fallback)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_reader::{normalize, ClientConfig, HttpBackend, UploadFile, UploadOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env();
//!     let backend = Arc::new(HttpBackend::new(config.clone())?);
//!     let orchestrator = UploadOrchestrator::new(backend, config);
//!
//!     let file = UploadFile::from_path("contrat.pdf").await?;
//!     let result = orchestrator.submit(file).await?;
//!     let summary = normalize(&result);
//!     println!("{} ({} parties)", summary.object, summary.parties.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `contract-reader` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! contract-reader = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod i18n;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod result;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{AnalysisBackend, HttpBackend, SimulatedBackend};
pub use config::{ClientConfig, ClientConfigBuilder, Language};
pub use error::{ContractReaderError, ErrorKind};
pub use normalize::{normalize, FieldProvenance, NormalizedSummary, Party};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use report::{obtain_report, render_text, save_report, Report, ReportOrigin};
pub use result::{AnalysisResult, Schema};
pub use upload::{Phase, UploadFile, UploadOrchestrator, UploadState};
