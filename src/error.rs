//! Error types for the contract-reader library.
//!
//! One enum, [`ContractReaderError`], covers every failure the client can
//! observe. The variants are fine-grained for logging, while [`ErrorKind`]
//! collapses them onto the small taxonomy the upload screen cares about
//! (invalid file, timeout, network, server, parse, report generation).
//!
//! The upload state exposes a single human string for the current error;
//! [`ContractReaderError::user_message`] builds it from the language table
//! so the kind stays explicit internally while the display stays simple.

use crate::config::Language;
use crate::i18n::fill;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a [`ContractReaderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Rejected at intake; no request was issued.
    InvalidFileType,
    /// Client-enforced deadline exceeded; the request was aborted.
    Timeout,
    /// Transport failure (DNS, connection refused, TLS).
    NetworkError,
    /// Non-2xx HTTP response.
    ServerError,
    /// Response body was not a JSON object.
    ParseError,
    /// Local document synthesis failed.
    ReportGenerationError,
    /// A submission was already in flight.
    Busy,
    /// The in-flight attempt was cancelled by the caller.
    Cancelled,
    /// The sample contract could not be obtained.
    SampleUnavailable,
    /// Invalid configuration.
    Config,
    /// Local file-system failure.
    Io,
}

/// All errors returned by the contract-reader library.
#[derive(Debug, Error)]
pub enum ContractReaderError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// The file is neither typed `application/pdf` nor named `*.pdf`.
    #[error("'{name}' is not a PDF (content type: {content_type:?})")]
    InvalidFileType {
        name: String,
        content_type: Option<String>,
    },

    /// `submit` was called while another attempt was still running.
    #[error("An analysis is already in flight")]
    Busy,

    /// The attempt was cancelled through `cancel()` or `reset()`.
    #[error("Analysis cancelled")]
    Cancelled,

    // ── Transport errors ──────────────────────────────────────────────────
    /// The analysis did not answer before the client deadline.
    #[error("Analysis timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The request never produced an HTTP response.
    #[error("Network error contacting '{url}': {reason}")]
    Network { url: String, reason: String },

    /// The backend answered with a non-2xx status.
    #[error("Server returned {status} {reason} for '{url}'")]
    Server {
        url: String,
        status: u16,
        reason: String,
    },

    // ── Response errors ───────────────────────────────────────────────────
    /// The body could not be read as a JSON object.
    #[error("Unreadable analysis response: {detail}")]
    Parse { detail: String },

    // ── Sample / report errors ────────────────────────────────────────────
    /// The sample endpoint answered with a non-2xx status.
    #[error("Sample contract unavailable (HTTP {status})")]
    SampleUnavailable { status: u16 },

    /// The sample endpoint could not be reached.
    #[error("Failed to fetch the sample contract: {reason}")]
    SampleFetchFailed { reason: String },

    /// The pre-rendered report link answered 404.
    #[error("Report not found at '{url}'")]
    ReportNotFound { url: String },

    /// Local PDF synthesis failed.
    #[error("Report generation failed: {0}")]
    ReportGeneration(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the report file.
    #[error("Failed to write report '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ContractReaderError {
    /// The taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            Self::Busy => ErrorKind::Busy,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::Server { .. } | Self::ReportNotFound { .. } => ErrorKind::ServerError,
            Self::Parse { .. } => ErrorKind::ParseError,
            Self::SampleUnavailable { .. } | Self::SampleFetchFailed { .. } => {
                ErrorKind::SampleUnavailable
            }
            Self::ReportGeneration(_) => ErrorKind::ReportGenerationError,
            Self::ReadFailed { .. } | Self::OutputWriteFailed { .. } => ErrorKind::Io,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// The single human-readable line shown to the user.
    pub fn user_message(&self, lang: Language) -> String {
        let m = lang.messages();
        match self {
            Self::InvalidFileType { .. } => m.invalid_file_type.to_string(),
            Self::Busy => m.busy.to_string(),
            Self::Cancelled => m.cancelled.to_string(),
            Self::Timeout { secs } => fill(m.timeout, &[("secs", secs.to_string())]),
            Self::Network { .. } => m.network.to_string(),
            Self::Server { status, reason, .. } => fill(
                m.server,
                &[("status", status.to_string()), ("reason", reason.clone())],
            ),
            Self::Parse { .. } => m.parse.to_string(),
            Self::SampleUnavailable { .. } => m.sample_unavailable.to_string(),
            Self::SampleFetchFailed { .. } => m.sample_failed.to_string(),
            Self::ReportGeneration(_) => m.report_failed.to_string(),
            other => fill(m.generic, &[("detail", other.to_string())]),
        }
    }
}
