//! Obtaining the downloadable report: link first, local generation second.
//!
//! When the analysis carries a download link, the pre-rendered document is
//! fetched from it. Only a missing link or a `404` falls back to building the
//! document locally; any other download failure is returned to the caller.

use super::layout::{layout, LayoutOptions};
use super::pdf::encode;
use crate::backend::AnalysisBackend;
use crate::config::ClientConfig;
use crate::error::ContractReaderError;
use crate::normalize::{normalize, NormalizedSummary};
use crate::result::AnalysisResult;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOrigin {
    /// Downloaded from the analysis' link.
    Remote,
    /// Generated from the normalized summary.
    Local,
}

/// A finished report document.
#[derive(Debug, Clone)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub origin: ReportOrigin,
}

/// `resume_contrat_<id>.pdf`, or `resume_contrat_analyse.pdf` without an id.
pub fn remote_filename(analysis_id: Option<&str>) -> String {
    let id = analysis_id
        .map(sanitize)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "analyse".to_string());
    format!("resume_contrat_{id}.pdf")
}

/// `rapport_board_ready_<YYYY-MM-DD>.pdf`.
pub fn local_filename(date: NaiveDate) -> String {
    format!("rapport_board_ready_{}.pdf", date.format("%Y-%m-%d"))
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lay out and encode a report for `summary`, dated `date`.
pub fn generate_report(
    summary: &NormalizedSummary,
    config: &ClientConfig,
    date: NaiveDate,
) -> Result<Report, ContractReaderError> {
    let options = LayoutOptions::from_config(config, date.format("%d/%m/%Y").to_string());
    let document = layout(summary, &options);
    let bytes = encode(&document)?;
    info!(
        "Generated local report: {} page(s), {} bytes",
        document.pages.len(),
        bytes.len()
    );
    Ok(Report {
        filename: local_filename(date),
        bytes,
        origin: ReportOrigin::Local,
    })
}

/// The report for `result`: downloaded when linked, generated otherwise.
pub async fn obtain_report(
    backend: &dyn AnalysisBackend,
    config: &ClientConfig,
    result: &AnalysisResult,
) -> Result<Report, ContractReaderError> {
    obtain_report_for(backend, config, &normalize(result)).await
}

/// [`obtain_report`] for an already-normalized summary.
pub async fn obtain_report_for(
    backend: &dyn AnalysisBackend,
    config: &ClientConfig,
    summary: &NormalizedSummary,
) -> Result<Report, ContractReaderError> {
    if let Some(link) = &summary.document.download_url {
        let url = config.report_url(link);
        match backend.download_report(&url).await {
            Ok(bytes) => {
                info!("Downloaded report from {} ({} bytes)", url, bytes.len());
                return Ok(Report {
                    filename: remote_filename(summary.document.analysis_id.as_deref()),
                    bytes,
                    origin: ReportOrigin::Remote,
                });
            }
            Err(ContractReaderError::ReportNotFound { url }) => {
                warn!("Report not found at {}; generating locally", url);
            }
            Err(e) => return Err(e),
        }
    }
    generate_report(summary, config, Local::now().date_naive())
}

/// Write `report` into `dir` atomically (temp file + rename).
pub async fn save_report(report: &Report, dir: &Path) -> Result<PathBuf, ContractReaderError> {
    let path = dir.join(&report.filename);
    let write_err = |e| ContractReaderError::OutputWriteFailed {
        path: path.clone(),
        source: e,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;
    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &report.bytes)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;

    info!("Saved report to {}", path.display());
    Ok(path)
}
