//! The analysis service the orchestrator talks to.
//!
//! [`AnalysisBackend`] is the only seam with network I/O. Two implementations
//! ship with the crate:
//!
//! - [`HttpBackend`]: the real service over HTTP (multipart upload, JSON
//!   response), with the dev-only simulation route;
//! - [`SimulatedBackend`]: an in-process stand-in producing Board-Ready
//!   payloads, for offline runs and tests.
//!
//! Backends never enforce the analysis deadline themselves; the orchestrator
//! owns the timeout so that it can tear the request down together with its
//! timers.

pub mod http;
pub mod simulate;

pub use http::HttpBackend;
pub use simulate::SimulatedBackend;

use crate::error::ContractReaderError;
use crate::upload::UploadFile;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submit `file` for analysis and return the parsed JSON body.
    async fn analyze(&self, file: &UploadFile) -> Result<Value, ContractReaderError>;

    /// Fetch the demonstration contract.
    async fn fetch_sample(&self) -> Result<Vec<u8>, ContractReaderError>;

    /// Download a pre-rendered report. A missing report is
    /// [`ContractReaderError::ReportNotFound`].
    async fn download_report(&self, url: &str) -> Result<Vec<u8>, ContractReaderError>;
}
