//! File intake and the upload lifecycle.
//!
//! ```text
//! UploadFile ──▶ intake check ──▶ Uploading ──▶ Analyzing ──▶ Success | Error
//!  (bytes)       (PDF by MIME     (simulated    (request +
//!                 or extension)    0..100)       status ticks)
//! ```
//!
//! 1. [`file`]: the submitted file and the PDF intake rule
//! 2. [`state`]: [`Phase`] and the [`UploadState`] snapshot
//! 3. [`orchestrator`]: the state machine that owns the request and its
//!    timers

pub mod file;
pub mod orchestrator;
pub mod state;

pub use file::{UploadFile, PDF_MIME};
pub use orchestrator::{UploadOrchestrator, SAMPLE_FILENAME};
pub use state::{Phase, UploadState};
