//! Progress-callback trait for upload lifecycle events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::upload::UploadOrchestrator::with_callback`] to receive events as
//! an attempt moves through its phases. The orchestrator's own
//! [`crate::upload::UploadState`] is always the source of truth; callbacks are
//! a push-style mirror of the same writes, made after the state lock is
//! released.
//!
//! # Example
//!
//! ```rust
//! use contract_reader::{Phase, UploadProgressCallback};
//! use std::sync::atomic::{AtomicU8, Ordering};
//!
//! struct LastPercent(AtomicU8);
//!
//! impl UploadProgressCallback for LastPercent {
//!     fn on_progress(&self, _phase: Phase, percent: u8) {
//!         self.0.store(percent, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::upload::Phase;
use std::sync::Arc;

/// Called by the orchestrator on every state write of the current attempt.
///
/// Implementations must be `Send + Sync` (the attempt runs on a Tokio task
/// and may be observed from another). All methods have default no-op
/// implementations so callers only override what they care about.
pub trait UploadProgressCallback: Send + Sync {
    /// The attempt entered `phase`.
    fn on_phase_change(&self, phase: Phase) {
        let _ = phase;
    }

    /// Simulated progress changed. `percent` never decreases within a phase
    /// and only reaches 100 in [`Phase::Uploading`] or on success.
    fn on_progress(&self, phase: Phase, percent: u8) {
        let _ = (phase, percent);
    }

    /// A new human-readable status line.
    fn on_status(&self, message: &str) {
        let _ = message;
    }

    /// The attempt ended in `phase` (`Success`, `Error` or `Idle` when
    /// cancelled). `error` is the user-facing message on failure.
    fn on_finished(&self, phase: Phase, error: Option<&str>) {
        let _ = (phase, error);
    }
}

/// No-op implementation used when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Type alias for a shared, dynamic progress callback.
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
