//! The upload state machine.
//!
//! One [`UploadOrchestrator`] drives one submission at a time through
//! `Idle → Uploading → Analyzing → {Success | Error}`.
//!
//! ## Attempts
//!
//! Every accepted submission opens a numbered *attempt*. The shared state
//! remembers which attempt is active; every write made on behalf of an
//! attempt first checks that it is still the active one. `reset()` clears the
//! active slot, so a request finishing after a reset cannot resurrect a
//! result or an error.
//!
//! ## Teardown
//!
//! During `Analyzing` the backend request, the status ticker, the deadline
//! and the cancel signal are the four arms of one `tokio::select!`. Leaving
//! the select drops all of them at once: a finished request stops the
//! ticker, an elapsed deadline aborts the request, and no timer outlives the
//! attempt.

use super::file::{UploadFile, PDF_MIME};
use super::state::{Phase, UploadState};
use crate::backend::AnalysisBackend;
use crate::config::ClientConfig;
use crate::error::ContractReaderError;
use crate::normalize::{normalize, NormalizedSummary};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::result::AnalysisResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, warn};

/// Name given to the demonstration contract when it is submitted.
pub const SAMPLE_FILENAME: &str = "contrat_exemple_XYQO.pdf";

/// Progress added per analysis status step, capped at [`ANALYZING_CAP`].
const STATUS_STEP_PERCENT: usize = 18;
/// Highest progress shown while the request is pending.
pub const ANALYZING_CAP: u8 = 90;

struct Active {
    attempt: u64,
    cancel: Arc<Notify>,
}

#[derive(Default)]
struct Shared {
    state: UploadState,
    active: Option<Active>,
}

impl Shared {
    fn is_current(&self, attempt: u64) -> bool {
        self.active.as_ref().is_some_and(|a| a.attempt == attempt)
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives file submissions against an [`AnalysisBackend`].
///
/// Cheap to clone: clones share the same state, so one clone can `cancel()`
/// or `reset()` while another awaits `submit()`.
#[derive(Clone)]
pub struct UploadOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    config: ClientConfig,
    callback: ProgressCallback,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl UploadOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            callback: Arc::new(NoopProgressCallback),
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Receive lifecycle events through `callback`.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = callback;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn AnalysisBackend> {
        &self.backend
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> UploadState {
        lock(&self.shared).state.clone()
    }

    /// The current result, normalized. Recomputed on every call.
    pub fn summary(&self) -> Option<NormalizedSummary> {
        lock(&self.shared).state.result.as_ref().map(normalize)
    }

    /// Whether an attempt is in flight.
    pub fn is_busy(&self) -> bool {
        lock(&self.shared).active.is_some()
    }

    /// Submit `file` for analysis and wait for the outcome.
    ///
    /// Rejected with [`ContractReaderError::Busy`] while another attempt is
    /// in flight (state untouched), and with
    /// [`ContractReaderError::InvalidFileType`] when `file` is not a PDF
    /// (only the error fields change). Dropping the returned future abandons
    /// the attempt and returns the state to `Idle`.
    pub async fn submit(&self, file: UploadFile) -> Result<AnalysisResult, ContractReaderError> {
        let m = self.config.language.messages();
        let (attempt, cancel) = {
            let mut shared = lock(&self.shared);
            if shared.active.is_some() {
                warn!("Rejected '{}': an analysis is already in flight", file.name);
                return Err(ContractReaderError::Busy);
            }
            if let Err(e) = file.ensure_pdf() {
                let message = e.user_message(self.config.language);
                shared.state.error_message = Some(message.clone());
                shared.state.error_kind = Some(e.kind());
                let phase = shared.state.phase;
                drop(shared);
                warn!("Rejected '{}': {}", file.name, e);
                self.callback.on_finished(phase, Some(&message));
                return Err(e);
            }

            let attempt = shared.state.attempt + 1;
            shared.state = UploadState {
                phase: Phase::Uploading,
                status_message: m.uploading.to_string(),
                attempt,
                ..UploadState::default()
            };
            let cancel = Arc::new(Notify::new());
            shared.active = Some(Active {
                attempt,
                cancel: Arc::clone(&cancel),
            });
            (attempt, cancel)
        };

        info!(attempt, "Uploading '{}' ({} bytes)", file.name, file.bytes.len());
        self.callback.on_phase_change(Phase::Uploading);
        self.callback.on_status(m.uploading);

        let _guard = AttemptGuard {
            shared: Arc::clone(&self.shared),
            attempt,
        };
        let outcome = match self.simulate_upload(attempt, &cancel).await {
            Ok(()) => self.analyze(attempt, &file, &cancel).await,
            Err(e) => Err(e),
        };
        self.finish(attempt, outcome)
    }

    /// Fetch the demonstration contract and submit it.
    pub async fn load_sample(&self) -> Result<AnalysisResult, ContractReaderError> {
        if self.is_busy() {
            return Err(ContractReaderError::Busy);
        }
        let bytes = match self.backend.fetch_sample().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let e = match e {
                    ContractReaderError::SampleUnavailable { .. } => e,
                    other => ContractReaderError::SampleFetchFailed {
                        reason: other.to_string(),
                    },
                };
                warn!("Sample contract unavailable: {}", e);
                let message = e.user_message(self.config.language);
                {
                    let mut shared = lock(&self.shared);
                    if shared.active.is_some() {
                        return Err(e);
                    }
                    shared.state.phase = Phase::Error;
                    shared.state.result = None;
                    shared.state.error_message = Some(message.clone());
                    shared.state.error_kind = Some(e.kind());
                }
                self.callback.on_phase_change(Phase::Error);
                self.callback.on_finished(Phase::Error, Some(&message));
                return Err(e);
            }
        };
        debug!("Sample contract fetched ({} bytes)", bytes.len());
        let file = UploadFile::new(SAMPLE_FILENAME, Some(PDF_MIME.to_string()), bytes);
        self.submit(file).await
    }

    /// Abort the in-flight attempt, if any. The attempt ends in `Idle` and
    /// its `submit` returns [`ContractReaderError::Cancelled`].
    pub fn cancel(&self) -> bool {
        match &lock(&self.shared).active {
            Some(active) => {
                info!(attempt = active.attempt, "Cancelling analysis");
                active.cancel.notify_one();
                true
            }
            None => false,
        }
    }

    /// Return to `Idle` with every transient field cleared, cancelling any
    /// in-flight attempt.
    pub fn reset(&self) {
        {
            let mut shared = lock(&self.shared);
            if let Some(active) = shared.active.take() {
                info!(attempt = active.attempt, "Reset during analysis");
                active.cancel.notify_one();
            }
            shared.state.clear();
        }
        self.callback.on_phase_change(Phase::Idle);
    }

    // ── Attempt stages ───────────────────────────────────────────────────

    /// Apply `write` if `attempt` is still the active one.
    fn update(&self, attempt: u64, write: impl FnOnce(&mut UploadState)) -> bool {
        let mut shared = lock(&self.shared);
        if shared.is_current(attempt) {
            write(&mut shared.state);
            true
        } else {
            false
        }
    }

    /// Drive progress 0 → 100 in fixed steps. Not tied to real transfer.
    async fn simulate_upload(&self, attempt: u64, cancel: &Notify) -> Result<(), ContractReaderError> {
        let step = self.config.upload_step.max(1);
        let mut percent = 0u8;
        loop {
            if !self.update(attempt, |s| s.progress = percent) {
                return Err(ContractReaderError::Cancelled);
            }
            self.callback.on_progress(Phase::Uploading, percent);

            tokio::select! {
                () = sleep(self.config.upload_step_delay) => {}
                () = cancel.notified() => return Err(ContractReaderError::Cancelled),
            }
            if percent == 100 {
                return Ok(());
            }
            percent = percent.saturating_add(step).min(100);
        }
    }

    /// Issue the request under the deadline while ticking status messages.
    async fn analyze(
        &self,
        attempt: u64,
        file: &UploadFile,
        cancel: &Notify,
    ) -> Result<AnalysisResult, ContractReaderError> {
        let m = self.config.language.messages();
        let entered = self.update(attempt, |s| {
            s.phase = Phase::Analyzing;
            s.progress = 0;
            s.status_message = m.analyzing.to_string();
        });
        if !entered {
            return Err(ContractReaderError::Cancelled);
        }
        info!(attempt, "Analysis request sent");
        self.callback.on_phase_change(Phase::Analyzing);
        self.callback.on_progress(Phase::Analyzing, 0);
        self.callback.on_status(m.analyzing);

        let timeout = self.config.request_timeout;
        let interval = self.config.status_interval;
        let request = self.backend.analyze(file);
        let deadline = sleep(timeout);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        tokio::pin!(request, deadline);

        let mut step = 0usize;
        loop {
            tokio::select! {
                response = &mut request => {
                    return response.and_then(AnalysisResult::from_value);
                }
                () = &mut deadline => {
                    warn!(attempt, "Analysis timed out after {:?}", timeout);
                    return Err(ContractReaderError::Timeout {
                        secs: timeout.as_secs_f64().ceil() as u64,
                    });
                }
                () = cancel.notified() => return Err(ContractReaderError::Cancelled),
                _ = ticker.tick(), if step < m.analysis_steps.len() => {
                    let status = m.analysis_steps[step];
                    step += 1;
                    let percent = (step * STATUS_STEP_PERCENT).min(ANALYZING_CAP as usize) as u8;
                    let written = self.update(attempt, |s| {
                        s.status_message = status.to_string();
                        s.progress = percent;
                    });
                    if written {
                        debug!(attempt, percent, "{}", status);
                        self.callback.on_status(status);
                        self.callback.on_progress(Phase::Analyzing, percent);
                    }
                }
            }
        }
    }

    /// Write the terminal state of `attempt`, unless it was reset meanwhile.
    fn finish(
        &self,
        attempt: u64,
        outcome: Result<AnalysisResult, ContractReaderError>,
    ) -> Result<AnalysisResult, ContractReaderError> {
        let lang = self.config.language;
        let m = lang.messages();
        let mut shared = lock(&self.shared);
        if !shared.is_current(attempt) {
            debug!(attempt, "Attempt superseded; outcome dropped");
            return Err(ContractReaderError::Cancelled);
        }
        shared.active = None;

        match outcome {
            Ok(result) => {
                shared.state.phase = Phase::Success;
                shared.state.progress = 100;
                shared.state.status_message = m.analysis_done.to_string();
                shared.state.result = Some(result.clone());
                shared.state.error_message = None;
                shared.state.error_kind = None;
                drop(shared);
                info!(attempt, schema = %result.schema(), "Analysis complete");
                self.callback.on_progress(Phase::Success, 100);
                self.callback.on_status(m.analysis_done);
                self.callback.on_phase_change(Phase::Success);
                self.callback.on_finished(Phase::Success, None);
                Ok(result)
            }
            Err(ContractReaderError::Cancelled) => {
                shared.state.clear();
                drop(shared);
                info!(attempt, "Analysis cancelled");
                self.callback.on_phase_change(Phase::Idle);
                self.callback.on_finished(Phase::Idle, Some(m.cancelled));
                Err(ContractReaderError::Cancelled)
            }
            Err(e) => {
                let message = e.user_message(lang);
                shared.state.phase = Phase::Error;
                shared.state.result = None;
                shared.state.error_message = Some(message.clone());
                shared.state.error_kind = Some(e.kind());
                drop(shared);
                warn!(attempt, kind = ?e.kind(), "Analysis failed: {}", e);
                self.callback.on_phase_change(Phase::Error);
                self.callback.on_finished(Phase::Error, Some(&message));
                Err(e)
            }
        }
    }
}

/// Returns the state to `Idle` if a `submit` future is dropped mid-attempt.
struct AttemptGuard {
    shared: Arc<Mutex<Shared>>,
    attempt: u64,
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.is_current(self.attempt) {
            warn!(attempt = self.attempt, "Submission dropped before completion");
            shared.active = None;
            shared.state.clear();
        }
    }
}
