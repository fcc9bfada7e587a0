//! Upload lifecycle state.

use crate::error::ErrorKind;
use crate::result::AnalysisResult;
use serde::Serialize;
use std::fmt;

/// Lifecycle phase of the current attempt.
///
/// `Idle → Uploading → Analyzing → {Success | Error} → (reset) → Idle`.
/// Intake rejection reports an error without leaving `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Success,
    Error,
}

impl Phase {
    /// Whether an attempt is running.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Uploading | Phase::Analyzing)
    }

    /// Whether the phase is `Success` or `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Analyzing => "analyzing",
            Phase::Success => "success",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the orchestrator's state.
///
/// Outside the active phases, `Success` carries a result and `Error` carries
/// a message. One exception: a file rejected at intake only sets
/// `error_message` and `error_kind`, so after a rejection in `Success` both
/// the earlier result and the rejection message are present.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub phase: Phase,
    /// 0–100; meaningful during `Uploading` and `Analyzing`.
    pub progress: u8,
    pub status_message: String,
    pub result: Option<AnalysisResult>,
    pub error_message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Number of the current (or last) accepted attempt; 0 before the first.
    pub attempt: u64,
}

impl UploadState {
    /// Clear everything except the attempt counter.
    pub(crate) fn clear(&mut self) {
        *self = Self {
            attempt: self.attempt,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_predicates() {
        assert!(Phase::Uploading.is_active());
        assert!(Phase::Analyzing.is_active());
        assert!(!Phase::Idle.is_active());
        assert!(Phase::Success.is_terminal());
        assert!(!Phase::Analyzing.is_terminal());
    }

    #[test]
    fn clear_keeps_attempt_counter() {
        let mut s = UploadState {
            phase: Phase::Error,
            error_message: Some("x".into()),
            attempt: 3,
            ..Default::default()
        };
        s.clear();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(s.error_message, None);
        assert_eq!(s.attempt, 3);
    }
}
