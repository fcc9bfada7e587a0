//! End-to-end tests for contract-reader.
//!
//! Everything runs in-process: the simulated backend (or a small fake) stands
//! in for the analysis service and tokio's paused clock drives the timers, so
//! these tests need neither network nor wall-clock time.
//!
//! Run with:
//!   cargo test --test end_to_end

use async_trait::async_trait;
use chrono::NaiveDate;
use contract_reader::report::pdf::win_ansi;
use contract_reader::report::{generate_report, layout, LayoutOptions};
use contract_reader::upload::SAMPLE_FILENAME;
use contract_reader::{
    normalize, render_text, save_report, AnalysisBackend, AnalysisResult, ClientConfig,
    ContractReaderError, ErrorKind, Language, Phase, ProgressCallback, Schema, SimulatedBackend,
    UploadFile, UploadOrchestrator, UploadProgressCallback,
};
use lopdf::content::Content;
use lopdf::Document;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(Phase, u8)>>,
    finished: Mutex<Vec<Phase>>,
}

impl UploadProgressCallback for Recorder {
    fn on_progress(&self, phase: Phase, percent: u8) {
        self.events.lock().unwrap().push((phase, percent));
    }

    fn on_finished(&self, phase: Phase, _error: Option<&str>) {
        self.finished.lock().unwrap().push(phase);
    }
}

/// Never answers; only the deadline can end an analysis.
struct Silent;

#[async_trait]
impl AnalysisBackend for Silent {
    async fn analyze(&self, _file: &UploadFile) -> Result<Value, ContractReaderError> {
        std::future::pending().await
    }

    async fn fetch_sample(&self) -> Result<Vec<u8>, ContractReaderError> {
        Err(ContractReaderError::SampleUnavailable { status: 404 })
    }

    async fn download_report(&self, url: &str) -> Result<Vec<u8>, ContractReaderError> {
        Err(ContractReaderError::ReportNotFound { url: url.into() })
    }
}

fn simulated(latency: Duration) -> UploadOrchestrator {
    UploadOrchestrator::new(
        Arc::new(SimulatedBackend::new().with_latency(latency)),
        ClientConfig::default(),
    )
}

fn result(value: Value) -> AnalysisResult {
    AnalysisResult::from_value(value).expect("test payloads are JSON objects")
}

/// Every string drawn with `Tj`, page by page, in content order.
fn pdf_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(bytes).expect("generated PDF must parse");
    let mut strings = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let raw = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&raw).unwrap();
        for op in content.operations.iter().filter(|op| op.operator == "Tj") {
            strings.push(op.operands[0].as_str().unwrap().to_vec());
        }
    }
    strings
}

// ── Normalization ────────────────────────────────────────────────────────────

#[test]
fn missing_object_is_not_specified() {
    let summary = normalize(&result(json!({"analysis": {"parties": []}})));
    assert_eq!(summary.object, "Non spécifié");
    assert_eq!(summary.provenance.object, None);
}

#[test]
fn explicit_rgpd_false_is_not_overridden() {
    let summary = normalize(&result(json!({
        "meta": {"version": "3.0"},
        "contract": {"data_privacy": {"rgpd": false}},
        "analysis": {"compliance": {"rgpd": true}}
    })));
    assert_eq!(summary.schema, Schema::UniversalV3);
    assert!(!summary.rgpd_compliant);
    assert_eq!(summary.provenance.rgpd, Some("contract.data_privacy.rgpd"));
}

#[test]
fn minimal_payload_renders_with_defaults() {
    let r = result(json!({"foo": 1}));
    assert_eq!(r.schema(), Schema::Minimal);

    let summary = normalize(&r);
    assert!(summary.parties.is_empty());
    assert!(summary.risks.is_empty());
    assert_eq!(summary.object, "Non spécifié");

    let text = render_text(&summary, Language::Fr);
    assert!(text.contains("Non spécifié"));
}

// ── Intake and lifecycle ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn uppercase_extension_without_mime_is_accepted() {
    let o = simulated(Duration::from_secs(2));
    let file = UploadFile::new("x.PDF", Some(String::new()), b"%PDF-1.4".to_vec());
    let r = assert_ok!(o.submit(file).await);

    assert_eq!(r.schema(), Schema::BoardReady);
    let state = o.state();
    assert_eq!(state.phase, Phase::Success);
    assert_eq!(state.progress, 100);
    assert_eq!(state.error_message, None);
}

#[tokio::test(start_paused = true)]
async fn non_pdf_is_rejected_before_any_request() {
    let o = UploadOrchestrator::new(Arc::new(Silent), ClientConfig::default());
    let file = UploadFile::new("notes.txt", Some("text/plain".into()), b"hello".to_vec());
    let err = assert_err!(o.submit(file).await);

    assert_eq!(err.kind(), ErrorKind::InvalidFileType);
    let state = o.state();
    assert_eq!(state.phase, Phase::Idle);
    assert!(state.error_message.is_some());
    assert!(!o.is_busy());
}

#[tokio::test(start_paused = true)]
async fn analyzing_progress_stays_below_complete() {
    let recorder = Arc::new(Recorder::default());
    let o = simulated(Duration::from_secs(28)).with_callback(recorder.clone() as ProgressCallback);
    o.submit(UploadFile::new("bail.pdf", None, b"%PDF".to_vec()))
        .await
        .unwrap();

    let analyzing: Vec<u8> = recorder
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|(phase, _)| *phase == Phase::Analyzing)
        .map(|(_, percent)| *percent)
        .collect();
    assert!(!analyzing.is_empty());
    assert!(analyzing.iter().all(|p| *p < 100));
    assert!(analyzing.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recorder.finished.lock().unwrap().as_slice(), [Phase::Success]);
}

#[tokio::test(start_paused = true)]
async fn state_while_request_pending_is_never_complete() {
    let o = simulated(Duration::from_secs(28));
    let handle = tokio::spawn({
        let o = o.clone();
        async move { o.submit(UploadFile::new("bail.pdf", None, b"%PDF".to_vec())).await }
    });

    let mut seen = Vec::new();
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let state = o.state();
        match state.phase {
            Phase::Uploading => continue,
            Phase::Analyzing => {
                assert!(o.is_busy());
                assert!(state.progress < 100, "progress {} while pending", state.progress);
                assert!(state.result.is_none());
                seen.push(state.progress);
            }
            _ => break,
        }
    }

    assert!(seen.len() > 10);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_ok!(handle.await.unwrap());
    assert_eq!(o.state().phase, Phase::Success);
    assert_eq!(o.state().progress, 100);
}

#[tokio::test(start_paused = true)]
async fn timeout_tears_everything_down() {
    let recorder = Arc::new(Recorder::default());
    let o = UploadOrchestrator::new(Arc::new(Silent), ClientConfig::default())
        .with_callback(recorder.clone() as ProgressCallback);
    let err = o
        .submit(UploadFile::new("lent.pdf", None, b"%PDF".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    let state = o.state();
    assert_eq!(state.phase, Phase::Error);
    assert!(state.error_message.as_deref().unwrap().contains("30s"));
    assert!(!o.is_busy());

    let seen = recorder.events.lock().unwrap().len();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(recorder.events.lock().unwrap().len(), seen);
    assert_eq!(o.state().progress, state.progress);
}

#[tokio::test(start_paused = true)]
async fn sample_runs_through_the_same_pipeline() {
    let o = simulated(Duration::from_secs(1));
    let r = assert_ok!(o.load_sample().await);
    assert_eq!(r.schema(), Schema::BoardReady);

    let summary = o.summary().unwrap();
    assert!(!summary.parties.is_empty());
    assert_eq!(summary.document.filename.as_deref(), Some(SAMPLE_FILENAME));
}

#[tokio::test(start_paused = true)]
async fn unavailable_sample_sets_error_state() {
    let o = UploadOrchestrator::new(Arc::new(Silent), ClientConfig::default());
    let err = assert_err!(o.load_sample().await);
    assert_eq!(err.kind(), ErrorKind::SampleUnavailable);
    assert_eq!(o.state().phase, Phase::Error);
}

// ── Report ───────────────────────────────────────────────────────────────────

#[test]
fn board_ready_risks_become_ordered_bullets() {
    let summary = normalize(&result(json!({
        "success": true,
        "analysis": {"meta": {"version": "3.0"}, "risks_red_flags": ["a", "b"]}
    })));
    assert_eq!(summary.risks, vec!["a", "b"]);

    let options = LayoutOptions::from_config(&ClientConfig::default(), "07/03/2025");
    let doc = layout(&summary, &options);
    let bullets: Vec<&str> = doc.texts().filter(|t| t.starts_with("• ")).collect();
    assert_eq!(bullets, vec!["• a", "• b"]);

    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    let report = generate_report(&summary, &ClientConfig::default(), date).unwrap();
    assert_eq!(report.filename, "rapport_board_ready_2025-03-07.pdf");

    let strings = pdf_strings(&report.bytes);
    let a = strings.iter().position(|s| *s == win_ansi("• a"));
    let b = strings.iter().position(|s| *s == win_ansi("• b"));
    assert!(a.is_some() && b.is_some());
    assert!(a < b);
}

#[test]
fn long_risk_lists_paginate() {
    let risks: Vec<String> = (1..=80).map(|i| format!("Risque numéro {i}")).collect();
    let summary = normalize(&result(json!({"analysis": {"risks": risks}})));
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let report = generate_report(&summary, &ClientConfig::default(), date).unwrap();

    let doc = Document::load_mem(&report.bytes).unwrap();
    assert!(doc.get_pages().len() > 1);
    let strings = pdf_strings(&report.bytes);
    assert!(strings.contains(&win_ansi("• Risque numéro 80")));
}

#[tokio::test]
async fn saved_report_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let summary = normalize(&result(json!({
        "analysis": {"object": "Bail commercial", "parties": [{"name": "ACME", "role": "bailleur"}]}
    })));
    let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    let report = generate_report(&summary, &ClientConfig::default(), date).unwrap();
    let path = save_report(&report, dir.path()).await.unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let strings = pdf_strings(&bytes);
    assert!(strings.iter().any(|s| s.ends_with(&win_ansi("ACME"))));
}
