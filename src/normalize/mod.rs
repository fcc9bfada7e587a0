//! Collapse any [`AnalysisResult`] into one [`NormalizedSummary`].
//!
//! Two layers:
//!
//! 1. **Table fields** (object, parties, applicable law, RGPD, risks) are
//!    resolved for every schema through the shared chains in [`chain`]. The
//!    chains list the V3 paths first and the legacy paths after, so a single
//!    precedence order serves every payload.
//! 2. **Variant details** (classification, money, executive summary,
//!    jurisdiction, document metadata) live in different places per schema.
//!    Each [`Schema`] has its own mapping function and [`normalize`] matches
//!    the union exhaustively, so a new variant cannot silently fall into a
//!    default branch.
//!
//! Normalization never fails and is recomputed on every render; nothing here
//! caches or mutates the payload.

pub mod chain;
pub mod fields;

use crate::result::{AnalysisResult, Schema};
use chain::{as_array, as_string, first_defined, first_string, lookup};
use fields::{risk_text, rgpd_flag};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub use fields::{
    Classification, FinancialShape, FinancialSummary, Party, DEFAULT_CURRENCY, DEFAULT_ROLE,
    NOT_SPECIFIED,
};

/// The canonical, shape-independent view of one contract analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSummary {
    pub schema: Schema,
    pub object: String,
    pub parties: Vec<Party>,
    pub applicable_law: String,
    pub rgpd_compliant: bool,
    pub risks: Vec<String>,
    pub financial: FinancialSummary,
    pub classification: Classification,
    pub executive_summary: Option<String>,
    pub jurisdiction: Option<String>,
    pub document: DocumentInfo,
    pub provenance: FieldProvenance,
}

/// Identifiers and links attached to the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub analysis_id: Option<String>,
    pub download_url: Option<String>,
    pub processed_at: Option<String>,
    pub filename: Option<String>,
}

/// The path that resolved each table field; `None` means the default applied.
///
/// This is how callers tell "the backend sent `[]`" from "the backend sent
/// nothing": both normalize to an empty list, only the provenance differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldProvenance {
    pub object: Option<&'static str>,
    pub parties: Option<&'static str>,
    pub applicable_law: Option<&'static str>,
    pub rgpd: Option<&'static str>,
    pub risks: Option<&'static str>,
    pub financial: Option<FinancialShape>,
}

/// Schema-specific details, produced by one mapping function per variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDetails {
    pub classification: Classification,
    pub financial: Option<(FinancialSummary, FinancialShape)>,
    pub executive_summary: Option<String>,
    pub jurisdiction: Option<String>,
    pub document: DocumentInfo,
}

/// Normalize a payload. Infallible: unresolved fields take their defaults.
pub fn normalize(result: &AnalysisResult) -> NormalizedSummary {
    let raw = result.raw();
    let mut provenance = FieldProvenance::default();

    let object = first_defined(raw, chain::OBJECT_CHAIN, as_string);
    provenance.object = object.as_ref().map(|r| r.path);

    let parties = first_defined(raw, chain::PARTIES_CHAIN, as_array);
    provenance.parties = parties.as_ref().map(|r| r.path);

    let law = first_defined(raw, chain::LAW_CHAIN, as_string);
    provenance.applicable_law = law.as_ref().map(|r| r.path);

    let rgpd = first_defined(raw, chain::RGPD_CHAIN, rgpd_flag);
    provenance.rgpd = rgpd.as_ref().map(|r| r.path);

    let risks = first_defined(raw, chain::RISKS_CHAIN, as_array);
    provenance.risks = risks.as_ref().map(|r| r.path);

    let details = match result {
        AnalysisResult::UniversalV3(v) => map_universal_v3(v),
        AnalysisResult::BoardReady(v) => map_board_ready(v),
        AnalysisResult::Legacy(v) => map_legacy(v),
        AnalysisResult::Minimal(v) => map_minimal(v),
    };
    provenance.financial = details.financial.as_ref().map(|(_, shape)| *shape);

    debug!(schema = %result.schema(), ?provenance, "Normalized analysis result");

    NormalizedSummary {
        schema: result.schema(),
        object: object
            .map(|r| r.value)
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        parties: parties
            .map(|r| r.value.iter().map(Party::from_value).collect())
            .unwrap_or_default(),
        applicable_law: law
            .map(|r| r.value)
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        rgpd_compliant: rgpd.map(|r| r.value).unwrap_or(false),
        risks: risks
            .map(|r| r.value.iter().filter_map(risk_text).collect())
            .unwrap_or_default(),
        financial: details.financial.map(|(f, _)| f).unwrap_or_default(),
        classification: details.classification,
        executive_summary: details.executive_summary,
        jurisdiction: details.jurisdiction,
        document: details.document,
        provenance,
    }
}

// ── Variant mappings ─────────────────────────────────────────────────────────

/// UniversalContract V3: everything at the top level, metadata under `meta`.
pub fn map_universal_v3(raw: &Value) -> VariantDetails {
    let mut details = contract_details(raw);
    details.document = DocumentInfo {
        processed_at: first_string(raw, &["meta.generated_at", "metadata.processed_at"]),
        filename: first_string(raw, &["meta.source_doc_info.filename", "metadata.filename"]),
        ..envelope_document(raw)
    };
    details
}

/// Board-Ready V2.3: the contract sits under `analysis`; ids and links stay
/// on the envelope.
pub fn map_board_ready(raw: &Value) -> VariantDetails {
    let root = raw.get("analysis").unwrap_or(raw);
    let mut details = contract_details(root);
    details.document = DocumentInfo {
        processed_at: first_string(root, &["meta.generated_at"])
            .or_else(|| first_string(raw, &["metadata.processed_at"])),
        filename: first_string(root, &["meta.source_doc_info.filename"])
            .or_else(|| first_string(raw, &["metadata.filename"])),
        ..envelope_document(raw)
    };
    details
}

/// Legacy: contract under `analysis` (when it is an object), identifiers
/// under `metadata`, headline under `summary`.
pub fn map_legacy(raw: &Value) -> VariantDetails {
    let root = match raw.get("analysis") {
        Some(analysis) if analysis.is_object() => analysis,
        _ => raw,
    };
    let mut details = contract_details(root);
    if details.executive_summary.is_none() {
        details.executive_summary = first_string(raw, &["summary.text", "summary.summary"]);
    }
    details.document = DocumentInfo {
        processed_at: first_string(raw, &["metadata.processed_at"]),
        filename: first_string(raw, &["metadata.filename"]),
        ..envelope_document(raw)
    };
    details
}

/// Anything else: read every detail from the top level.
pub fn map_minimal(raw: &Value) -> VariantDetails {
    let mut details = contract_details(raw);
    details.document = DocumentInfo {
        processed_at: first_string(raw, &["metadata.processed_at", "meta.generated_at"]),
        filename: first_string(raw, &["metadata.filename", "meta.source_doc_info.filename"]),
        ..envelope_document(raw)
    };
    details
}

/// Contract-level details read relative to `root`.
fn contract_details(root: &Value) -> VariantDetails {
    VariantDetails {
        classification: fields::classification(root),
        financial: fields::financial_summary(root),
        executive_summary: first_string(root, &["summary_plain", "executive_summary"]),
        jurisdiction: first_string(root, &["governance.jurisdiction"]),
        document: DocumentInfo::default(),
    }
}

/// Identifier and report link, which every backend version puts on the
/// envelope.
fn envelope_document(raw: &Value) -> DocumentInfo {
    DocumentInfo {
        analysis_id: first_string(
            raw,
            &["metadata.analysis_id", "metadata.processing_id", "processing_id"],
        ),
        download_url: first_string(
            raw,
            &[
                "metadata.download_url",
                "metadata.pdf_download_url",
                "pdf_download_url",
            ],
        )
        .filter(|url| !url.is_empty()),
        processed_at: None,
        filename: None,
    }
}

impl NormalizedSummary {
    /// Whether a table field fell back to its default.
    pub fn is_default_object(&self) -> bool {
        self.provenance.object.is_none()
    }

    /// Whether the backend sent a risks list at all (possibly empty).
    pub fn risks_reported(&self) -> bool {
        self.provenance.risks.is_some()
    }
}

/// Raw value at `path`, for callers that need a field outside the summary.
pub fn raw_field<'a>(result: &'a AnalysisResult, path: &str) -> Option<&'a Value> {
    lookup(result.raw(), path)
}
