//! The raw analysis payload and its schema detection.
//!
//! The backend has shipped three incompatible JSON shapes over time, and a
//! fourth "anything else" case must still render. [`AnalysisResult`] is a
//! tagged union over those shapes. Each variant keeps the untouched JSON: the
//! payloads are lenient (fields change type between versions), so typed
//! deserialisation would reject real responses that still render fine.

use crate::error::ContractReaderError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// `meta.version` value carried by Board-Ready V2.3 and UniversalContract V3.
pub const V3_VERSION: &str = "3.0";

/// Which schema a payload follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Schema {
    /// UniversalContract V3 at the top level (`meta.version == "3.0"`).
    UniversalV3,
    /// Board-Ready V2.3 wrapped in `{success, analysis: {...}}`.
    BoardReady,
    /// Legacy `{analysis, summary, metadata}` envelope.
    Legacy,
    /// Any other JSON object.
    Minimal,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Schema::UniversalV3 => "UniversalContract V3",
            Schema::BoardReady => "Board-Ready V2.3",
            Schema::Legacy => "legacy",
            Schema::Minimal => "minimal",
        };
        f.write_str(name)
    }
}

/// One analysis payload, tagged by the schema it follows.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    UniversalV3(Value),
    BoardReady(Value),
    Legacy(Value),
    Minimal(Value),
}

impl AnalysisResult {
    /// Classify a parsed JSON body.
    ///
    /// Only non-objects are rejected; every object maps onto some variant.
    pub fn from_value(value: Value) -> Result<Self, ContractReaderError> {
        if !value.is_object() {
            return Err(ContractReaderError::Parse {
                detail: format!("expected a JSON object, got {}", json_type(&value)),
            });
        }
        Ok(match detect(&value) {
            Schema::UniversalV3 => Self::UniversalV3(value),
            Schema::BoardReady => Self::BoardReady(value),
            Schema::Legacy => Self::Legacy(value),
            Schema::Minimal => Self::Minimal(value),
        })
    }

    /// Parse and classify a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ContractReaderError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| ContractReaderError::Parse {
            detail: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn schema(&self) -> Schema {
        match self {
            Self::UniversalV3(_) => Schema::UniversalV3,
            Self::BoardReady(_) => Schema::BoardReady,
            Self::Legacy(_) => Schema::Legacy,
            Self::Minimal(_) => Schema::Minimal,
        }
    }

    /// The whole payload as received.
    pub fn raw(&self) -> &Value {
        match self {
            Self::UniversalV3(v) | Self::BoardReady(v) | Self::Legacy(v) | Self::Minimal(v) => v,
        }
    }

    pub fn into_raw(self) -> Value {
        match self {
            Self::UniversalV3(v) | Self::BoardReady(v) | Self::Legacy(v) | Self::Minimal(v) => v,
        }
    }

    /// The object the document renderer reads from: `analysis` when it is an
    /// object, otherwise the top level.
    pub fn report_root(&self) -> &Value {
        let raw = self.raw();
        match raw.get("analysis") {
            Some(analysis) if analysis.is_object() => analysis,
            _ => raw,
        }
    }
}

fn detect(value: &Value) -> Schema {
    if has_v3_meta(value) {
        return Schema::UniversalV3;
    }
    match value.get("analysis") {
        Some(analysis) if has_v3_meta(analysis) => return Schema::BoardReady,
        Some(analysis) if analysis.is_object() => return Schema::Legacy,
        _ => {}
    }
    if ["summary", "metadata"]
        .iter()
        .any(|key| value.get(key).is_some_and(Value::is_object))
    {
        return Schema::Legacy;
    }
    Schema::Minimal
}

fn has_v3_meta(value: &Value) -> bool {
    value
        .get("meta")
        .and_then(|meta| meta.get("version"))
        .and_then(Value::as_str)
        == Some(V3_VERSION)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_top_level_v3() {
        let r = AnalysisResult::from_value(json!({"meta": {"version": "3.0"}})).unwrap();
        assert_eq!(r.schema(), Schema::UniversalV3);
        assert_eq!(r.report_root(), r.raw());
    }

    #[test]
    fn detects_wrapped_board_ready() {
        let r = AnalysisResult::from_value(json!({
            "success": true,
            "analysis": {"meta": {"version": "3.0"}, "risks_red_flags": []}
        }))
        .unwrap();
        assert_eq!(r.schema(), Schema::BoardReady);
        assert!(r.report_root().get("risks_red_flags").is_some());
    }

    #[test]
    fn detects_legacy_envelopes() {
        let with_analysis = json!({"analysis": {"object": "Bail"}});
        let with_summary = json!({"summary": {"title": "Bail"}});
        let with_metadata = json!({"metadata": {"analysis_id": "a1"}});
        for v in [with_analysis, with_summary, with_metadata] {
            assert_eq!(AnalysisResult::from_value(v).unwrap().schema(), Schema::Legacy);
        }
    }

    #[test]
    fn other_objects_are_minimal() {
        let r = AnalysisResult::from_value(json!({"classification": {"family": "bail"}})).unwrap();
        assert_eq!(r.schema(), Schema::Minimal);
    }

    #[test]
    fn old_meta_version_is_not_v3() {
        let r = AnalysisResult::from_value(json!({"meta": {"version": "2.0"}})).unwrap();
        assert_eq!(r.schema(), Schema::Minimal);
    }

    #[test]
    fn non_objects_are_parse_errors() {
        let err = AnalysisResult::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(AnalysisResult::from_slice(b"<html>").is_err());
    }
}
