//! Ordered fallback chains over JSON paths.
//!
//! A chain is a list of dotted paths (`"analysis.parties.list"`), evaluated in
//! order until one yields a *defined* value that the field's extractor
//! accepts. Missing keys and JSON `null` are undefined; `false`, `0`, `""`
//! and `[]` are defined and win. Numeric segments index into arrays
//! (`"financials.amounts.0"`).
//!
//! Both renderers resolve fields only through [`first_defined`], so the
//! screen and the document can never disagree on precedence.

use serde_json::Value;

/// Per-field chains, in precedence order. Paths are relative to the top
/// level of the payload.
pub const OBJECT_CHAIN: &[&str] = &[
    "contract.object",
    "analysis.object",
    "analysis.contract.object",
    "analysis.summary",
    "summary.title",
];

pub const PARTIES_CHAIN: &[&str] = &[
    "parties.list",
    "analysis.parties",
    "analysis.parties.list",
    "summary.parties",
];

pub const LAW_CHAIN: &[&str] = &[
    "governance.law",
    "analysis.governance.applicable_law",
    "analysis.governance.law",
    "analysis.legal.applicable_law",
];

pub const RGPD_CHAIN: &[&str] = &[
    "contract.data_privacy.rgpd",
    "analysis.contract.data_privacy.rgpd",
    "analysis.compliance.rgpd",
    "analysis.rgpd_compliance",
];

pub const RISKS_CHAIN: &[&str] = &[
    "risks_red_flags",
    "analysis.risks",
    "analysis.risks_red_flags",
    "analysis.red_flags",
];

/// A value resolved by a chain, with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub path: &'static str,
}

/// Follow a dotted path. Returns `None` for missing keys and for `null`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// Evaluate `chain` against `root`; the first defined value that `extract`
/// accepts wins.
///
/// `extract` is the field's type filter: returning `None` for a defined
/// value of the wrong JSON type (an object where a string is expected)
/// skips it like an undefined one.
pub fn first_defined<'a, T>(
    root: &'a Value,
    chain: &[&'static str],
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<Resolved<T>> {
    chain.iter().find_map(|&path| {
        lookup(root, path)
            .and_then(&extract)
            .map(|value| Resolved { value, path })
    })
}

/// Extractor for string fields.
pub fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Extractor for list fields.
pub fn as_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array()
}

/// First string found at any of `paths` under `root`.
pub fn first_string(root: &Value, paths: &[&'static str]) -> Option<String> {
    first_defined(root, paths, as_string).map(|r| r.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let v = json!({"a": {"b": [{"c": 1}]}});
        assert_eq!(lookup(&v, "a.b.0.c"), Some(&json!(1)));
        assert_eq!(lookup(&v, "a.b.1.c"), None);
        assert_eq!(lookup(&v, "a.x"), None);
        assert_eq!(lookup(&v, "a.b.c"), None);
    }

    #[test]
    fn null_is_undefined() {
        let v = json!({"a": null, "b": "x"});
        let r = first_defined(&v, &["a", "b"], as_string).unwrap();
        assert_eq!(r.value, "x");
        assert_eq!(r.path, "b");
    }

    #[test]
    fn falsy_values_are_defined() {
        let v = json!({"a": false, "b": true});
        let r = first_defined(&v, &["a", "b"], Value::as_bool).unwrap();
        assert!(!r.value);
        assert_eq!(r.path, "a");

        let v = json!({"a": "", "b": "x"});
        assert_eq!(first_string(&v, &["a", "b"]).as_deref(), Some(""));
    }

    #[test]
    fn wrong_type_is_skipped() {
        let v = json!({"analysis": {"parties": {"list": ["A"]}}});
        let r = first_defined(&v, PARTIES_CHAIN, as_array).unwrap();
        assert_eq!(r.path, "analysis.parties.list");
        assert_eq!(r.value.len(), 1);
    }

    #[test]
    fn empty_chain_result_is_none() {
        let v = json!({});
        assert!(first_defined(&v, OBJECT_CHAIN, as_string).is_none());
    }
}
