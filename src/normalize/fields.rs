//! Per-field value coercions: parties, risks, RGPD status, money and
//! classification.
//!
//! These run *after* a chain picked a raw value, or, for the financial and
//! classification fields, pick among alternative shapes themselves. None of
//! them fail: unusable input degrades to the documented defaults.

use super::chain::{first_defined, first_string, lookup};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Placeholder for any textual field that could not be resolved.
pub const NOT_SPECIFIED: &str = "Non spécifié";
/// Role given to parties that do not state one.
pub const DEFAULT_ROLE: &str = "Partie";
/// Currency assumed when a shape omits it.
pub const DEFAULT_CURRENCY: &str = "EUR";

// ── Parties ──────────────────────────────────────────────────────────────────

/// One contracting party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    pub role: String,
    pub name: String,
}

impl Party {
    /// Accepts `{role|type, name|entity}` objects and bare name strings.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self {
                role: DEFAULT_ROLE.to_string(),
                name: name.clone(),
            },
            Value::Object(_) => Self {
                role: first_string(value, &["role", "type"])
                    .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
                name: first_string(value, &["name", "entity"])
                    .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            },
            other => {
                warn!("Unrecognised party entry: {other}");
                Self {
                    role: DEFAULT_ROLE.to_string(),
                    name: NOT_SPECIFIED.to_string(),
                }
            }
        }
    }
}

// ── Risks ────────────────────────────────────────────────────────────────────

/// Text of one risk entry. Objects contribute their first descriptive
/// string; anything else is dropped.
pub fn risk_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(_) => {
            let text = first_string(value, &["description", "title", "label", "text"]);
            if text.is_none() {
                warn!("Risk entry without text: {value}");
            }
            text
        }
        _ => None,
    }
}

// ── RGPD ─────────────────────────────────────────────────────────────────────

/// Interpret an RGPD compliance value.
///
/// Booleans pass through; numbers are compliant when non-zero; strings are
/// compliant unless empty or an explicit negative. Arrays and objects are not
/// a status and return `None` so the chain moves on.
pub fn rgpd_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            Some(!matches!(
                s.as_str(),
                "" | "non conforme" | "non" | "no" | "false" | "0"
            ))
        }
        _ => None,
    }
}

// ── Money ────────────────────────────────────────────────────────────────────

/// Which financial shape produced a [`FinancialSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinancialShape {
    /// `financials.amounts[0]` (insurance-style backend output).
    AmountList,
    /// `financial.{amount, currency, model}` (Board-Ready).
    Financial,
    /// `amount.{value, currency}` (legacy).
    LegacyAmount,
    /// `financials.items[]` billed over a single period (Board-Ready itemised).
    ItemList,
}

/// Amount, currency and pricing model of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub amount: String,
    pub currency: String,
    pub model: String,
}

impl Default for FinancialSummary {
    fn default() -> Self {
        Self {
            amount: NOT_SPECIFIED.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            model: NOT_SPECIFIED.to_string(),
        }
    }
}

impl FinancialSummary {
    /// Amount and currency for display, e.g. `5000 EUR`.
    pub fn display_amount(&self) -> String {
        if self.amount == NOT_SPECIFIED {
            self.amount.clone()
        } else {
            format!("{} {}", self.amount, self.currency)
        }
    }
}

/// Pick the first financial shape present under `root`.
pub fn financial_summary(root: &Value) -> Option<(FinancialSummary, FinancialShape)> {
    if let Some(first) = lookup(root, "financials.amounts.0") {
        return Some((
            FinancialSummary {
                amount: money(lookup(first, "amount")),
                currency: currency(first_string(first, &["currency"])),
                model: first_string(root, &["financials.pricing_model"])
                    .unwrap_or_else(|| "Annuel".to_string()),
            },
            FinancialShape::AmountList,
        ));
    }
    if let Some(financial) = lookup(root, "financial").filter(|v| v.is_object()) {
        let amount = first_defined(financial, &["amount", "value"], scalar).map(|r| r.value);
        return Some((
            FinancialSummary {
                amount: amount.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                currency: currency(first_string(financial, &["currency"])),
                model: first_string(financial, &["model", "type"])
                    .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            },
            FinancialShape::Financial,
        ));
    }
    if let Some(amount) = lookup(root, "amount").filter(|v| v.is_object()) {
        return Some((
            FinancialSummary {
                amount: money(lookup(amount, "value")),
                currency: currency(first_string(amount, &["currency"])),
                model: "Commercial".to_string(),
            },
            FinancialShape::LegacyAmount,
        ));
    }
    if let Some(items) = lookup(root, "financials.items").and_then(Value::as_array) {
        let priced: Vec<(f64, Option<&str>)> = items
            .iter()
            .filter_map(|item| {
                let amount = lookup(item, "amount").and_then(Value::as_f64)?;
                Some((amount, lookup(item, "period").and_then(Value::as_str)))
            })
            .collect();
        // Only items billed over one common period add up to a contract figure.
        let one_period = priced.windows(2).all(|w| w[0].1 == w[1].1);
        if !priced.is_empty() && one_period {
            return Some((
                FinancialSummary {
                    amount: format_number(priced.iter().map(|(amount, _)| amount).sum()),
                    currency: currency(first_string(root, &["financials.currency"])),
                    model: first_string(root, &["financials.price_model"])
                        .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                },
                FinancialShape::ItemList,
            ));
        }
    }
    None
}

fn currency(value: Option<String>) -> String {
    value.unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn money(value: Option<&Value>) -> String {
    value
        .and_then(scalar)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Strings as-is, numbers without a trailing `.0`.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        _ => None,
    }
}

/// Render a number the way a JavaScript template literal would.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ── Classification ───────────────────────────────────────────────────────────

/// Contract family, type and classifier confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub family: String,
    pub kind: String,
    /// 0.0–1.0 when the backend reported one.
    pub confidence: Option<f64>,
}

/// Classify from the report root.
pub fn classification(root: &Value) -> Classification {
    let confidence = first_defined(root, &["classification.confidence", "confidence"], Value::as_f64)
        .map(|r| r.value.clamp(0.0, 1.0));

    let details_object = first_string(root, &["details.object"]).unwrap_or_default();
    let (family, kind) = if details_object.to_lowercase().contains("assurance") {
        ("Assurance".to_string(), "Habitation".to_string())
    } else if let Some(family) = first_string(root, &["classification.family"]) {
        let kind = first_string(root, &["classification.parties_type"])
            .unwrap_or_else(|| "B2B".to_string());
        (family, kind)
    } else if let Some(family) = first_string(root, &["family"]) {
        let kind = first_string(root, &["type"]).unwrap_or_else(|| "Commercial".to_string());
        (family, kind)
    } else {
        (NOT_SPECIFIED.to_string(), NOT_SPECIFIED.to_string())
    };

    Classification {
        family,
        kind,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn party_from_object_uses_fallback_keys() {
        let p = Party::from_value(&json!({"type": "Bailleur", "entity": "SCI Dupont"}));
        assert_eq!(p.role, "Bailleur");
        assert_eq!(p.name, "SCI Dupont");
    }

    #[test]
    fn party_from_string_gets_default_role() {
        let p = Party::from_value(&json!("Acme SAS"));
        assert_eq!(p, Party { role: "Partie".into(), name: "Acme SAS".into() });
    }

    #[test]
    fn party_from_garbage_gets_defaults() {
        let p = Party::from_value(&json!(42));
        assert_eq!(p.role, DEFAULT_ROLE);
        assert_eq!(p.name, NOT_SPECIFIED);
        let p = Party::from_value(&json!({"role": null}));
        assert_eq!(p.role, DEFAULT_ROLE);
    }

    #[test]
    fn risk_text_variants() {
        assert_eq!(risk_text(&json!("a")).as_deref(), Some("a"));
        assert_eq!(risk_text(&json!({"description": "b"})).as_deref(), Some("b"));
        assert_eq!(risk_text(&json!({"severity": 3})), None);
        assert_eq!(risk_text(&json!(1)), None);
    }

    #[test]
    fn rgpd_coercion() {
        assert_eq!(rgpd_flag(&json!(false)), Some(false));
        assert_eq!(rgpd_flag(&json!(true)), Some(true));
        assert_eq!(rgpd_flag(&json!(0)), Some(false));
        assert_eq!(rgpd_flag(&json!("Conforme")), Some(true));
        assert_eq!(rgpd_flag(&json!("Non conforme")), Some(false));
        assert_eq!(rgpd_flag(&json!("")), Some(false));
        assert_eq!(rgpd_flag(&json!({"dpa": true})), None);
    }

    #[test]
    fn amount_list_wins_over_other_shapes() {
        let root = json!({
            "financials": {"amounts": [{"amount": 480.0, "currency": "EUR"}]},
            "financial": {"amount": "1"}
        });
        let (f, shape) = financial_summary(&root).unwrap();
        assert_eq!(shape, FinancialShape::AmountList);
        assert_eq!(f.amount, "480");
        assert_eq!(f.model, "Annuel");
        assert_eq!(f.display_amount(), "480 EUR");
    }

    #[test]
    fn board_ready_financial_shape() {
        let root = json!({"financial": {"value": 1200.5, "type": "Forfait"}});
        let (f, shape) = financial_summary(&root).unwrap();
        assert_eq!(shape, FinancialShape::Financial);
        assert_eq!(f.amount, "1200.5");
        assert_eq!(f.currency, "EUR");
        assert_eq!(f.model, "Forfait");
    }

    #[test]
    fn legacy_amount_shape() {
        let root = json!({"amount": {"value": "3 000", "currency": "CHF"}});
        let (f, shape) = financial_summary(&root).unwrap();
        assert_eq!(shape, FinancialShape::LegacyAmount);
        assert_eq!(f.display_amount(), "3 000 CHF");
        assert_eq!(f.model, "Commercial");
    }

    #[test]
    fn item_list_with_one_period_is_summed() {
        let root = json!({"financials": {
            "items": [
                {"amount": 5000.0, "period": "mensuel"},
                {"amount": 2500.0, "period": "mensuel"},
                {"label": "free"}
            ],
            "currency": "EUR",
            "price_model": "Abonnement mensuel"
        }});
        let (f, shape) = financial_summary(&root).unwrap();
        assert_eq!(shape, FinancialShape::ItemList);
        assert_eq!(f.amount, "7500");
        assert_eq!(f.model, "Abonnement mensuel");

        let no_period = json!({"financials": {"items": [{"amount": 10.0}, {"amount": 5.5}]}});
        assert_eq!(financial_summary(&no_period).unwrap().0.amount, "15.5");
    }

    #[test]
    fn item_list_with_mixed_periods_is_not_summed() {
        let root = json!({"financials": {
            "items": [
                {"label": "Loyer mensuel", "amount": 4500.0, "period": "mensuel"},
                {"label": "Charges mensuelles", "amount": 300.0, "period": "mensuel"},
                {"label": "Dépôt de garantie", "amount": 13500.0, "period": "unique"}
            ],
            "price_model": "Loyer fixe"
        }});
        assert!(financial_summary(&root).is_none());
    }

    #[test]
    fn no_financial_shape() {
        assert!(financial_summary(&json!({"financials": {"items": []}})).is_none());
        let d = FinancialSummary::default();
        assert_eq!(d.display_amount(), NOT_SPECIFIED);
    }

    #[test]
    fn classification_precedence() {
        let c = classification(&json!({"details": {"object": "Contrat d'assurance habitation"}}));
        assert_eq!((c.family.as_str(), c.kind.as_str()), ("Assurance", "Habitation"));

        let c = classification(&json!({"classification": {"family": "bail", "confidence": 0.9}}));
        assert_eq!((c.family.as_str(), c.kind.as_str()), ("bail", "B2B"));
        assert_eq!(c.confidence, Some(0.9));

        let c = classification(&json!({"family": "vente"}));
        assert_eq!(c.kind, "Commercial");

        let c = classification(&json!({}));
        assert_eq!(c.family, NOT_SPECIFIED);
        assert_eq!(c.confidence, None);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(5000.0), "5000");
        assert_eq!(format_number(0.5), "0.5");
    }
}
