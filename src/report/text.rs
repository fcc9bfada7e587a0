//! On-screen rendering of a [`NormalizedSummary`].
//!
//! Same informational content and section order as the document, with a
//! terminal-friendly layout: no pagination, no truncation of the summary.

use super::layout::BULLET;
use super::wrap::{collapse_whitespace, wrap};
use crate::config::Language;
use crate::normalize::NormalizedSummary;

const WIDTH: usize = 78;

/// Render `summary` as plain text.
pub fn render_text(summary: &NormalizedSummary, language: Language) -> String {
    let m = language.messages();
    let mut lines: Vec<String> = vec![
        summary.object.to_uppercase(),
        "=".repeat(summary.object.chars().count().clamp(3, WIDTH)),
    ];

    heading(&mut lines, m.classification);
    let c = &summary.classification;
    lines.push(format!("  {} {}", m.family, c.family));
    lines.push(format!("  {} {}", m.kind, c.kind));
    if let Some(confidence) = c.confidence {
        lines.push(format!("  {} {:.0}%", m.confidence, confidence * 100.0));
    }
    lines.push(format!("  {}: {}", m.applicable_law, summary.applicable_law));
    if let Some(jurisdiction) = &summary.jurisdiction {
        lines.push(format!("  {}: {}", m.jurisdiction, jurisdiction));
    }

    heading(&mut lines, m.parties);
    if summary.parties.is_empty() {
        lines.push(format!("  {}", m.no_parties));
    }
    lines.extend(
        summary
            .parties
            .iter()
            .map(|party| format!("  {}: {}", party.role, party.name)),
    );

    heading(&mut lines, m.privacy);
    let status = if summary.rgpd_compliant {
        m.compliant
    } else {
        m.non_compliant
    };
    lines.push(format!("  {} {}", m.status, status));

    if !summary.risks.is_empty() {
        heading(&mut lines, m.risks);
        for risk in &summary.risks {
            for (i, line) in wrap(risk, WIDTH - 4).into_iter().enumerate() {
                let prefix = if i == 0 { BULLET } else { "  " };
                lines.push(format!("  {prefix}{line}"));
            }
        }
    }

    heading(&mut lines, m.financial);
    lines.push(format!("  {} {}", m.amount, summary.financial.display_amount()));
    lines.push(format!("  {} {}", m.model, summary.financial.model));

    heading(&mut lines, m.summary);
    let text = summary
        .executive_summary
        .as_deref()
        .map(collapse_whitespace)
        .unwrap_or_default();
    if text.is_empty() {
        lines.push(format!("  {}", m.summary_missing));
    }
    lines.extend(wrap(&text, WIDTH - 2).into_iter().map(|line| format!("  {line}")));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// A blank separator line, then the section title.
fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::result::AnalysisResult;
    use serde_json::json;

    #[test]
    fn lists_risks_as_bullets() {
        let r = AnalysisResult::from_value(json!({"risks_red_flags": ["a", "b"]})).unwrap();
        let text = render_text(&normalize(&r), Language::Fr);
        let bullets: Vec<_> = text
            .lines()
            .filter(|l| l.trim_start().starts_with(BULLET))
            .collect();
        assert_eq!(bullets, vec!["  • a", "  • b"]);
    }

    #[test]
    fn minimal_payload_renders_defaults() {
        let r = AnalysisResult::from_value(json!({"classification": {"family": "bail"}})).unwrap();
        let text = render_text(&normalize(&r), Language::Fr);
        assert!(text.starts_with("NON SPÉCIFIÉ"));
        assert!(text.contains("Aucune partie identifiée"));
        assert!(text.contains("Statut: Non conforme"));
        assert!(!text.contains("FACTEURS DE RISQUE"));
        assert!(text.contains("Famille: bail"));
    }
}
