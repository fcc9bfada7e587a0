//! Static message tables for the two supported languages.
//!
//! Every human-readable string the library produces (status steps, error
//! messages, report labels) comes from one [`Messages`] table, selected by
//! [`crate::config::Language`]. Templates use `{name}` placeholders that are
//! filled with [`fill`].
//!
//! The normalization defaults (`Non spécifié`, `Partie`) are *not* here: they
//! are data values of [`crate::normalize::NormalizedSummary`] and stay the
//! same whatever the display language.

use crate::config::Language;

/// One language's worth of user-facing strings.
#[derive(Debug)]
pub struct Messages {
    // ── Upload lifecycle ─────────────────────────────────────────────────
    pub uploading: &'static str,
    pub analyzing: &'static str,
    pub analysis_steps: [&'static str; 5],
    pub analysis_done: &'static str,

    // ── Errors ───────────────────────────────────────────────────────────
    pub invalid_file_type: &'static str,
    /// Placeholder: `{secs}`.
    pub timeout: &'static str,
    pub network: &'static str,
    /// Placeholders: `{status}`, `{reason}`.
    pub server: &'static str,
    pub parse: &'static str,
    pub busy: &'static str,
    pub cancelled: &'static str,
    pub sample_unavailable: &'static str,
    pub sample_failed: &'static str,
    pub report_failed: &'static str,
    /// Placeholder: `{detail}`.
    pub generic: &'static str,

    // ── Report labels ────────────────────────────────────────────────────
    pub report_heading: &'static str,
    pub object: &'static str,
    pub classification: &'static str,
    pub family: &'static str,
    pub kind: &'static str,
    pub confidence: &'static str,
    pub parties: &'static str,
    pub no_parties: &'static str,
    pub applicable_law: &'static str,
    pub jurisdiction: &'static str,
    pub privacy: &'static str,
    pub status: &'static str,
    pub compliant: &'static str,
    pub non_compliant: &'static str,
    pub risks: &'static str,
    pub financial: &'static str,
    pub amount: &'static str,
    pub model: &'static str,
    pub summary: &'static str,
    pub summary_missing: &'static str,
    pub summary_truncated: &'static str,
    pub continued: &'static str,
    pub footer: &'static str,
    pub page: &'static str,
}

pub static FR: Messages = Messages {
    uploading: "Téléversement du contrat...",
    analyzing: "Analyse IA en cours...",
    analysis_steps: [
        "Extraction du texte...",
        "Classification du contrat...",
        "Analyse des clauses...",
        "Détection des risques...",
        "Génération du résumé...",
    ],
    analysis_done: "Analyse terminée !",

    invalid_file_type: "Veuillez sélectionner un fichier PDF valide",
    timeout: "Timeout: L'analyse prend trop de temps (>{secs}s)",
    network: "Erreur réseau: Impossible de contacter le serveur",
    server: "Erreur {status}: {reason}",
    parse: "Erreur: réponse du serveur illisible",
    busy: "Une analyse est déjà en cours",
    cancelled: "Analyse annulée",
    sample_unavailable: "Contrat exemple non disponible. Veuillez utiliser votre propre fichier.",
    sample_failed: "Erreur lors du chargement du contrat exemple",
    report_failed: "Impossible de générer le rapport PDF.",
    generic: "Erreur: {detail}",

    report_heading: "ANALYSE CONTRACTUELLE",
    object: "Objet du contrat",
    classification: "CLASSIFICATION",
    family: "Famille:",
    kind: "Type:",
    confidence: "Confiance:",
    parties: "PARTIES CONTRACTUELLES",
    no_parties: "Aucune partie identifiée",
    applicable_law: "Droit applicable",
    jurisdiction: "Juridiction",
    privacy: "CONFORMITÉ RGPD",
    status: "Statut:",
    compliant: "Conforme",
    non_compliant: "Non conforme",
    risks: "FACTEURS DE RISQUE",
    financial: "ASPECTS FINANCIERS",
    amount: "Montant:",
    model: "Modèle:",
    summary: "RÉSUMÉ EXÉCUTIF",
    summary_missing: "Résumé non disponible",
    summary_truncated: "[...] Résumé complet disponible dans le PDF téléchargeable",
    continued: "(suite)",
    footer: "Confidentiel • Usage interne uniquement",
    page: "Page",
};

pub static EN: Messages = Messages {
    uploading: "Uploading contract...",
    analyzing: "AI analysis in progress...",
    analysis_steps: [
        "Extracting text...",
        "Classifying contract...",
        "Analysing clauses...",
        "Detecting risks...",
        "Generating summary...",
    ],
    analysis_done: "Analysis complete!",

    invalid_file_type: "Please select a valid PDF file",
    timeout: "Timeout: the analysis is taking too long (>{secs}s)",
    network: "Network error: unable to reach the server",
    server: "Error {status}: {reason}",
    parse: "Error: unreadable server response",
    busy: "An analysis is already in progress",
    cancelled: "Analysis cancelled",
    sample_unavailable: "Sample contract unavailable. Please use your own file.",
    sample_failed: "Error while loading the sample contract",
    report_failed: "Unable to generate the PDF report.",
    generic: "Error: {detail}",

    report_heading: "CONTRACT ANALYSIS",
    object: "Contract object",
    classification: "CLASSIFICATION",
    family: "Family:",
    kind: "Type:",
    confidence: "Confidence:",
    parties: "CONTRACTING PARTIES",
    no_parties: "No party identified",
    applicable_law: "Applicable law",
    jurisdiction: "Jurisdiction",
    privacy: "GDPR COMPLIANCE",
    status: "Status:",
    compliant: "Compliant",
    non_compliant: "Non-compliant",
    risks: "RISK FACTORS",
    financial: "FINANCIAL TERMS",
    amount: "Amount:",
    model: "Model:",
    summary: "EXECUTIVE SUMMARY",
    summary_missing: "Summary not available",
    summary_truncated: "[...] Full summary available in the downloadable PDF",
    continued: "(continued)",
    footer: "Confidential • Internal use only",
    page: "Page",
};

impl Language {
    /// The message table for this language.
    pub fn messages(self) -> &'static Messages {
        match self {
            Language::Fr => &FR,
            Language::En => &EN,
        }
    }
}

/// Substitute `{key}` placeholders in a template.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_every_placeholder() {
        let msg = fill(
            FR.server,
            &[("status", 502.to_string()), ("reason", "Bad Gateway".into())],
        );
        assert_eq!(msg, "Erreur 502: Bad Gateway");
    }

    #[test]
    fn fill_leaves_unknown_placeholders() {
        assert_eq!(fill("a {x} b", &[("y", "1".into())]), "a {x} b");
    }

    #[test]
    fn both_tables_have_five_steps() {
        for lang in [Language::Fr, Language::En] {
            let m = lang.messages();
            assert!(m.analysis_steps.iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn french_timeout_matches_observed_wording() {
        let msg = fill(FR.timeout, &[("secs", 30.to_string())]);
        assert_eq!(msg, "Timeout: L'analyse prend trop de temps (>30s)");
    }
}
