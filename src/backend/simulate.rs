//! In-process stand-in for the analysis service.
//!
//! Answers like the site's Board-Ready simulation route: after a fixed
//! latency it returns `{success, analysis, message}` where `analysis` is a
//! Board-Ready V2.3 payload chosen from the filename. Used by the CLI's
//! `--offline` mode and by tests.

use super::AnalysisBackend;
use crate::error::ContractReaderError;
use crate::upload::UploadFile;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// The demonstration contract served by [`SimulatedBackend::fetch_sample`].
pub static SAMPLE_CONTRACT: &[u8] = include_bytes!("../../assets/contrat_exemple_generique.txt");

const DEFAULT_LATENCY: Duration = Duration::from_secs(3);
const GENERATOR: &str = "YQO-AI-Board-V2.3";

/// Contract family guessed from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFamily {
    SaasIt,
    CommercialLease,
    Employment,
    Generic,
}

impl ContractFamily {
    /// Case-insensitive substring match, first family wins.
    pub fn from_filename(name: &str) -> Self {
        let name = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
        if has(&["saas", "it"]) {
            Self::SaasIt
        } else if has(&["bail", "commercial"]) {
            Self::CommercialLease
        } else if has(&["emploi", "cdi"]) {
            Self::Employment
        } else {
            Self::Generic
        }
    }
}

pub struct SimulatedBackend {
    latency: Duration,
    sample: Option<Vec<u8>>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            sample: Some(SAMPLE_CONTRACT.to_vec()),
        }
    }
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serve no sample, as a site without the demonstration file would.
    pub fn without_sample(mut self) -> Self {
        self.sample = None;
        self
    }
}

#[async_trait]
impl AnalysisBackend for SimulatedBackend {
    async fn analyze(&self, file: &UploadFile) -> Result<Value, ContractReaderError> {
        if file.bytes.is_empty() {
            return Err(ContractReaderError::Server {
                url: "simulated://analyze".into(),
                status: 400,
                reason: "Bad Request".into(),
            });
        }
        let family = ContractFamily::from_filename(&file.name);
        debug!("Simulating {:?} analysis for '{}'", family, file.name);
        tokio::time::sleep(self.latency).await;
        info!("Simulated analysis ready for '{}'", file.name);
        Ok(json!({
            "success": true,
            "analysis": board_ready(family, &file.name),
            "message": "Analyse Board-Ready V2.3 simulée avec succès",
        }))
    }

    async fn fetch_sample(&self) -> Result<Vec<u8>, ContractReaderError> {
        self.sample
            .clone()
            .ok_or(ContractReaderError::SampleUnavailable { status: 404 })
    }

    async fn download_report(&self, url: &str) -> Result<Vec<u8>, ContractReaderError> {
        Err(ContractReaderError::ReportNotFound {
            url: url.to_string(),
        })
    }
}

/// A Board-Ready V2.3 payload for `family`.
pub fn board_ready(family: ContractFamily, filename: &str) -> Value {
    let mut payload = match family {
        ContractFamily::SaasIt => saas_it(),
        ContractFamily::CommercialLease => commercial_lease(),
        ContractFamily::Employment => employment(),
        ContractFamily::Generic => generic(),
    };
    payload["meta"] = json!({
        "generator": GENERATOR,
        "version": crate::result::V3_VERSION,
        "language": "fr",
        "generated_at": Utc::now().to_rfc3339(),
        "source_doc_info": {"filename": filename},
    });
    payload
}

fn saas_it() -> Value {
    json!({
        "classification": {
            "family": "prestation_it_saas",
            "subfamily": "saas_b2b",
            "parties_type": "B2B",
            "confidence": 0.92
        },
        "parties": {"list": [
            {"role": "Prestataire", "name": "CloudTech Solutions SAS", "legal_form": "SAS"},
            {"role": "Client", "name": "InnovCorp SARL", "legal_form": "SARL"}
        ]},
        "contract": {
            "object": "Prestation de développement et hébergement solution SaaS CRM",
            "dates": {"start_date": "2024-02-01", "end_date": "2025-01-31", "notice_period_days": 90},
            "data_privacy": {"rgpd": true, "dpa": {"present": true, "processing_roles": "Sous-traitant"}},
            "service_levels": {"sla": "99.9% disponibilité garantie"}
        },
        "financials": {
            "price_model": "Abonnement mensuel avec setup",
            "items": [
                {"label": "Setup initial", "amount": 5000.0, "period": "unique"},
                {"label": "Licence SaaS mensuelle", "amount": 2500.0, "period": "mensuel"},
                {"label": "Support premium", "amount": 500.0, "period": "mensuel"}
            ],
            "currency": "EUR",
            "payment_terms": "Paiement à 30 jours fin de mois"
        },
        "governance": {
            "liability": "Responsabilité limitée au montant des prestations",
            "law": "Droit français",
            "jurisdiction": "Tribunaux de Paris",
            "confidentiality": true
        },
        "summary_plain": "Contrat SaaS entre CloudTech et InnovCorp pour développement CRM cloud. \
            Durée 12 mois, 3000€/mois après setup 5000€. DPA RGPD conforme, SLA 99.9%, hébergement France.",
        "risks_red_flags": [],
        "missing_info": ["clause_reversibilite_detaillee"],
        "section_confidence": {"parties": 0.98, "contract": 0.94, "financials": 0.96, "governance": 0.88},
        "operational_actions": {"jira_summary": "OK sous réserve"}
    })
}

fn commercial_lease() -> Value {
    json!({
        "classification": {
            "family": "bail",
            "subfamily": "commercial",
            "parties_type": "B2B",
            "confidence": 0.96
        },
        "parties": {"list": [
            {"role": "Bailleur", "name": "SCI Immobilier Plus", "legal_form": "SCI"},
            {"role": "Preneur", "name": "Boutique Mode SARL", "legal_form": "SARL"}
        ]},
        "contract": {
            "object": "Bail commercial - Local commercial rue de Rivoli",
            "location_or_site": "45 rue de Rivoli, 75001 Paris - RDC 120m²",
            "dates": {"start_date": "2024-02-01", "end_date": "2033-01-31"},
            "lease_commercial": {"index_enum": "ILC"}
        },
        "financials": {
            "price_model": "Loyer fixe avec révision annuelle",
            "items": [
                {"label": "Loyer mensuel", "amount": 4500.0, "period": "mensuel"},
                {"label": "Charges mensuelles", "amount": 300.0, "period": "mensuel"},
                {"label": "Dépôt de garantie", "amount": 13500.0, "period": "unique"}
            ],
            "currency": "EUR"
        },
        "governance": {
            "law": "Code de commerce français",
            "jurisdiction": "Tribunal de commerce de Paris"
        },
        "summary_plain": "Bail commercial 3-6-9 pour boutique mode rue de Rivoli. \
            Loyer 4500€/mois + charges 300€. Révision ILC, durée 9 ans avec résiliation triennale.",
        "risks_red_flags": [],
        "missing_info": [],
        "section_confidence": {"parties": 0.99, "contract": 0.95, "financials": 0.93, "governance": 0.87},
        "operational_actions": {"jira_summary": "Conforme"}
    })
}

fn employment() -> Value {
    json!({
        "classification": {
            "family": "emploi",
            "subfamily": "cdi",
            "parties_type": "B2C",
            "confidence": 0.73
        },
        "parties": {"list": [
            {"role": "Employeur", "name": "TechStart SARL", "legal_form": "SARL"},
            {"role": "Salarié", "name": "Jean Dupont"}
        ]},
        "contract": {
            "object": "Contrat de travail - Développeur Full Stack",
            "dates": {"start_date": "2024-03-01"},
            "consumer_rights": {}
        },
        "financials": {"items": []},
        "summary_plain": "CDI développeur chez TechStart. Informations importantes manquantes: \
            rémunération, période d'essai, droit de rétractation B2C.",
        "risks_red_flags": [
            "b2c_cooling_off_missing",
            "employment_missing_probation",
            "employment_missing_remuneration"
        ],
        "missing_info": ["remuneration_details", "probation_period", "cooling_off_rights"],
        "section_confidence": {"parties": 0.92, "contract": 0.65, "financials": 0.15, "governance": 0.45},
        "operational_actions": {"jira_summary": "Escalade revue experte"}
    })
}

fn generic() -> Value {
    json!({
        "classification": {
            "family": "prestation_services",
            "parties_type": "B2B",
            "confidence": 0.81
        },
        "parties": {"list": [
            {"role": "Prestataire", "name": "Services Pro SARL"},
            {"role": "Client", "name": "Entreprise Cliente SA"}
        ]},
        "contract": {"object": "Prestation de services professionnels"},
        "financials": {
            "price_model": "Forfait",
            "items": [{"label": "Prestation", "amount": 15000.0}],
            "currency": "EUR"
        },
        "summary_plain": "Contrat de prestation générique entre Services Pro et Entreprise Cliente.",
        "risks_red_flags": [],
        "missing_info": ["scope_details", "timeline"],
        "section_confidence": {"parties": 0.85, "contract": 0.78, "financials": 0.82}
    })
}
