//! Scoring engine
//!
//! Maps a `PageFeatures` value to pillar scores, applies coverage caps and
//! the missing-pillar gate, and assembles the explained `ScoreResult`.
//! Deterministic and total: every input within the type yields a result
//! with all scores in 0..=100.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::explain;
use crate::features::PageFeatures;

/// Score pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Bofu,
    Convincing,
    Technical,
    Structure,
}

impl Pillar {
    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            Pillar::Bofu => "BoFu",
            Pillar::Convincing => "Convincing",
            Pillar::Technical => "Technical",
            Pillar::Structure => "Structure",
        }
    }

    /// What to work on when this pillar trails
    pub fn focus(&self) -> &'static str {
        match self {
            Pillar::Bofu => "the conversion path (CTA, form, contact, pricing)",
            Pillar::Convincing => "proof and persuasion (trust, benefits, objections)",
            Pillar::Technical => "technical hygiene (HTTPS, title, meta, headings)",
            Pillar::Structure => "message match between URL, title and headline",
        }
    }
}

/// Pillar and overall scores, all within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub overall: f64,
    pub bofu: f64,
    pub convincing: f64,
    pub technical: f64,
    /// Absent in votes recorded before the structure pillar existed
    #[serde(default)]
    pub structure: f64,
}

impl Scores {
    pub fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Bofu => self.bofu,
            Pillar::Convincing => self.convincing,
            Pillar::Technical => self.technical,
            Pillar::Structure => self.structure,
        }
    }
}

/// The analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scores: Scores,
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
    /// Scoring policy version that produced this result
    pub version: String,
}

/// Qualitative bucket for a 0-100 score
pub fn bucket(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Fair"
    } else if score >= 20.0 {
        "Poor"
    } else {
        "Very poor"
    }
}

/// Score extracted features and explain the result
pub fn score(features: &PageFeatures, config: &ScoringConfig) -> ScoreResult {
    let scores = compute_scores(features, config);
    let (positives, improvements) = explain::explain(features, config);
    let summary = explain::summary(&scores, config);

    ScoreResult {
        scores,
        positives,
        improvements,
        summary,
        version: config.version.clone(),
    }
}

/// Numeric part of the engine: pillars, caps, blend and gate
pub fn compute_scores(features: &PageFeatures, config: &ScoringConfig) -> Scores {
    let bofu = cap_bofu(bofu_raw(features, config), features, config);
    let convincing = cap_convincing(convincing_raw(features, config), features, config);
    let technical = technical(features, config);
    let structure = structure(features, config);

    let w = &config.overall;
    let blended = (w.bofu * bofu
        + w.convincing * convincing
        + w.technical * technical
        + w.structure * structure)
        / w.sum();
    let mut overall = clamp(blended);

    let missing = 4 - features.core_pillars_satisfied();
    if let Some(ceiling) = config.gate.ceiling(missing) {
        if overall > ceiling {
            log::debug!("gate: {} core pillars missing, overall {:.1} -> {}", missing, overall, ceiling);
        }
        overall = overall.min(ceiling);
    }

    Scores {
        overall: round1(overall),
        bofu: round1(bofu),
        convincing: round1(convincing),
        technical: round1(technical),
        structure: round1(structure),
    }
}

/// Weighted share of satisfied signals, 0-100
///
/// Each part is `(weight, fulfilment in 0..=1)`; normalised by the sum of
/// absolute weights. An all-zero weight vector scores 0.
fn weighted(parts: &[(f64, f64)]) -> f64 {
    let total: f64 = parts.iter().map(|(w, _)| w.abs()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let earned: f64 = parts.iter().map(|(w, v)| w * v.clamp(0.0, 1.0) * 100.0).sum();
    clamp(earned / total)
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn bofu_raw(f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let w = &config.bofu_weights;
    weighted(&[
        (w.primary_cta, flag(f.primary_cta_present)),
        (w.multiple_ctas, flag(f.cta_count >= 2)),
        (w.lead_path, flag(f.lead_path_present())),
        (w.explicit_form, flag(f.lead_form_present)),
        (w.explicit_contact, flag(f.direct_contact_present)),
        (w.pricing, flag(f.pricing_mentioned)),
    ])
}

fn convincing_raw(f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let w = &config.convincing_weights;
    let saturation = w.numeric_claims_saturation.max(1) as f64;
    let numbers = (f.numeric_claim_count as f64 / saturation).min(1.0);
    weighted(&[
        (w.benefits, flag(f.benefit_language_present)),
        (w.trust, flag(f.trust_signal_present)),
        (w.objections, flag(f.objection_handling_present)),
        (w.visuals, flag(f.visuals_present)),
        (w.numeric_claims, numbers),
    ])
}

/// Apply a ceiling when `missing` is true; never raises the score
fn apply_cap(score: f64, missing: bool, ceiling: f64, name: &str) -> f64 {
    if missing && score > ceiling {
        log::debug!("cap {}: {:.1} -> {}", name, score, ceiling);
        ceiling
    } else {
        score
    }
}

fn cap_bofu(score: f64, f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let caps = &config.caps;
    let score = apply_cap(score, !f.primary_cta_present, caps.no_primary_cta, "no_primary_cta");
    let score = apply_cap(score, !f.lead_path_present(), caps.no_lead_path, "no_lead_path");
    apply_cap(score, !f.pricing_mentioned, caps.no_pricing, "no_pricing")
}

fn cap_convincing(score: f64, f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let caps = &config.caps;
    let score = apply_cap(score, !f.trust_signal_present, caps.no_trust, "no_trust");
    let score = apply_cap(score, !f.benefit_language_present, caps.no_benefits, "no_benefits");
    apply_cap(
        score,
        !f.objection_handling_present,
        caps.no_objections,
        "no_objections",
    )
}

/// Baseline plus independent hygiene bonuses, minus the alt-text penalty
fn technical(f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let t = &config.technical;
    let mut score = t.baseline;
    if f.https_ok {
        score += t.https;
    }
    if f.title.well_formed(&config.title_band) {
        score += t.title;
    }
    if f.meta_description.well_formed(&config.meta_band) {
        score += t.meta;
    }
    if f.h1.present {
        score += t.h1;
    }
    if f.viewport_present {
        score += t.viewport;
    }
    if f.canonical_present {
        score += t.canonical;
    }
    if f.image_count > 0 && f.image_alt_ratio < t.alt_ratio_min {
        score -= t.alt_penalty;
    }
    clamp(score)
}

fn structure(f: &PageFeatures, config: &ScoringConfig) -> f64 {
    let w = &config.structure_weights;
    weighted(&[
        (w.h1, flag(f.h1.present)),
        (w.title, flag(f.title.present)),
        (w.message_match, f.message_match_score / 100.0),
    ])
}
