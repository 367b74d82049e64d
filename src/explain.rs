//! Explanation text for a scored page
//!
//! One line per signal, in a fixed order, into either `positives` or
//! `improvements`. Pure lookup; no randomness.

use crate::config::ScoringConfig;
use crate::features::PageFeatures;
use crate::score::{bucket, Pillar, Scores};

/// Signals explained to the user, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Title,
    PrimaryCta,
    MultipleCtas,
    LeadForm,
    DirectContact,
    Pricing,
    Trust,
    Benefits,
    Objections,
    Visuals,
    Https,
    MetaDescription,
    H1,
    Canonical,
    Viewport,
    ImageAlt,
    NumericClaims,
    MessageMatch,
}

impl Signal {
    pub const ALL: [Signal; 18] = [
        Signal::Title,
        Signal::PrimaryCta,
        Signal::MultipleCtas,
        Signal::LeadForm,
        Signal::DirectContact,
        Signal::Pricing,
        Signal::Trust,
        Signal::Benefits,
        Signal::Objections,
        Signal::Visuals,
        Signal::Https,
        Signal::MetaDescription,
        Signal::H1,
        Signal::Canonical,
        Signal::Viewport,
        Signal::ImageAlt,
        Signal::NumericClaims,
        Signal::MessageMatch,
    ];

    /// Whether the page satisfies this signal
    pub fn satisfied(&self, f: &PageFeatures, config: &ScoringConfig) -> bool {
        match self {
            Signal::Title => f.title.well_formed(&config.title_band),
            Signal::PrimaryCta => f.primary_cta_present,
            Signal::MultipleCtas => f.cta_count >= 2,
            Signal::LeadForm => f.lead_form_present && f.short_form,
            Signal::DirectContact => f.direct_contact_present,
            Signal::Pricing => f.pricing_mentioned,
            Signal::Trust => f.trust_signal_present,
            Signal::Benefits => f.benefit_language_present,
            Signal::Objections => f.objection_handling_present,
            Signal::Visuals => f.visuals_present,
            Signal::Https => f.https_ok,
            Signal::MetaDescription => f.meta_description.well_formed(&config.meta_band),
            Signal::H1 => f.h1.present,
            Signal::Canonical => f.canonical_present,
            Signal::Viewport => f.viewport_present,
            Signal::ImageAlt => {
                f.image_count == 0 || f.image_alt_ratio >= config.technical.alt_ratio_min
            }
            Signal::NumericClaims => f.numeric_claim_count > 0,
            Signal::MessageMatch => f.message_match_score >= config.message_match_threshold,
        }
    }

    /// The line reported for this signal
    pub fn message(&self, satisfied: bool, config: &ScoringConfig) -> String {
        let text = match (self, satisfied) {
            (Signal::Title, true) => "Title present with a focused length.",
            (Signal::Title, false) => {
                let band = config.title_band;
                return format!(
                    "Write a keyworded <title> of {}-{} characters.",
                    band.min, band.max
                );
            }
            (Signal::PrimaryCta, true) => "Primary CTA found.",
            (Signal::PrimaryCta, false) => "Add a single, clear primary CTA above the fold.",
            (Signal::MultipleCtas, true) => "CTA repeated along the page.",
            (Signal::MultipleCtas, false) => "Repeat the primary CTA further down the page.",
            (Signal::LeadForm, true) => "Short lead form available.",
            (Signal::LeadForm, false) => {
                "Add a short lead form (6 fields or fewer) or a sticky contact option."
            }
            (Signal::DirectContact, true) => "Direct contact route present (phone, email or chat).",
            (Signal::DirectContact, false) => "Offer tel/mailto or WhatsApp for quick contact.",
            (Signal::Pricing, true) => "Pricing or offer signals visible.",
            (Signal::Pricing, false) => {
                "Expose pricing or a quote path (plans, ranges, or 'Get a quote')."
            }
            (Signal::Trust, true) => "Trust or social proof present.",
            (Signal::Trust, false) => "Add testimonials, reviews, client logos or certifications.",
            (Signal::Benefits, true) => "Benefit-led copy detected.",
            (Signal::Benefits, false) => "Lead with outcomes and benefits, not only features.",
            (Signal::Objections, true) => "Objection handling present (FAQ, guarantee, policies).",
            (Signal::Objections, false) => "Answer common objections with an FAQ or a guarantee.",
            (Signal::Visuals, true) => "Visuals present.",
            (Signal::Visuals, false) => "Show the product or service in use with images or video.",
            (Signal::Https, true) => "HTTPS in place.",
            (Signal::Https, false) => "Serve the landing page over HTTPS.",
            (Signal::MetaDescription, true) => "Meta description length on point.",
            (Signal::MetaDescription, false) => {
                let band = config.meta_band;
                return format!(
                    "Write a compelling meta description of {}-{} characters.",
                    band.min, band.max
                );
            }
            (Signal::H1, true) => "H1 present.",
            (Signal::H1, false) => "Add a descriptive H1 that states the value proposition.",
            (Signal::Canonical, true) => "Canonical tag present.",
            (Signal::Canonical, false) => "Declare a canonical URL.",
            (Signal::Viewport, true) => "Responsive viewport meta present.",
            (Signal::Viewport, false) => "Add a viewport meta tag for mobile visitors.",
            (Signal::ImageAlt, true) => "Images carry alt text.",
            (Signal::ImageAlt, false) => "Give every meaningful image descriptive alt text.",
            (Signal::NumericClaims, true) => "Quantified claims visible.",
            (Signal::NumericClaims, false) => "Quantify outcomes with numbers or % improvements.",
            (Signal::MessageMatch, true) => "Headline matches the URL keywords.",
            (Signal::MessageMatch, false) => {
                "Echo the URL/ad keywords in the title and H1 (message match)."
            }
        };
        text.to_string()
    }
}

/// Positives and improvements in canonical signal order
pub fn explain(features: &PageFeatures, config: &ScoringConfig) -> (Vec<String>, Vec<String>) {
    let mut positives = Vec::new();
    let mut improvements = Vec::new();
    for signal in Signal::ALL {
        let ok = signal.satisfied(features, config);
        let line = signal.message(ok, config);
        if ok {
            positives.push(line);
        } else {
            improvements.push(line);
        }
    }
    (positives, improvements)
}

/// One-paragraph narrative over the pillar scores
///
/// The structure pillar is only mentioned when it takes part in the blend.
pub fn summary(scores: &Scores, config: &ScoringConfig) -> String {
    let mut pillars = vec![Pillar::Bofu, Pillar::Convincing, Pillar::Technical];
    if config.overall.structure > 0.0 {
        pillars.push(Pillar::Structure);
    }

    let breakdown = pillars
        .iter()
        .map(|p| {
            let value = scores.get(*p);
            format!("{} {:.0} ({})", p.label(), value, bucket(value))
        })
        .collect::<Vec<_>>()
        .join(", ");

    // stable sort keeps the listing order on ties
    let mut ranked = pillars.clone();
    ranked.sort_by(|a, b| scores.get(*a).total_cmp(&scores.get(*b)));
    let weakest = ranked[0];
    let strongest = ranked[ranked.len() - 1];

    let next = if scores.get(weakest) >= 80.0 {
        "All pillars are strong; keep testing offers and copy.".to_string()
    } else {
        format!("Prioritise {} first to close the gap.", weakest.focus())
    };

    format!(
        "Overall {:.0}/100 ({}). {}. {} trails most, {} leads. {}",
        scores.overall,
        bucket(scores.overall),
        breakdown,
        weakest.label(),
        strongest.label(),
        next
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_signal_emits_exactly_one_line() {
        let config = ScoringConfig::default();
        let (positives, improvements) = explain(&PageFeatures::default(), &config);
        assert_eq!(positives.len() + improvements.len(), Signal::ALL.len());
    }

    #[test]
    fn test_empty_page_improvement_order() {
        let config = ScoringConfig::default();
        let (positives, improvements) = explain(&PageFeatures::default(), &config);

        // no images means nothing to penalise for alt text
        assert_eq!(positives, vec!["Images carry alt text.".to_string()]);
        assert_eq!(improvements[0], "Write a keyworded <title> of 30-65 characters.");
        assert_eq!(improvements[1], "Add a single, clear primary CTA above the fold.");
        assert!(improvements.contains(&"Serve the landing page over HTTPS.".to_string()));
    }

    #[test]
    fn test_long_form_is_an_improvement() {
        let config = ScoringConfig::default();
        let features = PageFeatures {
            lead_form_present: true,
            form_field_count: 12,
            short_form: false,
            ..PageFeatures::default()
        };
        assert!(!Signal::LeadForm.satisfied(&features, &config));
    }

    #[test]
    fn test_summary_names_weakest_pillar() {
        let scores = Scores {
            overall: 61.0,
            bofu: 40.0,
            convincing: 70.0,
            technical: 90.0,
            structure: 10.0,
        };
        let text = summary(&scores, &ScoringConfig::default());
        assert!(text.starts_with("Overall 61/100 (Good)."));
        assert!(text.contains("BoFu 40 (Fair)"));
        assert!(text.contains("BoFu trails most, Technical leads."));
        // structure is not blended by default
        assert!(!text.contains("Structure"));
    }

    #[test]
    fn test_summary_when_all_strong() {
        let scores = Scores {
            overall: 95.0,
            bofu: 95.0,
            convincing: 90.0,
            technical: 100.0,
            structure: 100.0,
        };
        let text = summary(&scores, &ScoringConfig::default());
        assert!(text.ends_with("All pillars are strong; keep testing offers and copy."));
    }
}
