//! Keyword lists used by the feature extractor
//!
//! Lists are plain data, lower-case, one set per category and language.
//! Matching logic lives in `features`; keep entries as short stems where a
//! prefix match is wanted ("testimonial" also covers "testimonials").

use regex::Regex;

/// Keywords for one signal category, split by language
#[derive(Debug, Clone, Copy)]
pub struct KeywordList {
    pub en: &'static [&'static str],
    pub de: &'static [&'static str],
}

impl KeywordList {
    /// All keywords, English first
    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.en.iter().chain(self.de.iter()).copied()
    }

    /// Compile into a case-insensitive regex anchored at word starts
    ///
    /// Longer keywords come first so that multi-word phrases win over their
    /// own prefixes in `find_iter`.
    pub fn to_regex(&self) -> Regex {
        let mut words: Vec<&str> = self.all().collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        words.dedup();
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{})", alternation)).expect("Invalid keyword regex")
    }
}

/// Call-to-action wording on buttons, links, hrefs and class/id attributes
pub const CTA: KeywordList = KeywordList {
    en: &[
        "cta",
        "contact",
        "request",
        "demo",
        "trial",
        "free trial",
        "buy",
        "order",
        "subscribe",
        "sign up",
        "signup",
        "get started",
        "start now",
        "book a call",
        "book a demo",
        "schedule",
        "consultation",
        "get a quote",
        "quote",
        "pricing",
        "add to cart",
        "shop now",
        "call now",
        "call us",
        "purchase",
    ],
    de: &[
        "kontakt",
        "anfrage",
        "anfragen",
        "angebot",
        "kaufen",
        "bestellen",
        "jetzt starten",
        "jetzt testen",
        "jetzt kaufen",
        "termin",
        "beratung",
        "registrieren",
        "abonnieren",
        "preise",
        "in den warenkorb",
    ],
};

/// Price and cost wording
pub const PRICING: KeywordList = KeywordList {
    en: &["price", "pricing", "cost", "fee", "plans", "per month", "quote"],
    de: &["preis", "kosten", "gebühr", "paket", "tarif", "angebot", "pro monat"],
};

/// Testimonials, reviews, case studies, ratings, certifications, awards
pub const TRUST: KeywordList = KeywordList {
    en: &[
        "testimonial",
        "review",
        "case study",
        "case studies",
        "success story",
        "rating",
        "rated",
        "stars",
        "trustpilot",
        "certified",
        "certification",
        "award",
        "iso 9001",
        "trusted by",
        "our clients",
        "customers say",
    ],
    de: &[
        "kundenstimme",
        "kundenerfolg",
        "bewertung",
        "erfahrungsbericht",
        "referenz",
        "zertifiziert",
        "zertifikat",
        "auszeichnung",
        "sterne",
        "unsere kunden",
    ],
};

/// Outcome and benefit wording
pub const BENEFITS: KeywordList = KeywordList {
    en: &[
        "benefit",
        "reduce",
        "increase",
        "save",
        "saving",
        "roi",
        "faster",
        "boost",
        "improve",
        "grow",
        "results",
        "without",
    ],
    de: &[
        "vorteil",
        "nutzen",
        "sparen",
        "ersparnis",
        "steigern",
        "reduzieren",
        "schneller",
        "mehr umsatz",
        "verbessern",
    ],
};

/// FAQ, guarantees, warranties, policies
pub const OBJECTIONS: KeywordList = KeywordList {
    en: &[
        "faq",
        "frequently asked",
        "guarantee",
        "warranty",
        "money back",
        "money-back",
        "refund",
        "privacy policy",
        "returns",
        "cancel anytime",
        "no credit card",
    ],
    de: &[
        "häufige fragen",
        "fragen und antworten",
        "garantie",
        "gewährleistung",
        "datenschutz",
        "rückgabe",
        "widerruf",
        "jederzeit kündbar",
    ],
};

/// Words dropped from URL slugs before message matching
pub const STOPWORDS: KeywordList = KeywordList {
    en: &[
        "the", "and", "for", "with", "your", "you", "our", "from", "that", "this", "are", "was",
        "how", "what", "why", "www", "html", "index", "page", "home",
    ],
    de: &[
        "der", "die", "das", "und", "für", "mit", "von", "ihre", "ihr", "unsere", "auf", "ein",
        "eine", "einen", "den", "dem", "des", "wie", "was", "warum", "seite",
    ],
};

/// Markers of a bot-blocking or challenge page
pub const BOT_BLOCK_MARKERS: &[&str] = &[
    "cloudflare",
    "cf-ray",
    "access denied",
    "captcha",
    "checking your browser",
    "ddos-guard",
    "request blocked",
];

/// Hosts whose embeds count as visuals
pub const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "wistia.com",
    "wistia.net",
    "loom.com",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_lowercase() {
        for list in [CTA, PRICING, TRUST, BENEFITS, OBJECTIONS, STOPWORDS] {
            for word in list.all() {
                assert_eq!(word, word.to_lowercase(), "keyword not lower-case: {}", word);
            }
        }
    }

    #[test]
    fn test_regex_matches_word_starts_only() {
        let re = TRUST.to_regex();
        assert!(re.is_match("Read our Testimonials"));
        assert!(re.is_match("Kundenstimmen aus der Praxis"));
        assert!(!re.is_match("preview the product"));
    }

    #[test]
    fn test_multi_word_phrase_matches() {
        let re = CTA.to_regex();
        let hit = re.find("please Get Started today").unwrap();
        assert_eq!(hit.as_str().to_lowercase(), "get started");
    }
}
