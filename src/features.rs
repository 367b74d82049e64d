//! PageFeatures - conversion-readiness signals extracted from a page
//!
//! Extraction is a pure function of `(html, url)`: the HTML is parsed once,
//! every predicate is evaluated independently, and anything that cannot be
//! matched degrades to "absent". Malformed markup is never an error.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::LengthBand;
use crate::keywords;

/// Characters of body text searched for URL keywords
const MESSAGE_MATCH_WINDOW: usize = 1200;

/// Field counts treated as a short, low-friction form
const SHORT_FORM_MAX_FIELDS: usize = 6;

static CTA_RE: Lazy<Regex> = Lazy::new(|| keywords::CTA.to_regex());
static PRICING_RE: Lazy<Regex> = Lazy::new(|| keywords::PRICING.to_regex());
static TRUST_RE: Lazy<Regex> = Lazy::new(|| keywords::TRUST.to_regex());
static BENEFITS_RE: Lazy<Regex> = Lazy::new(|| keywords::BENEFITS.to_regex());
static OBJECTIONS_RE: Lazy<Regex> = Lazy::new(|| keywords::OBJECTIONS.to_regex());

/// Currency amounts such as "49 €", "$99", "19,90 eur"
static PRICE_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[€$£]\s?\d|\d\s?(?:[€$£]|\beur\b|\busd\b|\bchf\b))")
        .expect("Invalid price amount regex")
});

/// Link targets that reach a person: tel:/mailto:, WhatsApp, or a whole
/// `contact`/`kontakt` path segment
static CONTACT_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:tel:|mailto:)|whatsapp\.com|wa\.me/|(?:^|/)(?:contact|kontakt)(?:\.[a-z]{2,5})?(?:[/?#]|$)",
    )
    .expect("Invalid contact href regex")
});

/// Number-like tokens, optionally decimal and/or percent
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:[.,]\d+)?%?").expect("Invalid number regex")
});

/// Quoted passages of at least a few words ("...", “...”, „...“)
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["“„]([^"“”„]{25,300})["”“]"#).expect("Invalid quote regex")
});

/// Collapsing whitespace
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// Quoted passages needed before quote density alone counts as trust
const QUOTE_DENSITY_MIN: usize = 2;

/// Presence plus character length of a text element
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TextPresence {
    pub present: bool,
    pub length: usize,
}

impl TextPresence {
    fn from_text(text: Option<&str>) -> Self {
        let length = text.map(|t| t.chars().count()).unwrap_or(0);
        Self {
            present: length > 0,
            length,
        }
    }

    /// Present and within the given band
    pub fn well_formed(&self, band: &LengthBand) -> bool {
        self.present && band.contains(self.length)
    }
}

/// Presence plus count of H1 headings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HeadingPresence {
    pub present: bool,
    pub count: usize,
}

/// Signals extracted from one `(html, url)` pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageFeatures {
    pub https_ok: bool,
    pub title: TextPresence,
    pub meta_description: TextPresence,
    pub h1: HeadingPresence,
    pub canonical_present: bool,
    pub viewport_present: bool,
    /// Share of images with non-empty alt text; 1.0 when there are no images
    pub image_alt_ratio: f64,
    pub image_count: usize,
    pub primary_cta_present: bool,
    pub cta_count: usize,
    pub lead_form_present: bool,
    pub form_field_count: usize,
    pub short_form: bool,
    pub direct_contact_present: bool,
    pub pricing_mentioned: bool,
    pub trust_signal_present: bool,
    pub benefit_language_present: bool,
    pub objection_handling_present: bool,
    pub visuals_present: bool,
    pub numeric_claim_count: usize,
    /// Share (0-100) of URL slug keywords found in title + H1 + opening copy
    pub message_match_score: f64,
}

impl Default for PageFeatures {
    fn default() -> Self {
        Self {
            https_ok: false,
            title: TextPresence::default(),
            meta_description: TextPresence::default(),
            h1: HeadingPresence::default(),
            canonical_present: false,
            viewport_present: false,
            image_alt_ratio: 1.0,
            image_count: 0,
            primary_cta_present: false,
            cta_count: 0,
            lead_form_present: false,
            form_field_count: 0,
            short_form: false,
            direct_contact_present: false,
            pricing_mentioned: false,
            trust_signal_present: false,
            benefit_language_present: false,
            objection_handling_present: false,
            visuals_present: false,
            numeric_claim_count: 0,
            message_match_score: 0.0,
        }
    }
}

impl PageFeatures {
    /// A form or a direct contact route exists
    pub fn lead_path_present(&self) -> bool {
        self.lead_form_present || self.direct_contact_present
    }

    /// Number of satisfied core pillars (CTA, lead path, trust, benefits)
    pub fn core_pillars_satisfied(&self) -> usize {
        [
            self.primary_cta_present,
            self.lead_path_present(),
            self.trust_signal_present,
            self.benefit_language_present,
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }
}

/// Extract all features from raw HTML fetched from `url`
pub fn extract(html: &str, url: &str) -> PageFeatures {
    let document = Html::parse_document(html);
    let text = visible_text(&document);
    let lower_text = text.to_lowercase();

    let title_text = first_text(&document, "title");
    let h1_texts = all_texts(&document, "h1");
    let (image_count, image_alt_ratio) = image_alt_stats(&document);
    let cta_count = count_ctas(&document);
    let (lead_form_present, form_field_count) = form_stats(&document);

    let features = PageFeatures {
        https_ok: is_https(url),
        title: TextPresence::from_text(title_text.as_deref()),
        meta_description: TextPresence::from_text(meta_content(&document, "description").as_deref()),
        h1: HeadingPresence {
            present: !h1_texts.is_empty(),
            count: h1_texts.len(),
        },
        canonical_present: canonical_present(&document),
        viewport_present: meta_present(&document, "viewport"),
        image_alt_ratio,
        image_count,
        primary_cta_present: cta_count > 0,
        cta_count,
        lead_form_present,
        form_field_count,
        short_form: (1..=SHORT_FORM_MAX_FIELDS).contains(&form_field_count),
        direct_contact_present: contact_link_present(&document),
        pricing_mentioned: PRICING_RE.is_match(&lower_text) || PRICE_AMOUNT_RE.is_match(&text),
        trust_signal_present: trust_present(&document, &lower_text),
        benefit_language_present: BENEFITS_RE.is_match(&lower_text),
        objection_handling_present: OBJECTIONS_RE.is_match(&lower_text),
        visuals_present: visuals_present(&document),
        numeric_claim_count: NUMBER_RE.find_iter(&text).count(),
        message_match_score: message_match(url, title_text.as_deref(), &h1_texts, &text),
    };

    log::debug!(
        "extracted {}: cta={} fields={} images={} numbers={} match={:.0}",
        url,
        features.cta_count,
        features.form_field_count,
        features.image_count,
        features.numeric_claim_count,
        features.message_match_score
    );

    features
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collapse whitespace and trim
fn clean(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn element_text(element: &ElementRef) -> String {
    clean(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let sel = selector(css)?;
    document
        .select(&sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
}

fn all_texts(document: &Html, css: &str) -> Vec<String> {
    match selector(css) {
        Some(sel) => document.select(&sel).map(|el| element_text(&el)).collect(),
        None => Vec::new(),
    }
}

/// Text a visitor would see: every text node outside script/style/noscript/title
fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|a| {
                a.value().as_element().is_some_and(|e| {
                    matches!(e.name(), "script" | "style" | "noscript" | "title" | "template")
                })
            });
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    clean(&parts.join(" "))
}

fn is_https(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => parsed.scheme() == "https",
        Err(_) => url.trim().to_lowercase().starts_with("https://"),
    }
}

/// Content of `<meta name="...">`, name compared case-insensitively
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let sel = selector("meta[name]")?;
    document
        .select(&sel)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
        .and_then(|el| el.value().attr("content"))
        .map(clean)
        .filter(|c| !c.is_empty())
}

fn meta_present(document: &Html, name: &str) -> bool {
    selector("meta[name]").is_some_and(|sel| {
        document.select(&sel).any(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
    })
}

/// `<link rel="canonical">` with a non-empty href
fn canonical_present(document: &Html) -> bool {
    selector("link[rel][href]").is_some_and(|sel| {
        document.select(&sel).any(|el| {
            let rel = el.value().attr("rel").unwrap_or_default();
            let href = el.value().attr("href").unwrap_or_default();
            rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical"))
                && !href.trim().is_empty()
        })
    })
}

/// Returns (image count, alt ratio); ratio is 1.0 when there are no images
fn image_alt_stats(document: &Html) -> (usize, f64) {
    let Some(sel) = selector("img") else {
        return (0, 1.0);
    };
    let mut total = 0usize;
    let mut with_alt = 0usize;
    for img in document.select(&sel) {
        total += 1;
        if img.value().attr("alt").is_some_and(|alt| !alt.trim().is_empty()) {
            with_alt += 1;
        }
    }
    if total == 0 {
        (0, 1.0)
    } else {
        (total, with_alt as f64 / total as f64)
    }
}

/// Count distinct CTA elements
///
/// An element is a CTA when its visible text, href, class or id contains a
/// CTA keyword. Elements are deduplicated by their normalized visible text,
/// falling back to href for icon-only buttons.
fn count_ctas(document: &Html) -> usize {
    let Some(sel) = selector(r#"a, button, input[type="submit"], input[type="button"]"#) else {
        return 0;
    };

    let mut seen = HashSet::new();
    for el in document.select(&sel) {
        let attrs = el.value();
        let mut label = element_text(&el);
        if label.is_empty() {
            label = clean(attrs.attr("value").unwrap_or_default());
        }
        let href = attrs.attr("href").unwrap_or_default();
        let haystack = format!(
            "{} {} {} {}",
            label,
            href,
            attrs.attr("class").unwrap_or_default(),
            attrs.attr("id").unwrap_or_default()
        )
        .to_lowercase();

        if !CTA_RE.is_match(&haystack) {
            continue;
        }

        let key = if label.is_empty() {
            href.trim().to_lowercase()
        } else {
            label.to_lowercase()
        };
        seen.insert(key);
    }
    seen.len()
}

/// Returns (lead form present, data field count inside forms)
fn form_stats(document: &Html) -> (bool, usize) {
    let has_form = selector("form").is_some_and(|sel| document.select(&sel).next().is_some());
    let has_field = selector("input, select, textarea")
        .is_some_and(|sel| document.select(&sel).any(|el| is_data_field(&el)));

    let field_count = selector("form input, form select, form textarea")
        .map(|sel| document.select(&sel).filter(is_data_field).count())
        .unwrap_or(0);

    (has_form || has_field, field_count)
}

/// Inputs a visitor actually fills in
fn is_data_field(el: &ElementRef) -> bool {
    if el.value().name() != "input" {
        return true;
    }
    let kind = el.value().attr("type").unwrap_or("text").to_ascii_lowercase();
    !matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset" | "image")
}

/// Whether any link or image-map area points at a direct contact route
fn contact_link_present(document: &Html) -> bool {
    selector("a[href], area[href]").is_some_and(|sel| {
        document.select(&sel).any(|el| {
            let href = el.value().attr("href").unwrap_or_default().trim().to_lowercase();
            CONTACT_HREF_RE.is_match(&href)
        })
    })
}

/// Trust keywords, a blockquote, or a density of quoted passages
fn trust_present(document: &Html, lower_text: &str) -> bool {
    if TRUST_RE.is_match(lower_text) {
        return true;
    }
    if selector("blockquote").is_some_and(|sel| document.select(&sel).next().is_some()) {
        return true;
    }
    QUOTE_RE.find_iter(lower_text).count() >= QUOTE_DENSITY_MIN
}

/// Images, video, or an embed from a known video host
fn visuals_present(document: &Html) -> bool {
    if selector("img, video, picture").is_some_and(|sel| document.select(&sel).next().is_some()) {
        return true;
    }
    selector("iframe[src], embed[src], object[data]").is_some_and(|sel| {
        document.select(&sel).any(|el| {
            let src = el
                .value()
                .attr("src")
                .or_else(|| el.value().attr("data"))
                .unwrap_or_default()
                .to_lowercase();
            keywords::VIDEO_HOSTS.iter().any(|host| src.contains(host))
        })
    })
}

/// Keywords from the last non-empty URL path segment
pub fn slug_keywords(url: &str) -> Vec<String> {
    let path = match Url::parse(url.trim()) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => return Vec::new(),
    };
    let Some(segment) = path.split('/').filter(|s| !s.is_empty()).next_back() else {
        return Vec::new();
    };
    // lossy so one bad escape does not keep the whole segment encoded
    let segment = String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes()))
        .to_lowercase();
    let stem = match segment.rsplit_once('.') {
        Some((stem, ext)) if ext.chars().all(|c| c.is_ascii_alphanumeric()) && ext.len() <= 5 => {
            stem.to_string()
        }
        _ => segment,
    };

    let stopwords: HashSet<&str> = keywords::STOPWORDS.all().collect();
    let mut tokens = Vec::new();
    for token in stem.split(['-', '_']) {
        if token.chars().count() < 3 || stopwords.contains(token) {
            continue;
        }
        if !tokens.iter().any(|t: &String| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Share (0-100) of slug keywords present in title + H1s + opening copy
fn message_match(url: &str, title: Option<&str>, h1s: &[String], body_text: &str) -> f64 {
    let tokens = slug_keywords(url);
    if tokens.is_empty() {
        return 0.0;
    }

    let opening: String = body_text.chars().take(MESSAGE_MATCH_WINDOW).collect();
    let haystack = format!("{} {} {}", title.unwrap_or_default(), h1s.join(" "), opening)
        .to_lowercase();

    let matched = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    matched as f64 / tokens.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extraction() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <title>Accounting Software for Small Teams</title>
                <meta name="Description" content="Close your books faster with automated reconciliation and invoicing.">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <link rel="canonical" href="https://example.com/accounting-software">
            </head>
            <body>
                <h1>Accounting software that saves you hours</h1>
                <img src="a.png" alt="Dashboard">
                <img src="b.png">
            </body>
            </html>
        "#;

        let f = extract(html, "https://example.com/accounting-software");

        assert!(f.https_ok);
        assert_eq!(f.title.length, 35);
        assert!(f.meta_description.present);
        assert!(f.viewport_present);
        assert!(f.canonical_present);
        assert_eq!(f.h1.count, 1);
        assert_eq!(f.image_count, 2);
        assert!((f.image_alt_ratio - 0.5).abs() < 1e-9);
        assert!(f.visuals_present);
        assert_eq!(f.message_match_score, 100.0);
    }

    #[test]
    fn test_multiple_h1_counted() {
        let html = "<html><body><h1>One</h1><h1>Two</h1></body></html>";
        let f = extract(html, "https://example.com");
        assert!(f.h1.present);
        assert_eq!(f.h1.count, 2);
    }

    #[test]
    fn test_canonical_needs_href() {
        let html = r#"<html><head><link rel="canonical" href="  "></head></html>"#;
        assert!(!extract(html, "https://example.com").canonical_present);
    }

    #[test]
    fn test_cta_dedup_by_text() {
        let html = r#"
            <html><body>
                <a href="/signup" class="btn">Get started</a>
                <button>Get Started</button>
                <a href="/demo">Book a demo</a>
                <a href="/about">About us</a>
            </body></html>
        "#;
        let f = extract(html, "https://example.com");
        assert!(f.primary_cta_present);
        assert_eq!(f.cta_count, 2);
    }

    #[test]
    fn test_cta_from_class_and_german_text() {
        let html = r#"
            <html><body>
                <a href="/x" class="hero-cta"><span></span></a>
                <button>Jetzt anfragen</button>
            </body></html>
        "#;
        let f = extract(html, "https://example.de");
        assert_eq!(f.cta_count, 2);
    }

    #[test]
    fn test_form_field_count_skips_hidden_and_submit() {
        let html = r#"
            <html><body><form>
                <input type="hidden" name="token">
                <input type="text" name="name">
                <input type="email" name="email">
                <textarea name="msg"></textarea>
                <select name="topic"><option>A</option></select>
                <input type="submit" value="Send">
            </form></body></html>
        "#;
        let f = extract(html, "https://example.com");
        assert!(f.lead_form_present);
        assert_eq!(f.form_field_count, 4);
        assert!(f.short_form);
    }

    #[test]
    fn test_long_form_is_not_short() {
        let inputs: String = (0..8).map(|i| format!("<input name=\"f{}\">", i)).collect();
        let html = format!("<html><body><form>{}</form></body></html>", inputs);
        let f = extract(&html, "https://example.com");
        assert_eq!(f.form_field_count, 8);
        assert!(!f.short_form);
    }

    #[test]
    fn test_direct_contact_routes() {
        for snippet in [
            r#"<a href="tel:+491234">Call</a>"#,
            r#"<a href="mailto:hi@example.com">Mail</a>"#,
            r#"<a href="https://api.whatsapp.com/send?phone=1">Chat</a>"#,
            r#"<a href="/kontakt">Kontakt</a>"#,
            r#"<a href="https://example.com/de/contact/?ref=nav">Contact</a>"#,
            r#"<a href="contact.html">Contact</a>"#,
            r#"<map><area href="tel:+491234"></map>"#,
        ] {
            let html = format!("<html><body>{}</body></html>", snippet);
            assert!(extract(&html, "https://example.com").direct_contact_present, "{}", snippet);
        }
    }

    #[test]
    fn test_asset_paths_are_not_contact_routes() {
        for snippet in [
            r#"<link rel="stylesheet" href="/wp-content/plugins/contact-form-7/style.css">"#,
            r#"<script src="/wp-content/plugins/contact-form-7/includes/js/index.js"></script>"#,
            r#"<a href="/contact-us-today-promo">Promo</a>"#,
            r#"<a href="/blog/how-to-contact-support">Blog</a>"#,
            r#"<p>Write to mailto:nobody@example.com</p>"#,
        ] {
            let html = format!("<html><head></head><body>{}<p>hi</p></body></html>", snippet);
            let f = extract(&html, "https://example.com");
            assert!(!f.direct_contact_present, "{}", snippet);
            assert!(!f.lead_path_present(), "{}", snippet);
        }
    }

    #[test]
    fn test_copy_keywords_ignore_scripts() {
        let html = r#"
            <html><body>
                <p>Plain words here.</p>
                <script>var review = "testimonial faq pricing";</script>
            </body></html>
        "#;
        let f = extract(html, "https://example.com");
        assert!(!f.trust_signal_present);
        assert!(!f.objection_handling_present);
        assert!(!f.pricing_mentioned);
    }

    #[test]
    fn test_copy_keywords_match() {
        let html = r#"
            <html><body>
                <p>Unsere Kunden lieben uns. Mit Geld-zurück-Garantie.</p>
                <p>Sparen Sie Zeit. Ab 49 € im Monat.</p>
            </body></html>
        "#;
        let f = extract(html, "https://example.de");
        assert!(f.trust_signal_present);
        assert!(f.objection_handling_present);
        assert!(f.benefit_language_present);
        assert!(f.pricing_mentioned);
    }

    #[test]
    fn test_blockquote_counts_as_trust() {
        let html = "<html><body><blockquote>Great team.</blockquote></body></html>";
        assert!(extract(html, "https://example.com").trust_signal_present);
    }

    #[test]
    fn test_video_embed_counts_as_visual() {
        let html = r#"<html><body><iframe src="https://www.youtube-nocookie.com/embed/x"></iframe></body></html>"#;
        assert!(extract(html, "https://example.com").visuals_present);

        let html = r#"<html><body><iframe src="https://maps.example.com/embed"></iframe></body></html>"#;
        assert!(!extract(html, "https://example.com").visuals_present);
    }

    #[test]
    fn test_numeric_claims() {
        let html = "<html><body><p>Cut costs by 30% in 2 weeks, 4.8 stars.</p></body></html>";
        assert_eq!(extract(html, "https://example.com").numeric_claim_count, 3);
    }

    #[test]
    fn test_slug_keywords() {
        assert_eq!(
            slug_keywords("https://example.com/lp/crm-software-for-the-trades"),
            vec!["crm", "software", "trades"]
        );
        assert_eq!(
            slug_keywords("https://example.de/angebote/steuerberater_und_buchhaltung.html"),
            vec!["steuerberater", "buchhaltung"]
        );
        assert!(slug_keywords("https://example.com/").is_empty());
        assert!(slug_keywords("not a url").is_empty());
    }

    #[test]
    fn test_slug_keywords_survive_invalid_escape() {
        let tokens = slug_keywords("https://x.de/%C3%BCber-gr%C3%BCnde-pr%FF");
        assert_eq!(tokens[0], "über");
        assert_eq!(tokens[1], "gründe");
        assert!(tokens.iter().all(|t| !t.contains('%')));
    }

    #[test]
    fn test_partial_message_match() {
        let html = "<html><head><title>CRM for plumbers</title></head><body></body></html>";
        let f = extract(html, "https://example.com/crm-invoicing");
        assert_eq!(f.message_match_score, 50.0);
    }

    #[test]
    fn test_empty_input() {
        let f = extract("", "https://example.com");
        let expected = PageFeatures {
            https_ok: true,
            ..PageFeatures::default()
        };
        assert_eq!(f, expected);
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let html = "<html><body><div><a href='/contact'>Contact<form><input name=x></body";
        let f = extract(html, "http://example.com/");
        assert!(f.direct_contact_present);
        assert!(f.lead_form_present);
    }
}
