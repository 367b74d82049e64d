//! Request boundary: validate → fetch → extract → score
//!
//! Everything that can fail lives here; the extractor and the scorer below
//! it are total. Callers map `LpError` to a status with
//! `LpError::http_status` and to a payload with `ErrorBody::from`.

use serde::Serialize;
use url::Url;

use crate::config::ScoringConfig;
use crate::error::{LpError, Result};
use crate::features::{self, PageFeatures};
use crate::fetch::{self, FetchedPage};
use crate::score::{self, ScoreResult};

/// Note attached when a response looks like a bot-blocking page
pub const BOT_NOTE: &str =
    "The site answered with a blocking or challenge page; scores would describe that page, not the landing page.";

/// What to do with a non-2xx response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Report an upstream error and do not score
    #[default]
    Reject,
    /// Score whatever body came back and attach the status
    ScoreAnyway,
}

/// A completed analysis of a fetched URL
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    #[serde(flatten)]
    pub result: ScoreResult,
    #[serde(skip)]
    pub features: PageFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Check a user-supplied target and return it trimmed
///
/// Requires an explicit http:// or https:// prefix and a host.
pub fn validate_target(raw: &str) -> Result<String> {
    let target = raw.trim();
    if target.is_empty() {
        return Err(LpError::InvalidUrl("missing url".into()));
    }

    let lower = target.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(LpError::InvalidUrl(format!(
            "{} (must start with http:// or https://)",
            target
        )));
    }

    let parsed = Url::parse(target)?;
    if parsed.host_str().is_none_or(|h| h.is_empty()) {
        return Err(LpError::InvalidUrl(format!("{} (no host)", target)));
    }

    Ok(target.to_string())
}

/// Pure pipeline over an HTML string
pub fn analyze_html(html: &str, url: &str, config: &ScoringConfig) -> (PageFeatures, ScoreResult) {
    let features = features::extract(html, url);
    let result = score::score(&features, config);
    (features, result)
}

/// Fetch and analyze a URL
pub fn analyze_url(raw: &str, config: &ScoringConfig, policy: StatusPolicy) -> Result<Analysis> {
    let url = validate_target(raw)?;
    let page = fetch::fetch_page(&url)?;
    analyze_fetched(&url, page, config, policy)
}

/// Apply the status policy to an already fetched page and score it
pub fn analyze_fetched(
    url: &str,
    page: FetchedPage,
    config: &ScoringConfig,
    policy: StatusPolicy,
) -> Result<Analysis> {
    let blocked = page.looks_blocked();

    if !page.is_success() && policy == StatusPolicy::Reject {
        log::warn!("upstream {} returned {}", url, page.status);
        return Err(LpError::UpstreamStatus {
            status: page.status,
            url: url.to_string(),
            bot_hint: blocked,
        });
    }

    // features are extracted against the requested URL; the message-match
    // slug is the one the visitor clicked
    let (features, result) = analyze_html(&page.html, url, config);

    Ok(Analysis {
        url: url.to_string(),
        final_url: page.final_url,
        status: page.status,
        result,
        features,
        bot_hint: blocked.then_some(true),
        note: blocked.then(|| BOT_NOTE.to_string()),
    })
}
