use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Serialize;
use ureq::ResponseExt;

use crate::error::Result;
use crate::keywords::BOT_BLOCK_MARKERS;

/// HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 12;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; lpcheck/",
    env!("CARGO_PKG_VERSION"),
    "; landing page checker)"
);

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Shared HTTP agent for connection pooling
///
/// Non-2xx statuses come back as data so the caller can decide whether to
/// score a partial body.
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .http_status_as_error(false)
        .build()
        .into()
});

/// A fetched page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedPage {
    /// HTTP status of the final response
    pub status: u16,
    /// Final URL after redirects
    pub final_url: String,
    /// Raw body
    #[serde(skip_serializing)]
    pub html: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error status whose body looks like a bot-blocking or challenge page
    pub fn looks_blocked(&self) -> bool {
        self.status >= 400 && has_block_markers(&self.html)
    }
}

/// Whether a body carries bot-blocking markers
pub fn has_block_markers(body: &str) -> bool {
    let lower = body.to_lowercase();
    BOT_BLOCK_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Fetch a page with a single GET, following redirects
pub fn fetch_page(url: &str) -> Result<FetchedPage> {
    let response = HTTP_AGENT
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", ACCEPT)
        .call()?;

    let status = response.status().as_u16();
    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;

    log::info!("fetched {} -> {} ({} bytes)", final_url, status, html.len());

    Ok(FetchedPage {
        status,
        final_url,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16, html: &str) -> FetchedPage {
        FetchedPage {
            status,
            final_url: "https://example.com/".into(),
            html: html.into(),
        }
    }

    #[test]
    fn test_success_range() {
        assert!(page(200, "").is_success());
        assert!(page(204, "").is_success());
        assert!(!page(301, "").is_success());
        assert!(!page(404, "").is_success());
    }

    #[test]
    fn test_block_detection_needs_error_status() {
        let challenge = "<title>Just a moment...</title><p>Checking your browser</p> Cloudflare";
        assert!(page(403, challenge).looks_blocked());
        assert!(!page(200, challenge).looks_blocked());
        assert!(!page(404, "<p>Not found</p>").looks_blocked());
    }

    #[test]
    fn test_user_agent_names_tool() {
        assert!(USER_AGENT.contains("lpcheck/"));
    }
}
