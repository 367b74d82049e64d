use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LpError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus {
        status: u16,
        url: String,
        bot_hint: bool,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Weight learning failed: {0}")]
    LearnError(String),
}

impl LpError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LpError::HttpError(_) => Some(
                "Check your internet connection and that the site is reachable"
            ),
            LpError::InvalidUrl(_) | LpError::UrlParseError(_) => Some(
                "Provide a full URL starting with http:// or https://"
            ),
            LpError::UpstreamStatus { bot_hint: true, .. } => Some(
                "The site appears to block automated requests; score a saved copy instead:\n  lpcheck analyze <url> --html page.html"
            ),
            LpError::UpstreamStatus { .. } => Some(
                "Score the returned body anyway with --any-status"
            ),
            LpError::ConfigError(_) | LpError::TomlError(_) => Some(
                "Check the config file with `lpcheck config show`, or reset it with `lpcheck config init --force`"
            ),
            LpError::LearnError(_) => Some(
                "The CSV needs the columns bofu, convincing, technical, target_score and at least 4 varied rows"
            ),
            _ => None,
        }
    }

    /// HTTP status this error maps to at the request boundary.
    ///
    /// Invalid input is the caller's fault; everything else is reported as
    /// an upstream/analysis failure.
    pub fn http_status(&self) -> u16 {
        match self {
            LpError::InvalidUrl(_) | LpError::UrlParseError(_) => 400,
            _ => 500,
        }
    }
}

/// JSON error payload returned by the request boundary
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
            status: None,
            bot_hint: None,
            note: None,
        }
    }
}

impl From<&LpError> for ErrorBody {
    fn from(err: &LpError) -> Self {
        match err {
            LpError::InvalidUrl(_) | LpError::UrlParseError(_) => {
                ErrorBody::new("Provide a full URL starting with http(s)://")
            }
            LpError::UpstreamStatus { status, bot_hint, .. } => {
                let mut body = ErrorBody::new("Could not analyze page (upstream error)");
                body.detail = Some(err.to_string());
                body.status = Some(*status);
                if *bot_hint {
                    body.bot_hint = Some(true);
                    body.note = Some(crate::analyze::BOT_NOTE.to_string());
                }
                body
            }
            other => {
                let mut body = ErrorBody::new("Could not analyze page (fetch failed)");
                body.detail = Some(other.to_string());
                body
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(LpError::InvalidUrl("ftp://x".into()).http_status(), 400);
        let upstream = LpError::UpstreamStatus {
            status: 503,
            url: "https://example.com".into(),
            bot_hint: false,
        };
        assert_eq!(upstream.http_status(), 500);
        assert_eq!(LpError::ConfigError("x".into()).http_status(), 500);
    }

    #[test]
    fn test_error_body_carries_bot_hint() {
        let err = LpError::UpstreamStatus {
            status: 403,
            url: "https://example.com".into(),
            bot_hint: true,
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.status, Some(403));
        assert_eq!(body.bot_hint, Some(true));
        assert!(body.note.is_some());

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["botHint"], true);
    }

    #[test]
    fn test_error_body_skips_empty_fields() {
        let body = ErrorBody::from(&LpError::InvalidUrl("nope".into()));
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("detail"));
        assert!(!json.contains("botHint"));
    }
}
