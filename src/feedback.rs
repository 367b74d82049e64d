//! Vote-based post-processing of the overall score
//!
//! Votes are read from a JSON Lines file, one record per line. The scorer
//! never calls into this module; callers opt in by applying `adjust` to a
//! finished result.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::FeedbackPolicy;
use crate::error::Result;
use crate::score::Scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

/// One stored vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub url: String,
    /// Scores the voter saw, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    pub vote: Vote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub up: u32,
    pub down: u32,
}

impl VoteTally {
    pub fn total(&self) -> u32 {
        self.up + self.down
    }
}

/// Reduce a URL to origin + path so query strings and fragments share votes
///
/// Unparseable input is returned trimmed and unchanged.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) => format!("{}{}", url.origin().ascii_serialization(), url.path()),
        Err(_) => trimmed.to_string(),
    }
}

/// Parse JSON Lines records, skipping blank and malformed lines
pub fn parse_records(content: &str) -> Vec<FeedbackRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping feedback line {}: {}", idx + 1, e);
                None
            }
        })
        .collect()
}

/// Read a JSON Lines votes file
pub fn read_records(path: &Path) -> Result<Vec<FeedbackRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(&content))
}

/// Count the votes cast for the same page as `url`
pub fn tally_for(records: &[FeedbackRecord], url: &str) -> VoteTally {
    let target = normalize_url(url);
    records
        .iter()
        .filter(|r| normalize_url(&r.url) == target)
        .fold(VoteTally::default(), |mut tally, r| {
            match r.vote {
                Vote::Up => tally.up += 1,
                Vote::Down => tally.down += 1,
            }
            tally
        })
}

/// Nudge an overall score by the vote balance
///
/// Below `min_votes` the score is returned unchanged. Above it the shift is
/// at most `max_delta` and grows with the vote count on a log scale.
pub fn adjust(overall: f64, tally: &VoteTally, policy: &FeedbackPolicy) -> f64 {
    let n = tally.total();
    if n == 0 || n < policy.min_votes {
        return overall;
    }

    let balance = (tally.up as f64 - tally.down as f64) / n as f64;
    let confidence = ((n as f64) + 1.0).log10().min(1.0);
    let delta = policy.max_delta * balance * confidence;

    let adjusted = (overall + delta).clamp(0.0, 100.0);
    log::debug!(
        "feedback {}↑ {}↓ moves overall {:.1} -> {:.1}",
        tally.up,
        tally.down,
        overall,
        adjusted
    );
    (adjusted * 10.0).round() / 10.0
}
