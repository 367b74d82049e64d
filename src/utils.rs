//! Shared terminal rendering helpers

use colored::{ColoredString, Colorize};

const BAR_WIDTH: usize = 20;

/// Fixed-width bar for a 0..=100 score
pub fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Color a score by its bucket
pub fn paint_score(score: f64, text: &str) -> ColoredString {
    if score >= 80.0 {
        text.green()
    } else if score >= 60.0 {
        text.cyan()
    } else if score >= 40.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Truncate a string at a char boundary, appending "..." when cut
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let kept: String = s.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}
