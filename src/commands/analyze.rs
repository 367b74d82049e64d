use std::path::PathBuf;

use colored::Colorize;

use lpcheck::analyze::{self, Analysis, StatusPolicy};
use lpcheck::config::Config;
use lpcheck::error::Result;
use lpcheck::feedback::{self, VoteTally};
use lpcheck::fetch::FetchedPage;
use lpcheck::score::{bucket, Pillar};

use crate::utils::{paint_score, score_bar, truncate_str};

/// Score a landing page, live or from a saved HTML file
pub fn cmd_analyze(
    url: &str,
    html: Option<PathBuf>,
    json: bool,
    show_features: bool,
    votes: Option<PathBuf>,
    any_status: bool,
) -> Result<()> {
    let config = Config::load()?;
    let scoring = &config.scoring;
    let policy = if any_status {
        StatusPolicy::ScoreAnyway
    } else {
        StatusPolicy::Reject
    };

    if !json {
        println!("\n{} {}", "Analyzing".cyan().bold(), url);
    }

    let mut analysis = match html {
        Some(path) => {
            let target = analyze::validate_target(url)?;
            let body = std::fs::read_to_string(&path)?;
            // a saved copy stands in for a successful response
            let page = FetchedPage {
                status: 200,
                final_url: target.clone(),
                html: body,
            };
            if !json {
                println!("  {} Read {} bytes from {}", "✓".green(), page.html.len(), path.display());
            }
            analyze::analyze_fetched(&target, page, scoring, policy)?
        }
        None => analyze::analyze_url(url, scoring, policy)?,
    };

    let mut tally = None;
    if let Some(path) = votes {
        let records = feedback::read_records(&path)?;
        let counted = feedback::tally_for(&records, &analysis.url);
        let before = analysis.result.scores.overall;
        analysis.result.scores.overall = feedback::adjust(before, &counted, &scoring.feedback);
        tally = Some((counted, before));
    }

    if json {
        let mut value = serde_json::to_value(&analysis)?;
        if let Some(obj) = value.as_object_mut() {
            if show_features {
                obj.insert("features".into(), serde_json::to_value(&analysis.features)?);
            }
            if let Some((counted, before)) = tally {
                obj.insert(
                    "feedback".into(),
                    serde_json::json!({
                        "up": counted.up,
                        "down": counted.down,
                        "unadjustedOverall": before,
                    }),
                );
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_analysis(&analysis, tally, show_features, &config)
}

fn print_analysis(
    analysis: &Analysis,
    tally: Option<(VoteTally, f64)>,
    show_features: bool,
    config: &Config,
) -> Result<()> {
    let status = format!("HTTP {}", analysis.status);
    if analysis.status < 300 {
        println!("  {} {}", "✓".green(), status);
    } else {
        println!("  {} {} (scored anyway)", "!".yellow(), status.yellow());
    }
    if analysis.final_url != analysis.url {
        println!("  Redirected to {}", truncate_str(&analysis.final_url, 70).dimmed());
    }
    if let Some(note) = &analysis.note {
        println!("  {} {}", "!".yellow(), note.yellow());
    }

    let scores = &analysis.result.scores;
    println!();
    println!(
        "  {:<11} {:>5.1}  {}  {}",
        "Overall".bold(),
        scores.overall,
        paint_score(scores.overall, &score_bar(scores.overall)),
        bucket(scores.overall).bold()
    );

    let mut pillars = vec![Pillar::Bofu, Pillar::Convincing, Pillar::Technical];
    if config.scoring.overall.structure > 0.0 {
        pillars.push(Pillar::Structure);
    }
    for pillar in pillars {
        let value = scores.get(pillar);
        println!(
            "  {:<11} {:>5.1}  {}  {}",
            pillar.label(),
            value,
            paint_score(value, &score_bar(value)),
            bucket(value).dimmed()
        );
    }

    if let Some((counted, before)) = tally {
        println!(
            "\n  Votes: {} up, {} down (overall {:.1} before feedback)",
            counted.up, counted.down, before
        );
    }

    println!("\n{}", analysis.result.summary);

    if !analysis.result.positives.is_empty() {
        println!("\n{}", "What works".green().bold());
        for line in &analysis.result.positives {
            println!("  {} {}", "✓".green(), line);
        }
    }
    if !analysis.result.improvements.is_empty() {
        println!("\n{}", "Improve next".yellow().bold());
        for line in &analysis.result.improvements {
            println!("  {} {}", "→".yellow(), line);
        }
    }

    if show_features {
        println!("\n{}", "Features".bold());
        println!("{}", "─".repeat(60).dimmed());
        println!("{}", serde_json::to_string_pretty(&analysis.features)?);
        println!("{}", "─".repeat(60).dimmed());
    }

    println!("\n  {}", format!("Scoring policy {}", analysis.result.version).dimmed());
    Ok(())
}
