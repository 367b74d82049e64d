use std::path::Path;

use colored::Colorize;

use lpcheck::config::Config;
use lpcheck::error::Result;
use lpcheck::learn;

/// Fit blend weights from a labelled CSV and optionally store them
pub fn cmd_learn(csv: &Path, save: bool, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(csv)?;
    let learned = learn::learn_from_csv(&text)?;

    let mut saved_version = None;
    if save {
        let mut config = Config::load()?;
        learned.apply_to(&mut config.scoring);
        config.scoring.validate()?;
        config.save()?;
        saved_version = Some(config.scoring.version.clone());
    }

    if json {
        let mut value = serde_json::to_value(&learned)?;
        if let (Some(obj), Some(version)) = (value.as_object_mut(), &saved_version) {
            obj.insert("savedVersion".into(), version.clone().into());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("\n{} from {} rows", "Learned weights".bold(), learned.rows);
    let w = &learned.weights;
    for (label, value, raw) in [
        ("BoFu", w.bofu, learned.raw[0]),
        ("Convincing", w.convincing, learned.raw[1]),
        ("Technical", w.technical, learned.raw[2]),
    ] {
        let note = if raw < 0.0 {
            format!("  (raw {:.3}, clamped)", raw).yellow().to_string()
        } else {
            String::new()
        };
        println!("  {:<11} {:.3}{}", label, value, note);
    }
    println!("  {:<11} {:.2}", "Bias", learned.bias);
    println!("  {:<11} {:.2}", "RMSE", learned.rmse);

    match saved_version {
        Some(version) => println!(
            "\n{} Saved to {} as {}",
            "✓".green(),
            Config::config_path()?.display(),
            version
        ),
        None => println!("\n{}", "Run again with --save to use these weights.".dimmed()),
    }

    Ok(())
}
