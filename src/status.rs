// System status display: DB stats, learned store size, recent runs.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, config: &Config) -> Result<()> {
    let db_path = config.db_path.as_str();
    if !Path::new(db_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `atsfit init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    match &config.ruleset_path {
        Some(path) => println!("Ruleset: {}", path.display()),
        None => println!("Ruleset: built-in"),
    }
    println!(
        "Profile: {:?} (target {:.0}%, density ceiling {:.1}%)",
        config.profile,
        config.tailor.target_match_score,
        config.tailor.density_ceiling * 100.0
    );

    let learned = db.learned_keyword_count().await?;
    println!(
        "Learned keywords: {} of {} capacity",
        learned, config.tailor.learned_capacity
    );

    let total_runs = db.run_count().await?;
    let runs = db.recent_runs(5).await?;
    if runs.is_empty() {
        println!("Tailoring runs: none yet");
        println!("  Run `atsfit tailor --resume resume.json --jd job.txt` to tailor a résumé");
    } else {
        println!("Tailoring runs: {} total, {} most recent:", total_runs, runs.len());
        crate::output::terminal::display_runs(&runs);
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
