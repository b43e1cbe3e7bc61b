// Colored terminal output for keyword tables and tailoring reports.
//
// All terminal-specific formatting lives here; main.rs only decides what to
// show.

use colored::Colorize;

use crate::db::models::RunRecord;
use crate::keywords::learned::LearnedKeyword;
use crate::keywords::models::{Extraction, Tier};
use crate::tailor::diagnostics::Diagnostic;
use crate::tailor::pipeline::TailoredResult;

/// Display the tiered keyword table for an extraction.
pub fn display_keywords(extraction: &Extraction) {
    if extraction.is_empty() {
        println!("No keywords extracted. Is the job description long enough?");
        return;
    }

    let source = if extraction.from_cache { " (cached)" } else { "" };
    println!(
        "\n{}",
        format!(
            "=== Keywords ({} terms, {} JD){source} ===",
            extraction.keywords.len(),
            extraction.structure.as_str()
        )
        .bold()
    );
    println!();

    println!(
        "  {:>4}  {:<32} {:<8} {:>5} {:>7}  {:<7}  {}",
        "Rank".dimmed(),
        "Term".dimmed(),
        "Tier".dimmed(),
        "Freq".dimmed(),
        "Score".dimmed(),
        "Target".dimmed(),
        "Categories".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for (i, keyword) in extraction.keywords.iter().enumerate() {
        let categories: Vec<&str> = keyword.categories.iter().map(|c| c.as_str()).collect();
        let mandatory = if keyword.mandatory { "*" } else { " " };
        println!(
            "  {:>4}. {:<31}{mandatory} {:<8} {:>5} {:>7.2}  {:<7}  {}",
            i + 1,
            super::truncate_chars(&keyword.term, 28),
            colorize_tier(keyword.tier),
            keyword.frequency_in_jd,
            keyword.score,
            format!("{}-{}", keyword.target_mentions.min, keyword.target_mentions.max),
            categories.join(", ").dimmed(),
        );
    }
    println!();
    println!("  {} mandatory dictionary term", "*".dimmed());
}

/// Display the outcome of a tailoring run.
pub fn display_result(result: &TailoredResult) {
    println!("\n{}", "=== Tailoring Report ===".bold());
    println!();

    println!("  Match score: {}", colorize_score(result.match_score));
    println!(
        "  Keyword density: {:.1}%",
        result.report.density * 100.0
    );
    println!(
        "  Insertions: {} ({} distinct terms)",
        result.log.len(),
        result.injected_keywords.len()
    );
    if result.recovery_ran {
        println!("  Recovery pass: {}", "ran".yellow());
    }
    if result.from_cache {
        println!("  Keywords: {}", "from cache".dimmed());
    }

    if !result.report.mentions.is_empty() {
        println!();
        println!(
            "  {:<32} {:<8} {:>8}  {}",
            "Term".dimmed(),
            "Tier".dimmed(),
            "Mentions".dimmed(),
            "Target".dimmed(),
        );
        println!("  {}", "-".repeat(60).dimmed());
        for m in &result.report.mentions {
            let mentions = if m.mentions == 0 {
                m.mentions.to_string().red().to_string()
            } else if m.mentions < m.minimum {
                m.mentions.to_string().yellow().to_string()
            } else {
                m.mentions.to_string().green().to_string()
            };
            println!(
                "  {:<32} {:<8} {:>8}  {}-{}",
                super::truncate_chars(&m.term, 29),
                colorize_tier(m.tier),
                mentions,
                m.minimum,
                m.maximum
            );
        }
    }

    if !result.report.missing_terms.is_empty() {
        println!(
            "\n  {} {}",
            "Missing:".red().bold(),
            result.report.missing_terms.join(", ")
        );
    }

    if !result.warnings.is_empty() {
        println!("\n  {}", "Warnings:".bold());
        for warning in &result.warnings {
            println!("    {} {}", warning_marker(warning), warning);
        }
    }
    println!();
}

/// Display the most frequent learned keywords.
pub fn display_learned(entries: &[LearnedKeyword]) {
    if entries.is_empty() {
        println!("No learned keywords yet. Run `atsfit tailor` or `atsfit extract` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Learned Keywords ({}) ===", entries.len()).bold()
    );
    println!();
    println!(
        "  {:<32} {:>9}  {:<16}  {}",
        "Term".dimmed(),
        "Seen".dimmed(),
        "Last seen".dimmed(),
        "Categories".dimmed()
    );
    println!("  {}", "-".repeat(88).dimmed());
    for entry in entries {
        let categories: Vec<&str> = entry.categories.iter().map(|c| c.as_str()).collect();
        println!(
            "  {:<32} {:>9}  {:<16}  {}",
            super::truncate_chars(&entry.term, 29),
            entry.frequency,
            entry.last_seen.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            categories.join(", ")
        );
    }
}

/// Display recent tailoring runs.
pub fn display_runs(runs: &[RunRecord]) {
    for run in runs {
        let recovery = if run.recovery_ran { " +recovery" } else { "" };
        let matched = (run.keyword_count as usize).saturating_sub(run.missing_terms.len());
        println!(
            "  {} {} {}/{} keywords, {} insertions{} ({})",
            colorize_score(run.match_score),
            super::truncate_chars(&run.source_key, 48),
            matched,
            run.keyword_count,
            run.injected_count,
            recovery,
            run.created_at.dimmed()
        );
    }
}

fn warning_marker(warning: &Diagnostic) -> colored::ColoredString {
    match warning {
        Diagnostic::InputTooShort { .. } | Diagnostic::NoKeywordsExtracted => "!!".red().bold(),
        Diagnostic::ValidationBelowThreshold { .. } | Diagnostic::DensityExceeded { .. } => {
            "!".bright_red()
        }
        _ => "~".yellow(),
    }
}

fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.1}%");
    match score {
        s if s >= 90.0 => text.green().bold(),
        s if s >= 70.0 => text.yellow(),
        _ => text.red(),
    }
}

/// Colorize a tier name.
fn colorize_tier(tier: Tier) -> colored::ColoredString {
    match tier {
        Tier::High => tier.as_str().red().bold(),
        Tier::Medium => tier.as_str().yellow(),
        Tier::Low => tier.as_str().green(),
    }
}
