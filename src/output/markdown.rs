// Markdown report for a tailoring run.
//
// Written next to the tailored résumé so the user can review every insertion
// before submitting.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::tailor::pipeline::TailoredResult;

/// Escape characters that would break a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render the report as Markdown.
pub fn render_report(result: &TailoredResult, source: &str) -> String {
    let mut md = String::new();
    let report = &result.report;

    let _ = writeln!(md, "# atsfit Tailoring Report\n");
    let _ = writeln!(md, "Job description: `{}`  ", source);
    let _ = writeln!(md, "Generated: {}\n", Utc::now().format("%Y-%m-%d %H:%M UTC"));

    let _ = writeln!(md, "| Metric | Value |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| Match score | {:.1}% |", report.match_score);
    let _ = writeln!(md, "| Keyword density | {:.1}% |", report.density * 100.0);
    let _ = writeln!(
        md,
        "| Keywords matched | {} / {} |",
        report.matched_terms.len(),
        result.keywords.len()
    );
    let _ = writeln!(md, "| Insertions | {} |", result.log.len());
    let _ = writeln!(
        md,
        "| Recovery pass | {} |",
        if result.recovery_ran { "yes" } else { "no" }
    );
    md.push('\n');

    if !report.mentions.is_empty() {
        let _ = writeln!(md, "## Keywords\n");
        let _ = writeln!(md, "| Term | Tier | Mentions | Target |");
        let _ = writeln!(md, "|---|---|---|---|");
        for m in &report.mentions {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {}-{} |",
                cell(&m.term),
                m.tier,
                m.mentions,
                m.minimum,
                m.maximum
            );
        }
        md.push('\n');
    }

    if !result.log.is_empty() {
        let _ = writeln!(md, "## Insertions\n");
        let _ = writeln!(md, "| Term | Where | Strategy | Mentions after |");
        let _ = writeln!(md, "|---|---|---|---|");
        for record in result.log.records() {
            let _ = writeln!(
                md,
                "| {} | {} | {:?} | {} |",
                cell(&record.term),
                record.location,
                record.strategy,
                record.mention_count_after
            );
        }
        md.push('\n');
    }

    if !report.missing_terms.is_empty() {
        let _ = writeln!(md, "## Missing Keywords\n");
        for term in &report.missing_terms {
            let _ = writeln!(md, "- {term}");
        }
        md.push('\n');
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(md, "## Warnings\n");
        for warning in &result.warnings {
            let _ = writeln!(md, "- {warning}");
        }
        md.push('\n');
    }

    md
}

/// Write the report to `path`, creating parent directories. Returns the path.
pub fn generate_report(result: &TailoredResult, source: &str, path: &str) -> Result<String> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory for {path}"))?;
        }
    }
    std::fs::write(path, render_report(result, source))
        .with_context(|| format!("Failed to write report to {path}"))?;
    Ok(path.to_string())
}
