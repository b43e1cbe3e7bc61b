// Plain-text rendering of a résumé.
//
// The rendered text is what the validator measures: keyword occurrences and
// word counts (for density) are taken over exactly this string, so role
// headers, education, and certifications all count toward the denominator.

use super::models::ResumeDocument;
use crate::text::word_count;

/// Render the whole document as plain text.
pub fn render_text(doc: &ResumeDocument) -> String {
    let mut out: Vec<String> = Vec::new();

    if !doc.contact.name.is_empty() {
        out.push(doc.contact.name.clone());
    }
    let details: Vec<&str> = [
        doc.contact.email.as_deref(),
        doc.contact.phone.as_deref(),
        doc.contact.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .chain(doc.contact.links.iter().map(String::as_str))
    .collect();
    if !details.is_empty() {
        out.push(details.join(" | "));
    }

    if !doc.summary.trim().is_empty() {
        out.push(String::new());
        out.push("SUMMARY".to_string());
        out.push(doc.summary.trim().to_string());
    }

    if !doc.experience.is_empty() {
        out.push(String::new());
        out.push("EXPERIENCE".to_string());
        for role in &doc.experience {
            out.push(format!("{} | {} | {}", role.title, role.company, role.dates));
            out.extend(role.bullets.iter().map(|b| format!("- {b}")));
        }
    }

    if !doc.skills.is_empty() {
        out.push(String::new());
        out.push("SKILLS".to_string());
        out.push(doc.skills.join(", "));
    }

    if !doc.education.is_empty() {
        out.push(String::new());
        out.push("EDUCATION".to_string());
        for ed in &doc.education {
            if ed.dates.is_empty() {
                out.push(format!("{}, {}", ed.degree, ed.institution));
            } else {
                out.push(format!("{}, {} ({})", ed.degree, ed.institution, ed.dates));
            }
        }
    }

    if !doc.certifications.is_empty() {
        out.push(String::new());
        out.push("CERTIFICATIONS".to_string());
        out.extend(doc.certifications.iter().map(|c| format!("- {c}")));
    }

    out.join("\n")
}

/// Words in the rendered document, excluding the section labels and list
/// markers the renderer adds.
pub fn document_word_count(doc: &ResumeDocument) -> usize {
    let rendered = render_text(doc);
    let labels = rendered
        .lines()
        .filter(|l| {
            matches!(
                *l,
                "SUMMARY" | "EXPERIENCE" | "SKILLS" | "EDUCATION" | "CERTIFICATIONS"
            )
        })
        .count();
    let markers = rendered
        .split_whitespace()
        .filter(|w| matches!(*w, "-" | "|"))
        .count();
    word_count(&rendered).saturating_sub(labels + markers)
}
