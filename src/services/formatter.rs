// src/services/formatter.rs

//! Renders accepted candidates into notification payloads.

use crate::models::{JobCandidate, NotificationPayload, Variant};

/// Render a candidate. Pure: the same inputs always give the same payload.
///
/// `reference_year` labels summer-only variants that have no terms cell.
pub fn render(
    candidate: &JobCandidate,
    variant: &Variant,
    reference_year: i32,
) -> NotificationPayload {
    let location = candidate.location_display();
    let terms = terms_line(candidate, variant, reference_year);

    let mut text = String::new();
    text.push_str(&format!("**📅 Date Posted:** {}\n", candidate.posted_cell));
    text.push_str(&format!("**ℹ️ Company:** __{}__\n", candidate.company));
    text.push_str(&format!("**👨‍💻 Job Title:** {}\n", candidate.title));
    text.push_str(&format!("**📍 Location:** {}\n", location));
    if let Some(terms) = &terms {
        text.push_str(&format!("**➡️ When?:** {}\n", terms));
    }
    text.push_str(&format!("**👉 Job Link:** <{}>\n", candidate.apply_link));

    NotificationPayload {
        date_posted: candidate.posted_cell.clone(),
        company: candidate.company.clone(),
        title: candidate.title.clone(),
        location,
        terms,
        apply_link: candidate.apply_link.clone(),
        text,
    }
}

fn terms_line(candidate: &JobCandidate, variant: &Variant, reference_year: i32) -> Option<String> {
    match &candidate.terms {
        Some(cell) if variant.has_terms_column => Some(
            cell.split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .collect::<Vec<_>>()
                .join(" | "),
        ),
        _ if variant.is_summer_only => Some(format!("Summer {reference_year}")),
        _ => None,
    }
}
