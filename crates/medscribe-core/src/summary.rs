//! Structured summary composition.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::PrescriptionRecord;

lazy_static! {
    static ref MULTI_WS: Regex = Regex::new(r"\s+").expect("whitespace pattern");
    static ref DOUBLE_PERIOD: Regex = Regex::new(r"\.\s*\.").expect("double-period pattern");
}

/// Composes the prose summary from the extracted note facts.
///
/// The summary is assembled from fixed sentence templates rather than
/// generated text, so the same facts always render the same way. A
/// model-generated overview is used only when the note yielded neither
/// symptoms nor diseases.
pub struct SummaryComposer;

impl SummaryComposer {
    pub fn compose(
        symptoms: &[String],
        diseases: &[String],
        procedures: &[String],
        prescriptions: &[PrescriptionRecord],
        advice: &[String],
        fallback_overview: Option<&str>,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !symptoms.is_empty() || !diseases.is_empty() {
            let mut line = String::from("Patient reports ");
            if !symptoms.is_empty() {
                line.push_str(&format!("symptoms of {}", symptoms.join(", ")));
            }
            if !symptoms.is_empty() && !diseases.is_empty() {
                line.push_str(" and ");
            }
            if !diseases.is_empty() {
                line.push_str(&format!("diagnosed with {}", diseases.join(", ")));
            }
            line.push('.');
            parts.push(line);
        } else if let Some(overview) = fallback_overview {
            let overview = overview.trim();
            if !overview.is_empty() {
                parts.push(overview.to_string());
            }
        }

        if !procedures.is_empty() {
            parts.push(format!(
                "Tests/Procedures recommended: {}.",
                procedures.join(", ")
            ));
        }

        if !prescriptions.is_empty() {
            let lines: Vec<String> = prescriptions.iter().map(|p| p.summary_line()).collect();
            parts.push(format!("Prescribed medications: {}.", lines.join("; ")));
        }

        if !advice.is_empty() {
            parts.push(format!("Additional advice: {}.", advice.join("; ")));
        }

        let mut summary = MULTI_WS.replace_all(parts.join(" ").trim(), " ").into_owned();
        if !summary.is_empty() && !summary.ends_with(['.', '!', '?']) {
            summary.push('.');
        }
        DOUBLE_PERIOD.replace_all(&summary, ".").into_owned()
    }
}
