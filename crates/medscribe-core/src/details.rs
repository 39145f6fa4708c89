//! Regex extraction of dosage, frequency, duration, and timing.
//!
//! Detail phrases are pulled from a context window around a medication
//! mention. Each accepted phrase is struck from a scratch copy of the
//! window so later patterns cannot re-match the same characters.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::FIELD_MISSING;
use crate::text::{digitize_number_words, number_word_alternation, words_to_number};

/// Bytes of context kept before a medication mention.
const WINDOW_BEFORE: usize = 70;

/// Bytes of context kept after a medication mention.
const WINDOW_AFTER: usize = 120;

/// Stand-in for a struck-out medication name. Contains no number words and
/// no unit tokens, so it can never satisfy a detail pattern.
const NAME_PLACEHOLDER: &str = "medname";

const UNITS: &str = r"(?:mg|g|ml|mcg|unit|tablet|pill|capsule|spoon(?:ful)?|units?|tabs?|caps?|bottles?|vials?|sachets?|pouches?|drops?|puffs?|sprays?|inhalations?|patches?|milligrams|grams|liters?|tablets|pills)\b";

lazy_static! {
    static ref DOSAGE: Regex = {
        let words = number_word_alternation();
        let num = format!(r"(?:{words}|\d+(?:\.\d+)?)(?:\s+(?:{words}))*");
        Regex::new(&format!(r"({num})\s*({UNITS})?")).expect("dosage pattern")
    };
    static ref UNIT_ANYWHERE: Regex = Regex::new(UNITS).expect("unit pattern");
    static ref FREQUENCY: Vec<Regex> = [
        r"\b(?:once|twice|thrice)\s+a\s+day\b",
        r"\b(?:one|two|three|four|five|six|seven|eight|nine|\d+)\s+times\s+a\s+day\b",
        r"\b(?:daily|every\s+day)\b",
        r"\b(?:every\s+\d+\s*hours?)\b",
        r"\b(?:b\.?d\.?|t\.?i\.?d\.?|o\.?d\.?|q\.?i\.?d\.?|bd|tid|od|qid|bid|tds|qds|qd|prn|stat|as needed)\b",
        r"\b(?:weekly|monthly|yearly)\b",
        r"\b(?:once)\b",
        r"\b(?:before\s+meals|after\s+meals|with\s+food|empty\s+stomach|at\s+night|in\s+the\s+morning|in\s+the\s+evening)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("frequency pattern"))
    .collect();
    static ref DURATION: Vec<Regex> = [
        r"\b(?:for\s+)?(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|\d+)\s+(?:day|week|month|year|hour)s?\b",
        r"\b(?:a\s+couple\s+of\s+days?)\b",
        r"\b(?:long\s+term|indefinitely|as\s+long\s+as\s+needed)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("duration pattern"))
    .collect();
    static ref TIMING: Regex = Regex::new(
        r"(before food|after food|at night|morning|evening|bedtime|before meal|after meal|empty stomach|with food|after breakfast|after lunch|after dinner|before breakfast|before lunch|before dinner)\b"
    )
    .expect("timing pattern");
}

/// Detail fields extracted for one medication; missing fields hold `"N/A"`.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationDetails {
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub timing: String,
}

impl Default for MedicationDetails {
    fn default() -> Self {
        Self {
            dosage: FIELD_MISSING.into(),
            frequency: FIELD_MISSING.into(),
            duration: FIELD_MISSING.into(),
            timing: FIELD_MISSING.into(),
        }
    }
}

/// Windowed regex extraction of prescription detail phrases.
pub struct DetailExtractor;

impl DetailExtractor {
    /// Extract details from the context window around one medication span.
    ///
    /// The window is `[start - 70, end + 120]` bytes, clamped to character
    /// boundaries. The medication name itself is struck out of the window
    /// first so its letters cannot be misread as a detail phrase.
    pub fn extract_near(
        full_text: &str,
        med_start: usize,
        med_end: usize,
        med_name: &str,
    ) -> MedicationDetails {
        let lo = floor_char_boundary(full_text, med_start.saturating_sub(WINDOW_BEFORE));
        let hi = ceil_char_boundary(full_text, (med_end + WINDOW_AFTER).min(full_text.len()));
        let mut scratch = full_text[lo..hi].to_lowercase();

        let name_pattern = format!(r"\b{}\b", regex::escape(&med_name.to_lowercase()));
        if let Ok(re) = Regex::new(&name_pattern) {
            scratch = re.replace(&scratch, NAME_PLACEHOLDER).into_owned();
        }

        Self::extract_from(&mut scratch, &full_text.to_lowercase())
    }

    /// Extract details from the whole text, with no window and no name
    /// striking. Used when no character offsets are available.
    pub fn extract_all(text: &str) -> MedicationDetails {
        let lower = text.to_lowercase();
        let mut scratch = lower.clone();
        Self::extract_from(&mut scratch, &lower)
    }

    fn extract_from(scratch: &mut String, full_lower: &str) -> MedicationDetails {
        let mut details = MedicationDetails::default();

        if let Some(caps) = DOSAGE.captures(scratch) {
            let whole = caps[0].to_string();
            let num_part = caps[1].trim().to_string();
            let unit_part = caps.get(2).map(|m| m.as_str().trim().to_string());

            let converted = words_to_number(&num_part).unwrap_or(num_part);
            details.dosage = match &unit_part {
                Some(unit) => format!("{converted} {unit}"),
                // "mg" is the overwhelmingly common implicit unit; apply it
                // only when no explicit unit appears anywhere in the text.
                None if !UNIT_ANYWHERE.is_match(full_lower) => format!("{converted} mg"),
                None => converted,
            };
            strike(scratch, &whole);
        }

        if let Some(phrase) = first_match(&FREQUENCY, scratch) {
            details.frequency = digitize_number_words(phrase.trim());
        }

        if let Some(phrase) = first_match(&DURATION, scratch) {
            let digitized = digitize_number_words(phrase.trim());
            // The summary template supplies its own "for".
            details.duration = digitized
                .strip_prefix("for ")
                .unwrap_or(&digitized)
                .trim()
                .to_string();
        }

        if let Some(m) = TIMING.find(scratch) {
            details.timing = m.as_str().trim().to_string();
        }

        details
    }
}

/// First pattern in an ordered list that matches the scratch text wins;
/// its phrase is struck so later fields cannot re-match it.
fn first_match(patterns: &[Regex], scratch: &mut String) -> Option<String> {
    for pattern in patterns {
        if let Some(m) = pattern.find(scratch) {
            let phrase = m.as_str().to_string();
            strike(scratch, &phrase);
            return Some(phrase);
        }
    }
    None
}

fn strike(scratch: &mut String, matched: &str) {
    *scratch = scratch.replacen(matched, "", 1);
}

fn floor_char_boundary(text: &str, mut i: usize) -> usize {
    i = i.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    i = i.min(text.len());
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}
