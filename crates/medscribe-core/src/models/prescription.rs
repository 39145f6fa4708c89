//! Prescription records and assembled note facts.

use serde::{Deserialize, Serialize};

use super::Entity;

/// Sentinel for a detail field the pipeline could not find.
pub const FIELD_MISSING: &str = "N/A";

/// One prescribed medication with its extracted detail fields.
///
/// Detail fields hold `"N/A"` rather than being absent, matching the wire
/// shape the note-taking clients expect. At most one record exists per
/// resolved canonical name within a single extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    /// Canonical medicine name from the reference vocabulary.
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub timing: String,
}

impl PrescriptionRecord {
    /// Create a record with all detail fields missing.
    pub fn new(medication: impl Into<String>) -> Self {
        Self {
            medication: medication.into(),
            dosage: FIELD_MISSING.into(),
            frequency: FIELD_MISSING.into(),
            duration: FIELD_MISSING.into(),
            timing: FIELD_MISSING.into(),
        }
    }

    /// Render the record as a summary fragment, omitting missing fields.
    pub fn summary_line(&self) -> String {
        let mut line = self.medication.clone();
        if self.dosage != FIELD_MISSING {
            line.push(' ');
            line.push_str(&self.dosage);
        }
        if self.frequency != FIELD_MISSING {
            line.push(' ');
            line.push_str(&self.frequency);
        }
        if self.duration != FIELD_MISSING {
            line.push_str(" for ");
            line.push_str(&self.duration);
        }
        line
    }
}

/// Everything extracted from one clinical note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteExtraction {
    /// Merged entity spans, ascending by start offset.
    pub entities: Vec<Entity>,
    /// Deduplicated symptom texts, "recovery" mentions filtered out.
    pub symptoms: Vec<String>,
    /// Deduplicated disease/condition texts.
    pub diseases: Vec<String>,
    /// Deduplicated test/procedure texts.
    pub procedures: Vec<String>,
    /// One record per resolved canonical medication.
    pub prescriptions: Vec<PrescriptionRecord>,
    /// Sorted canonical advice sentences.
    pub advice: Vec<String>,
    /// Composed prose summary.
    pub summary: String,
}

/// A stored user correction used to override future extractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// The note text the correction applies to.
    pub original_text: String,
    /// The corrected prescription list, returned verbatim on a match.
    pub corrected_medicines: Vec<PrescriptionRecord>,
}
