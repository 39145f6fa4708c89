//! In-memory store of user corrections.
//!
//! Clinicians can correct a bad extraction; the corrected prescription
//! list is kept and replayed verbatim when a near-identical note arrives
//! again. Storage is append-only and process-local.

use std::sync::Mutex;

use strsim::sorensen_dice;
use tracing::debug;

use crate::models::{FeedbackRecord, PrescriptionRecord};
use crate::vocab::ratio;

/// Whole-text similarity at or above which a stored correction overrides
/// the pipeline output.
pub const FEEDBACK_OVERRIDE_THRESHOLD: f64 = 90.0;

/// Name similarity a corrected medicine must reach to be offered as a
/// suggestion.
pub const FEEDBACK_NAME_THRESHOLD: f64 = 75.0;

/// Whole-text similarity measure used for feedback lookup.
///
/// Injectable so tests can pin scores without crafting edit distances.
pub trait TextSimilarity: Send + Sync {
    /// Similarity of two texts on a 0–100 scale.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Default similarity: normalized edit distance.
pub struct EditSimilarity;

impl TextSimilarity for EditSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        ratio(a, b)
    }
}

/// Append-only store of corrections, shared across request handlers.
pub struct FeedbackStore {
    records: Mutex<Vec<FeedbackRecord>>,
    similarity: Box<dyn TextSimilarity>,
}

impl Default for FeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::with_similarity(Box::new(EditSimilarity))
    }

    pub fn with_similarity(similarity: Box<dyn TextSimilarity>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            similarity,
        }
    }

    /// Append a correction. Existing records are never rewritten; lookups
    /// scan in insertion order and the first match wins.
    pub fn record(&self, feedback: FeedbackRecord) {
        let mut records = self.lock();
        records.push(feedback);
        debug!(count = records.len(), "stored extraction feedback");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Return the corrected prescription list for the first stored record
    /// whose original text is at least [`FEEDBACK_OVERRIDE_THRESHOLD`]
    /// similar to `text`. Comparison is case-insensitive.
    pub fn find_override(&self, text: &str) -> Option<Vec<PrescriptionRecord>> {
        let lower = text.to_lowercase();
        let records = self.lock();
        for record in records.iter() {
            let score = self
                .similarity
                .similarity(&lower, &record.original_text.to_lowercase());
            if score >= FEEDBACK_OVERRIDE_THRESHOLD {
                debug!(score, "replaying corrected extraction from feedback");
                return Some(record.corrected_medicines.clone());
            }
        }
        None
    }

    /// Feedback-first medicine suggestion.
    ///
    /// Outer `None` means no stored correction matched and the caller
    /// should fall through to its own suggestion logic. `Some(None)`
    /// means a correction matched the text but none of its medicines
    /// matched by name, which ends the lookup with no suggestion.
    pub fn suggest(&self, text: &str) -> Option<Option<String>> {
        let lower = text.to_lowercase();
        let records = self.lock();
        for record in records.iter() {
            let score = self
                .similarity
                .similarity(&lower, &record.original_text.to_lowercase());
            if score >= FEEDBACK_OVERRIDE_THRESHOLD {
                for med in &record.corrected_medicines {
                    if name_ratio(&lower, &med.medication.to_lowercase()) > FEEDBACK_NAME_THRESHOLD {
                        return Some(Some(med.medication.clone()));
                    }
                }
                return Some(None);
            }
        }
        None
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FeedbackRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Name similarity for the suggestion check, on a 0-100 scale. Bigram
/// overlap keeps a name with an attached dose form ("paracetamol tab"
/// against "Paracetamol") above the threshold; edit distance does not.
fn name_ratio(a: &str, b: &str) -> f64 {
    sorensen_dice(a, b) * 100.0
}
