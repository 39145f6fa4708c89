//! Reference medicine vocabulary: loading and name resolution.
//!
//! The vocabulary is loaded once at process start and read-only afterward.
//! Resolution is exact case-insensitive lookup first, then fuzzy edit
//! similarity against every reference name on a 0–100 scale.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Minimum similarity for admitting a candidate in the note pipeline.
pub const NOTE_ADMISSION_THRESHOLD: f64 = 70.0;

/// Minimum similarity for admitting a candidate in the medicine-service
/// path. Looser than the note pipeline's threshold; the two call sites in
/// the source system diverged and the behavior difference is kept.
pub const SERVICE_ADMISSION_THRESHOLD: f64 = 65.0;

lazy_static! {
    // Leading alphabetic medicine name in a strength field, e.g.
    // "Paracetamol (500mg)" or "Cetirizine 10mg".
    static ref STRENGTH_NAME: Regex =
        Regex::new(r"^([A-Za-z\s]+?)(?:\s*\(?\d.*|\s+\d.*|$)").expect("strength-name pattern");
}

/// One record of the reference medicine data file.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
}

/// Best vocabulary match for a candidate name.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyMatch {
    /// Canonical (original-cased) reference name.
    pub canonical: String,
    /// Similarity score on a 0–100 scale; 100 means exact.
    pub similarity: f64,
}

/// Immutable-after-load reference vocabulary of canonical medicine names.
#[derive(Debug, Clone)]
pub struct MedicineVocabulary {
    /// Sorted unique canonical names; iteration order for fuzzy ties.
    names: Vec<String>,
    /// Lowercase name → index into `names`, for exact lookup.
    lower_index: HashMap<String, usize>,
}

impl MedicineVocabulary {
    /// Build from an explicit name list (deduplicated and sorted).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.into().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();

        let mut lower_index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // First entry in sorted order wins for case-colliding names.
            lower_index.entry(name.to_lowercase()).or_insert(i);
        }

        Self { names, lower_index }
    }

    /// The small fixed list used when the reference data cannot be read.
    pub fn fallback() -> Self {
        Self::from_names([
            "Paracetamol",
            "Vitamin C",
            "Amoxicillin",
            "Ibuprofen",
            "Diphtheria Antitoxin",
        ])
    }

    /// Build from parsed reference records.
    ///
    /// Each record contributes its `name` and, when present, the leading
    /// alphabetic medicine name of its `strength` field.
    pub fn from_records(records: &[VocabRecord]) -> Self {
        let mut names = Vec::with_capacity(records.len());
        for record in records {
            if let Some(name) = &record.name {
                names.push(name.trim().to_string());
            }
            if let Some(strength) = &record.strength {
                if let Some(caps) = STRENGTH_NAME.captures(strength.trim()) {
                    let core = caps[1].trim().to_string();
                    if !core.is_empty() {
                        names.push(core);
                    }
                }
            }
        }
        Self::from_names(names)
    }

    /// Load the reference data file, degrading to the fallback list when
    /// the file is missing or malformed. Startup never fails on bad data;
    /// availability is preferred over completeness here.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %path.display(), %err, "medicine data unreadable, using fallback list");
                return Self::fallback();
            }
        };
        match serde_json::from_str::<Vec<VocabRecord>>(&data) {
            Ok(records) => {
                let vocab = Self::from_records(&records);
                debug!(count = vocab.len(), "loaded medicine vocabulary");
                vocab
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "medicine data malformed, using fallback list");
                Self::fallback()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All canonical names in reference iteration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a candidate name against the vocabulary.
    ///
    /// Exact case-insensitive hits return the original-cased entry at
    /// similarity 100. Otherwise the best fuzzy score over the whole
    /// reference wins; ties go to the first name in reference order. The
    /// caller applies its admission threshold to the returned similarity.
    pub fn resolve(&self, candidate: &str) -> Option<VocabularyMatch> {
        let candidate = candidate.trim();
        if candidate.is_empty() || self.names.is_empty() {
            return None;
        }

        let lower = candidate.to_lowercase();
        if let Some(&i) = self.lower_index.get(&lower) {
            return Some(VocabularyMatch {
                canonical: self.names[i].clone(),
                similarity: 100.0,
            });
        }

        let mut best: Option<VocabularyMatch> = None;
        for name in &self.names {
            let similarity = ratio(&lower, &name.to_lowercase());
            let better = match &best {
                Some(b) => similarity > b.similarity,
                None => true,
            };
            if better {
                best = Some(VocabularyMatch {
                    canonical: name.clone(),
                    similarity,
                });
            }
        }

        if let Some(b) = &best {
            debug!(candidate, canonical = %b.canonical, similarity = b.similarity, "fuzzy vocabulary match");
        }
        best
    }
}

/// Normalized edit similarity on a 0–100 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}
