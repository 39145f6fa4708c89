//! Tagged text spans produced by the entity tagger.

use serde::{Deserialize, Serialize};

/// Category assigned to a span by the sequence tagger.
///
/// Aliases match the raw label set emitted by the biomedical tagger so its
/// output deserializes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Medication,
    Chemical,
    #[serde(alias = "Disease_disorder")]
    Disease,
    #[serde(alias = "Sign_symptom")]
    Symptom,
    #[serde(alias = "Diagnostic_procedure")]
    Procedure,
    Dosage,
    Frequency,
    Duration,
    /// Any label the pipeline does not act on.
    #[serde(other)]
    Other,
}

impl EntityKind {
    /// Kinds that name a drug and enter vocabulary resolution.
    pub fn is_medication_like(self) -> bool {
        matches!(self, EntityKind::Medication | EntityKind::Chemical)
    }

    /// Kinds carrying prescription detail that a medication span can claim.
    pub fn is_detail(self) -> bool {
        matches!(
            self,
            EntityKind::Dosage | EntityKind::Frequency | EntityKind::Duration
        )
    }
}

/// A tagged span over the normalized input text.
///
/// Offsets are byte indices into the exact text handed to the tagger.
/// Invariant for present offsets: `start <= end <= text.len()`. The tagger
/// may omit offsets for a token; such a span never merges with a neighbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Surface text of the span.
    pub text: String,
    /// Tagger-assigned category.
    pub kind: EntityKind,
    /// Tagger confidence in [0, 1].
    pub confidence: f64,
    /// Start byte offset, if the tagger reported one.
    pub start: Option<usize>,
    /// End byte offset (exclusive), if the tagger reported one.
    pub end: Option<usize>,
}

impl Entity {
    /// Create a span with known offsets.
    pub fn new(
        text: impl Into<String>,
        kind: EntityKind,
        confidence: f64,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            confidence,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether this span carries the subword continuation marker.
    pub fn is_continuation(&self) -> bool {
        self.text.starts_with("##")
    }
}
