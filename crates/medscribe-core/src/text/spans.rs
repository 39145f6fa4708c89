//! Merging of fragmented tagger spans.
//!
//! The sequence tagger emits one span per token, so a single drug name
//! arrives as a head token plus `##` continuations, and multi-word entities
//! arrive as several same-kind spans. The merger collapses both into
//! logical entities while keeping character offsets intact.

use tracing::debug;

use crate::models::{Entity, EntityKind};

/// Maximum character gap between same-kind spans that still merge.
const SAME_KIND_MAX_GAP: isize = 2;

/// Merges continuation fragments and adjacent same-kind spans.
pub struct SpanMerger;

impl SpanMerger {
    /// Collapse raw tagger spans into logical entities.
    ///
    /// Input spans are sorted by start offset first; output preserves that
    /// order. A span missing either offset never merges, in either
    /// direction, so a dropped offset cannot corrupt a neighbor's range.
    ///
    /// The confidence of a merged span is re-averaged pairwise for each
    /// absorbed fragment rather than computed as a true mean. Downstream
    /// admission thresholds were tuned against that behavior, so it is
    /// preserved.
    pub fn merge(mut entities: Vec<Entity>) -> Vec<Entity> {
        entities.sort_by_key(|e| e.start.unwrap_or(0));

        let mut merged: Vec<Entity> = Vec::with_capacity(entities.len());
        let mut current: Option<Entity> = None;

        for ent in entities {
            match current.as_mut() {
                Some(cur) if Self::can_merge(cur, &ent) => {
                    if ent.is_continuation() {
                        cur.text.push_str(&ent.text[2..]);
                    } else {
                        cur.text.push(' ');
                        cur.text.push_str(&ent.text);
                    }
                    cur.end = ent.end;
                    cur.confidence = (cur.confidence + ent.confidence) / 2.0;
                    debug!(text = %cur.text, kind = ?cur.kind, "absorbed span fragment");
                }
                _ => {
                    if let Some(done) = current.take() {
                        merged.push(done);
                    }
                    current = Some(ent);
                }
            }
        }

        if let Some(done) = current {
            merged.push(done);
        }

        merged
    }

    fn can_merge(cur: &Entity, next: &Entity) -> bool {
        // Spans without offsets are unmergeable on both sides.
        let (Some(cur_end), Some(next_start), Some(_)) = (cur.end, next.start, next.end) else {
            return false;
        };

        if next.is_continuation() {
            return true;
        }

        cur.kind == next.kind
            && cur.kind != EntityKind::Other
            && (next_start as isize - cur_end as isize) <= SAME_KIND_MAX_GAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ent(text: &str, kind: EntityKind, conf: f64, start: usize, end: usize) -> Entity {
        Entity::new(text, kind, conf, start, end)
    }

    #[test]
    fn test_subword_continuation_merges() {
        let merged = SpanMerger::merge(vec![
            ent("paraceta", EntityKind::Medication, 0.9, 5, 13),
            ent("##mol", EntityKind::Medication, 0.8, 13, 16),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "paracetamol");
        assert_eq!(merged[0].start, Some(5));
        assert_eq!(merged[0].end, Some(16));
    }

    #[test]
    fn test_same_kind_small_gap_merges_with_space() {
        let merged = SpanMerger::merge(vec![
            ent("chest", EntityKind::Symptom, 0.9, 0, 5),
            ent("pain", EntityKind::Symptom, 0.9, 6, 10),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "chest pain");
        assert_eq!(merged[0].end, Some(10));
    }

    #[test]
    fn test_different_kinds_do_not_merge() {
        let merged = SpanMerger::merge(vec![
            ent("fever", EntityKind::Symptom, 0.9, 0, 5),
            ent("aspirin", EntityKind::Medication, 0.9, 6, 13),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_wide_gap_does_not_merge() {
        let merged = SpanMerger::merge(vec![
            ent("fever", EntityKind::Symptom, 0.9, 0, 5),
            ent("cough", EntityKind::Symptom, 0.9, 20, 25),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_chained_confidence_average() {
        // (0.8 + 0.6)/2 = 0.7, then (0.7 + 0.9)/2 = 0.8, which is not
        // the true mean of the three (0.7666...).
        let merged = SpanMerger::merge(vec![
            ent("a", EntityKind::Symptom, 0.8, 0, 1),
            ent("b", EntityKind::Symptom, 0.6, 2, 3),
            ent("c", EntityKind::Symptom, 0.9, 4, 5),
        ]);

        assert_eq!(merged.len(), 1);
        assert!((merged[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let merged = SpanMerger::merge(vec![
            ent("pain", EntityKind::Symptom, 0.9, 6, 10),
            ent("chest", EntityKind::Symptom, 0.9, 0, 5),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "chest pain");
    }

    #[test]
    fn test_missing_offsets_never_merge() {
        let orphan = Entity {
            text: "pain".into(),
            kind: EntityKind::Symptom,
            confidence: 0.9,
            start: None,
            end: None,
        };
        let merged = SpanMerger::merge(vec![
            ent("chest", EntityKind::Symptom, 0.9, 0, 5),
            orphan,
            ent("ache", EntityKind::Symptom, 0.9, 5, 9),
        ]);

        // The offset-less span splits the sequence: nothing merges through it.
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_output_sorted_and_spans_cover_inputs() {
        let inputs = vec![
            ent("amoxi", EntityKind::Medication, 0.9, 10, 15),
            ent("##cillin", EntityKind::Medication, 0.9, 15, 21),
            ent("fever", EntityKind::Symptom, 0.9, 0, 5),
        ];
        let merged = SpanMerger::merge(inputs);

        let starts: Vec<usize> = merged.iter().filter_map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);

        let med = merged.iter().find(|e| e.kind == EntityKind::Medication).unwrap();
        assert_eq!((med.start, med.end), (Some(10), Some(21)));
    }

    #[test]
    fn test_empty_input() {
        assert!(SpanMerger::merge(Vec::new()).is_empty());
    }
}
