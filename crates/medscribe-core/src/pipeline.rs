//! The note-extraction pipeline and the medicine-service operations.
//!
//! The pipeline reconciles three imperfect sources into one structured
//! record: tagged entity spans, fuzzy vocabulary matching, and regex
//! detail extraction. Model-backed steps (spelling, grammar, tagging,
//! abstractive summary) sit behind traits so the library never links an
//! inference runtime.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::advice::extract_general_advice;
use crate::details::DetailExtractor;
use crate::feedback::FeedbackStore;
use crate::models::{
    Entity, EntityKind, FeedbackRecord, NoteExtraction, PrescriptionRecord, FIELD_MISSING,
};
use crate::summary::SummaryComposer;
use crate::text::{normalize_spoken_numbers, number_word_alternation, words_to_number, SpanMerger};
use crate::vocab::{
    ratio, MedicineVocabulary, NOTE_ADMISSION_THRESHOLD, SERVICE_ADMISSION_THRESHOLD,
};

/// How many entities after a medication are scanned for tagged details.
const DETAIL_SCAN_AHEAD: usize = 5;

/// Maximum byte distance between a medication's end and a tagged detail's
/// start for the detail to be claimed.
const DETAIL_MAX_DISTANCE: isize = 70;

/// Fuzzy threshold for the keyword fallback used without a tagger.
const BASIC_MATCH_THRESHOLD: f64 = 60.0;

lazy_static! {
    static ref TAGGED_DOSAGE: Regex = {
        let words = number_word_alternation();
        Regex::new(&format!(
            r"((?:{words}|\d+(?:\.\d+)?)(?:\s+(?:{words}))*)?\s*(mg|ml|g|units?|milligrams|grams|liters?|tablet|pill|capsule|spoon(?:ful)?)?"
        ))
        .expect("tagged-dosage pattern")
    };
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input text is empty")]
    EmptyInput,
    #[error("medicine vocabulary is not loaded")]
    VocabularyUnavailable,
    #[error("collaborator failure: {0}")]
    Upstream(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Spelling correction over the raw note text.
pub trait SpellCorrector: Send + Sync {
    fn correct_spelling(&self, text: &str) -> anyhow::Result<String>;
}

/// Grammar correction over the spell-corrected text.
pub trait GrammarCorrector: Send + Sync {
    fn correct_grammar(&self, text: &str) -> anyhow::Result<String>;
}

/// Abstractive summarizer, used only when a note yields neither symptoms
/// nor diseases.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> anyhow::Result<String>;
}

/// Sequence tagger producing raw (possibly fragmented) entity spans.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<Entity>>;
}

/// Identity corrector for deployments without correction models.
pub struct PassthroughCorrector;

impl SpellCorrector for PassthroughCorrector {
    fn correct_spelling(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

impl GrammarCorrector for PassthroughCorrector {
    fn correct_grammar(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Summarizer that produces no overview sentence.
pub struct NoSummarizer;

impl Summarizer for NoSummarizer {
    fn summarize(&self, _text: &str) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Everything the assembler derives from merged entity spans.
#[derive(Debug, Default)]
pub struct AssembledNote {
    pub symptoms: Vec<String>,
    pub diseases: Vec<String>,
    pub procedures: Vec<String>,
    pub prescriptions: Vec<PrescriptionRecord>,
}

/// Turns merged entity spans into canonical prescription records.
pub struct PrescriptionAssembler<'a> {
    vocabulary: &'a MedicineVocabulary,
}

impl<'a> PrescriptionAssembler<'a> {
    pub fn new(vocabulary: &'a MedicineVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Assemble note facts from merged spans over `text`.
    ///
    /// Malformed spans (missing offsets, out-of-range indices) degrade to
    /// whole-text detail extraction; assembly itself never fails.
    pub fn assemble(&self, text: &str, entities: &[Entity]) -> AssembledNote {
        let mut note = AssembledNote {
            symptoms: collect_kind(entities, EntityKind::Symptom, |t| {
                !t.to_lowercase().contains("recovery")
            }),
            diseases: collect_kind(entities, EntityKind::Disease, |_| true),
            procedures: collect_kind(entities, EntityKind::Procedure, |_| true),
            ..AssembledNote::default()
        };

        if text.to_lowercase().contains("check your body temperature")
            && !note.procedures.iter().any(|p| p == "Body temperature check")
        {
            note.procedures.push("Body temperature check".to_string());
        }

        let mut consumed_names: Vec<String> = Vec::new();
        let mut consumed_details: Vec<usize> = Vec::new();

        for (i, ent) in entities.iter().enumerate() {
            if !ent.kind.is_medication_like() {
                continue;
            }
            let raw_name = ent.text.trim();
            if consumed_names.iter().any(|n| n == &raw_name.to_lowercase()) {
                continue;
            }

            let Some(matched) = self.vocabulary.resolve(raw_name) else {
                continue;
            };
            if matched.similarity < NOTE_ADMISSION_THRESHOLD {
                debug!(
                    candidate = raw_name,
                    similarity = matched.similarity,
                    "candidate below admission threshold"
                );
                continue;
            }
            let canonical_lower = matched.canonical.to_lowercase();
            if consumed_names.iter().any(|n| n == &canonical_lower) {
                continue;
            }
            consumed_names.push(canonical_lower);

            let mut record = PrescriptionRecord::new(&matched.canonical);
            self.claim_tagged_details(entities, i, &mut record, &mut consumed_details);
            self.fill_from_regex(text, ent, raw_name, &mut record);
            note.prescriptions.push(record);
        }

        note
    }

    /// Scan the next few entities for tagged dosage/frequency/duration
    /// spans close enough to this medication. Claimed spans are marked so
    /// a later medication cannot claim them again.
    fn claim_tagged_details(
        &self,
        entities: &[Entity],
        med_index: usize,
        record: &mut PrescriptionRecord,
        consumed: &mut Vec<usize>,
    ) {
        let med = &entities[med_index];
        let Some(med_end) = med.end else {
            return;
        };

        let upper = (med_index + 1 + DETAIL_SCAN_AHEAD).min(entities.len());
        for j in med_index + 1..upper {
            let other = &entities[j];
            if consumed.contains(&j) {
                continue;
            }
            let Some(other_start) = other.start else {
                continue;
            };
            if other_start as isize - med_end as isize > DETAIL_MAX_DISTANCE {
                continue;
            }

            if other.kind == EntityKind::Dosage && record.dosage == FIELD_MISSING {
                record.dosage = normalize_tagged_dosage(&other.text);
                consumed.push(j);
            } else if other.kind == EntityKind::Frequency && record.frequency == FIELD_MISSING {
                record.frequency = other.text.clone();
                consumed.push(j);
            } else if other.kind == EntityKind::Duration && record.duration == FIELD_MISSING {
                record.duration = other.text.clone();
                consumed.push(j);
            }
        }
    }

    /// Regex fallback for any field the tagger did not supply. Timing has
    /// no tagged counterpart and always comes from here.
    fn fill_from_regex(
        &self,
        text: &str,
        med: &Entity,
        raw_name: &str,
        record: &mut PrescriptionRecord,
    ) {
        let details = match (med.start, med.end) {
            (Some(start), Some(end)) => DetailExtractor::extract_near(text, start, end, raw_name),
            _ => DetailExtractor::extract_all(text),
        };

        if record.dosage == FIELD_MISSING && details.dosage != FIELD_MISSING {
            record.dosage = details.dosage;
        }
        if record.frequency == FIELD_MISSING && details.frequency != FIELD_MISSING {
            record.frequency = details.frequency;
        }
        if record.duration == FIELD_MISSING && details.duration != FIELD_MISSING {
            record.duration = details.duration;
        }
        if record.timing == FIELD_MISSING && details.timing != FIELD_MISSING {
            record.timing = details.timing;
        }
    }
}

/// Normalize the text of a tagged dosage span: digitize its number run
/// and keep a recognized unit. Unparseable spans pass through unchanged.
fn normalize_tagged_dosage(text: &str) -> String {
    let lower = text.to_lowercase();
    if let Some(caps) = TAGGED_DOSAGE.captures(&lower) {
        if let Some(num) = caps.get(1).filter(|m| !m.as_str().trim().is_empty()) {
            let num_part = num.as_str().trim();
            let converted = words_to_number(num_part).unwrap_or_else(|| num_part.to_string());
            return match caps.get(2) {
                Some(unit) => format!("{converted} {}", unit.as_str().trim()),
                None => converted,
            };
        }
    }
    text.to_string()
}

fn collect_kind(
    entities: &[Entity],
    kind: EntityKind,
    keep: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ent in entities.iter().filter(|e| e.kind == kind) {
        let text = ent.text.trim().to_string();
        if keep(&text) && !out.contains(&text) {
            out.push(text);
        }
    }
    out
}

/// Full clinical-note extraction: correction, normalization, tagging,
/// assembly, advice, and summary.
pub struct NotePipeline {
    vocabulary: Arc<MedicineVocabulary>,
    spell: Box<dyn SpellCorrector>,
    grammar: Box<dyn GrammarCorrector>,
    summarizer: Box<dyn Summarizer>,
    tagger: Box<dyn EntityTagger>,
}

impl NotePipeline {
    pub fn new(
        vocabulary: Arc<MedicineVocabulary>,
        spell: Box<dyn SpellCorrector>,
        grammar: Box<dyn GrammarCorrector>,
        summarizer: Box<dyn Summarizer>,
        tagger: Box<dyn EntityTagger>,
    ) -> Self {
        Self {
            vocabulary,
            spell,
            grammar,
            summarizer,
            tagger,
        }
    }

    /// Run the whole pipeline over one note.
    pub fn extract(&self, text: &str) -> PipelineResult<NoteExtraction> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        if self.vocabulary.is_empty() {
            return Err(PipelineError::VocabularyUnavailable);
        }

        let spelled = self.spell.correct_spelling(text)?;
        let corrected = self.grammar.correct_grammar(&spelled)?;
        let processed = normalize_spoken_numbers(&corrected);
        debug!(%processed, "pre-processed note text");

        let entities = SpanMerger::merge(self.tagger.tag(&processed)?);
        let note = PrescriptionAssembler::new(&self.vocabulary).assemble(&processed, &entities);
        let advice = extract_general_advice(&processed);

        let overview = if note.symptoms.is_empty() && note.diseases.is_empty() {
            Some(self.summarizer.summarize(&processed)?)
        } else {
            None
        };
        let summary = SummaryComposer::compose(
            &note.symptoms,
            &note.diseases,
            &note.procedures,
            &note.prescriptions,
            &advice,
            overview.as_deref(),
        );

        info!(
            prescriptions = note.prescriptions.len(),
            symptoms = note.symptoms.len(),
            "note extraction complete"
        );

        Ok(NoteExtraction {
            entities,
            symptoms: note.symptoms,
            diseases: note.diseases,
            procedures: note.procedures,
            prescriptions: note.prescriptions,
            advice,
            summary,
        })
    }
}

/// The lighter medicine-service path: extraction from short texts,
/// name suggestion, and feedback capture.
pub struct MedicineService {
    vocabulary: Arc<MedicineVocabulary>,
    feedback: Arc<FeedbackStore>,
    tagger: Option<Box<dyn EntityTagger>>,
}

impl MedicineService {
    pub fn new(
        vocabulary: Arc<MedicineVocabulary>,
        feedback: Arc<FeedbackStore>,
        tagger: Option<Box<dyn EntityTagger>>,
    ) -> Self {
        Self {
            vocabulary,
            feedback,
            tagger,
        }
    }

    /// Extract prescriptions from a short text, preferring a stored user
    /// correction, then the tagger, then plain keyword matching.
    pub fn extract_medicines(&self, text: &str) -> PipelineResult<Vec<PrescriptionRecord>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        if self.vocabulary.is_empty() {
            return Err(PipelineError::VocabularyUnavailable);
        }

        if let Some(corrected) = self.feedback.find_override(text) {
            return Ok(corrected);
        }

        match &self.tagger {
            Some(tagger) => self.extract_with_tagger(tagger.as_ref(), text),
            None => Ok(self.extract_basic(text)),
        }
    }

    fn extract_with_tagger(
        &self,
        tagger: &dyn EntityTagger,
        text: &str,
    ) -> PipelineResult<Vec<PrescriptionRecord>> {
        let entities = SpanMerger::merge(tagger.tag(text)?);
        let details = DetailExtractor::extract_all(text);

        let mut records: Vec<PrescriptionRecord> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for ent in &entities {
            if !ent.kind.is_medication_like() {
                continue;
            }
            let Some(matched) = self.vocabulary.resolve(ent.text.trim()) else {
                continue;
            };
            if matched.similarity < SERVICE_ADMISSION_THRESHOLD {
                continue;
            }
            let lower = matched.canonical.to_lowercase();
            if seen.contains(&lower) {
                continue;
            }
            seen.push(lower);

            let mut record = PrescriptionRecord::new(&matched.canonical);
            record.dosage = details.dosage.clone();
            record.frequency = details.frequency.clone();
            record.duration = details.duration.clone();
            record.timing = details.timing.clone();
            records.push(record);
        }
        Ok(records)
    }

    /// Keyword fallback when no tagger is configured: longest names are
    /// tried first so "Vitamin C" wins over a hypothetical "Vitamin".
    fn extract_basic(&self, text: &str) -> Vec<PrescriptionRecord> {
        let lower = text.to_lowercase();
        let details = DetailExtractor::extract_all(text);

        let mut names: Vec<&String> = self.vocabulary.names().iter().collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.len()));

        let mut records: Vec<PrescriptionRecord> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for name in names {
            let name_lower = name.to_lowercase();
            if seen.contains(&name_lower) {
                continue;
            }
            let hit = lower.contains(&name_lower)
                || ratio(&name_lower, &lower) > BASIC_MATCH_THRESHOLD;
            if hit {
                seen.push(name_lower);
                let mut record = PrescriptionRecord::new(name);
                record.dosage = details.dosage.clone();
                record.frequency = details.frequency.clone();
                record.duration = details.duration.clone();
                record.timing = details.timing.clone();
                records.push(record);
            }
        }
        records
    }

    /// Suggest a canonical medicine name for a partial or misheard input.
    /// Returns `"N/A"` when nothing clears the thresholds.
    pub fn suggest_medicine(&self, input_text: &str) -> PipelineResult<String> {
        let input_text = input_text.trim();
        if input_text.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        if self.vocabulary.is_empty() {
            return Err(PipelineError::VocabularyUnavailable);
        }

        if let Some(outcome) = self.feedback.suggest(input_text) {
            return Ok(outcome.unwrap_or_else(|| FIELD_MISSING.to_string()));
        }

        match &self.tagger {
            Some(tagger) => {
                let entities = SpanMerger::merge(tagger.tag(input_text)?);
                let candidate = entities
                    .iter()
                    .find(|e| e.kind.is_medication_like())
                    .map(|e| e.text.trim().to_string());
                if let Some(candidate) = candidate {
                    if let Some(matched) = self.vocabulary.resolve(&candidate) {
                        if matched.similarity >= SERVICE_ADMISSION_THRESHOLD {
                            return Ok(matched.canonical);
                        }
                    }
                }
                Ok(FIELD_MISSING.to_string())
            }
            None => {
                let lower = input_text.to_lowercase();
                let mut best: Option<(f64, &String)> = None;
                for name in self.vocabulary.names() {
                    let score = ratio(&lower, &name.to_lowercase());
                    if score > BASIC_MATCH_THRESHOLD
                        && best.map_or(true, |(b, _)| score > b)
                    {
                        best = Some((score, name));
                    }
                }
                Ok(best
                    .map(|(_, name)| name.clone())
                    .unwrap_or_else(|| FIELD_MISSING.to_string()))
            }
        }
    }

    /// Store a correction for future extractions.
    pub fn record_feedback(&self, feedback: FeedbackRecord) -> PipelineResult<()> {
        if feedback.original_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        self.feedback.record(feedback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTagger(Vec<Entity>);

    impl EntityTagger for FixedTagger {
        fn tag(&self, _text: &str) -> anyhow::Result<Vec<Entity>> {
            Ok(self.0.clone())
        }
    }

    struct FailingTagger;

    impl EntityTagger for FailingTagger {
        fn tag(&self, _text: &str) -> anyhow::Result<Vec<Entity>> {
            anyhow::bail!("model backend offline")
        }
    }

    fn vocab() -> Arc<MedicineVocabulary> {
        Arc::new(MedicineVocabulary::from_names([
            "Paracetamol",
            "Ibuprofen",
            "Vitamin C",
        ]))
    }

    fn pipeline(entities: Vec<Entity>) -> NotePipeline {
        NotePipeline::new(
            vocab(),
            Box::new(PassthroughCorrector),
            Box::new(PassthroughCorrector),
            Box::new(NoSummarizer),
            Box::new(FixedTagger(entities)),
        )
    }

    fn service(entities: Option<Vec<Entity>>) -> MedicineService {
        MedicineService::new(
            vocab(),
            Arc::new(FeedbackStore::new()),
            entities.map(|e| Box::new(FixedTagger(e)) as Box<dyn EntityTagger>),
        )
    }

    #[test]
    fn test_empty_input_rejected() {
        let p = pipeline(vec![]);
        assert!(matches!(p.extract("   "), Err(PipelineError::EmptyInput)));

        let s = service(None);
        assert!(matches!(
            s.extract_medicines(""),
            Err(PipelineError::EmptyInput)
        ));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let s = MedicineService::new(
            Arc::new(MedicineVocabulary::from_names(Vec::<String>::new())),
            Arc::new(FeedbackStore::new()),
            None,
        );
        assert!(matches!(
            s.extract_medicines("paracetamol"),
            Err(PipelineError::VocabularyUnavailable)
        ));
    }

    #[test]
    fn test_tagger_failure_propagates() {
        let p = NotePipeline::new(
            vocab(),
            Box::new(PassthroughCorrector),
            Box::new(PassthroughCorrector),
            Box::new(NoSummarizer),
            Box::new(FailingTagger),
        );
        assert!(matches!(
            p.extract("take paracetamol"),
            Err(PipelineError::Upstream(_))
        ));
    }

    #[test]
    fn test_assembler_resolves_and_fills_details() {
        let text = "take paracetamol 650 mg twice a day for 5 days";
        let start = text.find("paracetamol").unwrap();
        let entities = vec![Entity::new(
            "paracetamol",
            EntityKind::Medication,
            0.99,
            start,
            start + "paracetamol".len(),
        )];

        let v = vocab();
        let note = PrescriptionAssembler::new(&v).assemble(text, &entities);
        assert_eq!(note.prescriptions.len(), 1);
        let rx = &note.prescriptions[0];
        assert_eq!(rx.medication, "Paracetamol");
        assert_eq!(rx.dosage, "650 mg");
        assert_eq!(rx.frequency, "twice a day");
        assert_eq!(rx.duration, "5 days");
    }

    #[test]
    fn test_assembler_prefers_tagged_details() {
        let entities = vec![
            Entity::new("paracetamol", EntityKind::Medication, 0.99, 5, 16),
            Entity::new("six fifty mg", EntityKind::Dosage, 0.95, 17, 29),
        ];
        let v = vocab();
        let note = PrescriptionAssembler::new(&v)
            .assemble("take paracetamol six fifty mg", &entities);

        assert_eq!(note.prescriptions[0].dosage, "650 mg");
    }

    #[test]
    fn test_tagged_frequency_and_duration_claimed() {
        // "twice daily" is not a phrase the pattern cascade produces, and
        // a claimed duration carries the span text verbatim (no digit
        // conversion), so both fields can only come from the tagged spans.
        let entities = vec![
            Entity::new("paracetamol", EntityKind::Medication, 0.99, 5, 16),
            Entity::new("twice daily", EntityKind::Frequency, 0.95, 17, 28),
            Entity::new("ten days", EntityKind::Duration, 0.95, 33, 41),
        ];
        let v = vocab();
        let note = PrescriptionAssembler::new(&v)
            .assemble("take paracetamol twice daily for ten days", &entities);

        assert_eq!(note.prescriptions.len(), 1);
        let rx = &note.prescriptions[0];
        assert_eq!(rx.frequency, "twice daily");
        assert_eq!(rx.duration, "ten days");
    }

    #[test]
    fn test_tagged_detail_consumed_once() {
        // The dosage span sits within claiming distance of both drugs but
        // its text does not appear in the note, so the regex fallback
        // cannot re-derive it for the second drug.
        let entities = vec![
            Entity::new("paracetamol", EntityKind::Medication, 0.99, 0, 11),
            Entity::new("ibuprofen", EntityKind::Medication, 0.99, 16, 25),
            Entity::new("650 mg", EntityKind::Dosage, 0.95, 26, 32),
        ];
        let v = vocab();
        let note =
            PrescriptionAssembler::new(&v).assemble("paracetamol and ibuprofen", &entities);

        assert_eq!(note.prescriptions.len(), 2);
        assert_eq!(note.prescriptions[0].dosage, "650 mg");
        assert_eq!(note.prescriptions[1].dosage, FIELD_MISSING);
    }

    #[test]
    fn test_duplicate_canonical_name_collapsed() {
        let entities = vec![
            Entity::new("paracetamol", EntityKind::Medication, 0.99, 0, 11),
            Entity::new("paracetamoll", EntityKind::Chemical, 0.9, 30, 42),
        ];
        let v = vocab();
        let note = PrescriptionAssembler::new(&v).assemble(
            "paracetamol 650 mg and more paracetamoll later",
            &entities,
        );
        assert_eq!(note.prescriptions.len(), 1);
    }

    #[test]
    fn test_far_tagged_detail_not_claimed() {
        let entities = vec![
            Entity::new("paracetamol", EntityKind::Medication, 0.99, 0, 11),
            Entity::new("5 days", EntityKind::Duration, 0.9, 200, 206),
        ];
        let v = vocab();
        let note = PrescriptionAssembler::new(&v).assemble("paracetamol", &entities);
        assert_eq!(note.prescriptions[0].duration, FIELD_MISSING);
    }

    #[test]
    fn test_symptom_recovery_filtered_and_temperature_heuristic() {
        let entities = vec![
            Entity::new("fever", EntityKind::Symptom, 0.9, 0, 5),
            Entity::new("signs of recovery", EntityKind::Symptom, 0.9, 10, 27),
        ];
        let v = vocab();
        let note = PrescriptionAssembler::new(&v)
            .assemble("fever and signs of recovery, check your body temperature", &entities);

        assert_eq!(note.symptoms, vec!["fever"]);
        assert_eq!(note.procedures, vec!["Body temperature check"]);
    }

    #[test]
    fn test_end_to_end_note_extraction() {
        let text = "Take Paracetamol six fifty mg twice a day for five days";
        // Offsets refer to the normalized text, where "six fifty" has
        // become "six hundred fifty".
        let normalized = normalize_spoken_numbers(text);
        let start = normalized.find("Paracetamol").unwrap();
        let entities = vec![Entity::new(
            "Paracetamol",
            EntityKind::Medication,
            0.99,
            start,
            start + "Paracetamol".len(),
        )];

        let result = pipeline(entities).extract(text).unwrap();
        assert_eq!(result.prescriptions.len(), 1);
        let rx = &result.prescriptions[0];
        assert_eq!(rx.medication, "Paracetamol");
        assert_eq!(rx.dosage, "650 mg");
        assert_eq!(rx.frequency, "twice a day");
        assert_eq!(rx.duration, "5 days");
        assert!(result
            .summary
            .contains("Prescribed medications: Paracetamol 650 mg twice a day for 5 days"));
    }

    #[test]
    fn test_service_feedback_override_wins() {
        let feedback = Arc::new(FeedbackStore::new());
        let mut corrected = PrescriptionRecord::new("Paracetamol");
        corrected.dosage = "500 mg".into();
        feedback.record(FeedbackRecord {
            original_text: "take crocin at night".into(),
            corrected_medicines: vec![corrected],
        });

        let s = MedicineService::new(vocab(), feedback, None);
        let records = s.extract_medicines("take crocin at night").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dosage, "500 mg");
    }

    #[test]
    fn test_service_basic_containment() {
        let s = service(None);
        let records = s.extract_medicines("patient took vitamin c this morning").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].medication, "Vitamin C");
    }

    #[test]
    fn test_service_tagger_path() {
        let entities = vec![Entity::new(
            "ibuprofenn",
            EntityKind::Chemical,
            0.9,
            5,
            15,
        )];
        let s = service(Some(entities));
        let records = s.extract_medicines("take ibuprofenn 400 mg").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].medication, "Ibuprofen");
        assert_eq!(records[0].dosage, "400 mg");
    }

    #[test]
    fn test_suggest_prefers_feedback_then_tagger() {
        let feedback = Arc::new(FeedbackStore::new());
        feedback.record(FeedbackRecord {
            original_text: "paracetamol tab".into(),
            corrected_medicines: vec![PrescriptionRecord::new("Paracetamol")],
        });
        let s = MedicineService::new(vocab(), feedback, None);
        assert_eq!(s.suggest_medicine("paracetamol tab").unwrap(), "Paracetamol");
    }

    #[test]
    fn test_suggest_basic_fuzzy() {
        let s = service(None);
        assert_eq!(s.suggest_medicine("ibuprofin").unwrap(), "Ibuprofen");
        assert_eq!(s.suggest_medicine("zzzzzz").unwrap(), FIELD_MISSING);
    }

    #[test]
    fn test_record_feedback_rejects_empty_text() {
        let s = service(None);
        let result = s.record_feedback(FeedbackRecord {
            original_text: "  ".into(),
            corrected_medicines: vec![],
        });
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }
}
