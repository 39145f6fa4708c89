//! Medscribe Core Library
//!
//! Extraction of structured medical information from free-text clinical
//! narratives: symptoms, diseases, procedures, medications with
//! dosage/frequency/duration/timing, general advice, and a composed
//! prose summary.
//!
//! # Architecture
//!
//! ```text
//! Raw note text
//!      │
//!      ▼
//! Spell correction → Grammar correction → Spoken-number normalization
//!      │
//!      ▼
//! Entity tagging → Span merging (## continuations, same-kind gaps)
//!      │
//!      ▼
//! Prescription assembly
//!   ├─ vocabulary resolution (exact → fuzzy, admission threshold)
//!   ├─ tagged detail claiming (forward window, consume-once)
//!   └─ regex detail fallback (windowed dosage/frequency/duration/timing)
//!      │
//!      ▼
//! Advice extraction → Summary composition → NoteExtraction
//! ```
//!
//! Model-backed steps (spelling, grammar, tagging, abstractive summary)
//! are trait seams; the library itself never loads a model.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Entity, PrescriptionRecord, NoteExtraction)
//! - [`text`]: Spoken-number normalization and span merging
//! - [`vocab`]: Reference vocabulary loading and fuzzy name resolution
//! - [`details`]: Regex extraction of prescription detail phrases
//! - [`advice`]: Canonical advice sentence detection
//! - [`summary`]: Structured summary composition
//! - [`feedback`]: In-memory store of user corrections
//! - [`pipeline`]: The note pipeline and medicine-service operations

pub mod advice;
pub mod details;
pub mod feedback;
pub mod models;
pub mod pipeline;
pub mod summary;
pub mod text;
pub mod vocab;

// Re-export commonly used types
pub use details::{DetailExtractor, MedicationDetails};
pub use feedback::{EditSimilarity, FeedbackStore, TextSimilarity};
pub use models::{
    Entity, EntityKind, FeedbackRecord, NoteExtraction, PrescriptionRecord, FIELD_MISSING,
};
pub use pipeline::{
    EntityTagger, GrammarCorrector, MedicineService, NotePipeline, NoSummarizer,
    PassthroughCorrector, PipelineError, PipelineResult, PrescriptionAssembler, SpellCorrector,
    Summarizer,
};
pub use summary::SummaryComposer;
pub use text::{normalize_spoken_numbers, words_to_number, SpanMerger};
pub use vocab::{
    MedicineVocabulary, VocabularyMatch, NOTE_ADMISSION_THRESHOLD, SERVICE_ADMISSION_THRESHOLD,
};
