//! REST surface over the medscribe extraction pipeline.
//!
//! Thin HTTP adapters only: request parsing, error-to-status mapping,
//! and JSON shaping. All extraction logic lives in `medscribe-core`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use medscribe_core::{
    FeedbackRecord, MedicineService, NoteExtraction, NotePipeline, PipelineError,
    PrescriptionRecord,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NotePipeline>,
    pub service: Arc<MedicineService>,
}

#[derive(Debug, Deserialize)]
pub struct TextReq {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionReq {
    pub input_text: String,
    /// Accepted for wire compatibility; not used by the suggestion logic.
    #[serde(default)]
    pub patient_summary: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionRes {
    pub suggestion: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackReq {
    pub original_text: String,
    pub corrected_medicines: Vec<PrescriptionRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageRes {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorRes {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn into_api_error(err: PipelineError) -> ApiError {
    let status = match &err {
        PipelineError::EmptyInput => StatusCode::BAD_REQUEST,
        PipelineError::VocabularyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        PipelineError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(%err, "request failed");
    }
    (
        status,
        Json(ErrorRes {
            error: err.to_string(),
        }),
    )
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ner", post(extract_note))
        .route("/extract_medicines", post(extract_medicines))
        .route("/suggest_medicine", post(suggest_medicine))
        .route("/feedback_extraction", post(feedback_extraction))
        .with_state(state)
}

/// Health check endpoint, for monitoring and load balancers.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "medscribe API is alive".into(),
    })
}

/// Run the full note pipeline over one clinical note.
///
/// Returns `400` for empty input, `503` when the medicine vocabulary is
/// not loaded, `500` when a model collaborator fails.
async fn extract_note(
    State(state): State<AppState>,
    Json(req): Json<TextReq>,
) -> Result<Json<NoteExtraction>, ApiError> {
    let extraction = state.pipeline.extract(&req.text).map_err(into_api_error)?;
    Ok(Json(extraction))
}

/// Extract prescriptions from a short text via the medicine-service path
/// (feedback first, then tagger, then keyword fallback).
async fn extract_medicines(
    State(state): State<AppState>,
    Json(req): Json<TextReq>,
) -> Result<Json<Vec<PrescriptionRecord>>, ApiError> {
    let records = state
        .service
        .extract_medicines(&req.text)
        .map_err(into_api_error)?;
    Ok(Json(records))
}

/// Suggest a canonical medicine name for a partial or misheard input.
async fn suggest_medicine(
    State(state): State<AppState>,
    Json(req): Json<SuggestionReq>,
) -> Result<Json<SuggestionRes>, ApiError> {
    let suggestion = state
        .service
        .suggest_medicine(&req.input_text)
        .map_err(into_api_error)?;
    Ok(Json(SuggestionRes { suggestion }))
}

/// Store a correction so near-identical future inputs replay it.
async fn feedback_extraction(
    State(state): State<AppState>,
    Json(req): Json<FeedbackReq>,
) -> Result<Json<MessageRes>, ApiError> {
    state
        .service
        .record_feedback(FeedbackRecord {
            original_text: req.original_text,
            corrected_medicines: req.corrected_medicines,
        })
        .map_err(into_api_error)?;
    Ok(Json(MessageRes {
        message: "Feedback received and stored.".into(),
    }))
}
