//! Standalone REST API server binary.
//!
//! Serves the note-extraction pipeline and the medicine service over
//! HTTP. This binary runs without any model collaborators: spelling and
//! grammar pass through unchanged and no entity tagger is configured, so
//! medicine extraction uses the keyword fallback. Deployments with model
//! backends construct the state with their own collaborator
//! implementations instead.

use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medscribe_api::{router, AppState};
use medscribe_core::{
    FeedbackStore, MedicineService, MedicineVocabulary, NoSummarizer, NotePipeline,
    PassthroughCorrector,
};

/// Tagger used when no model backend is configured: reports no spans, so
/// the note pipeline yields regex-only results.
struct NoTagger;

impl medscribe_core::EntityTagger for NoTagger {
    fn tag(&self, _text: &str) -> anyhow::Result<Vec<medscribe_core::Entity>> {
        Ok(Vec::new())
    }
}

/// # Environment Variables
/// - `MEDSCRIBE_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `MEDICINE_DATA_FILE`: Reference medicine JSON (default: "medicines_combined.json")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medscribe_api=info".parse()?)
                .add_directive("medscribe_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDSCRIBE_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let data_file = std::env::var("MEDICINE_DATA_FILE")
        .unwrap_or_else(|_| "medicines_combined.json".into());

    let vocabulary = Arc::new(MedicineVocabulary::load(Path::new(&data_file)));
    tracing::info!(names = vocabulary.len(), "medicine vocabulary ready");

    let feedback = Arc::new(FeedbackStore::new());
    let state = AppState {
        pipeline: Arc::new(NotePipeline::new(
            Arc::clone(&vocabulary),
            Box::new(PassthroughCorrector),
            Box::new(PassthroughCorrector),
            Box::new(NoSummarizer),
            Box::new(NoTagger),
        )),
        service: Arc::new(MedicineService::new(vocabulary, feedback, None)),
    };

    tracing::info!("-- Starting medscribe REST API on {}", addr);

    let app = router(state).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
