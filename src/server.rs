//! HTTP batch-annotation surface for the speech-function classifier

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::cascade::SharedClassifier;
use crate::types::{DialogueContext, SpeechFunction, Utterance};

/// Batch annotation request: parallel arrays, one entry per dialogue. A
/// `null` previous phrase marks an opening turn. Speakers default to the
/// two-party deployment (`human` current, `bot` previous).
#[derive(Debug, Deserialize)]
pub struct AnnotateBatchHttp {
    pub phrases: Vec<String>,
    #[serde(default)]
    pub prev_phrases: Vec<Option<String>>,
    #[serde(default)]
    pub prev_speech_functions: Vec<Option<String>>,
    #[serde(default)]
    pub speakers: Vec<String>,
    #[serde(default)]
    pub prev_speakers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateBatchResponse {
    pub speech_functions: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: msg.to_string(),
            details: None,
        }),
    )
}

/// Batch annotation handler
async fn annotate_handler(
    State(classifier): State<SharedClassifier>,
    Json(req): Json<AnnotateBatchHttp>,
) -> Result<Json<AnnotateBatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let n = req.phrases.len();
    info!("Received annotation batch of {} phrases", n);

    for (name, len) in [
        ("prev_phrases", req.prev_phrases.len()),
        ("prev_speech_functions", req.prev_speech_functions.len()),
        ("speakers", req.speakers.len()),
        ("prev_speakers", req.prev_speakers.len()),
    ] {
        if len != 0 && len != n {
            return Err(bad_request(&format!(
                "{} must be empty or match phrases length",
                name
            )));
        }
    }

    let contexts: Vec<DialogueContext> = (0..n)
        .map(|i| {
            let speaker = req.speakers.get(i).cloned().unwrap_or_else(|| "human".to_string());
            let prev_speaker = req
                .prev_speakers
                .get(i)
                .cloned()
                .unwrap_or_else(|| "bot".to_string());
            let previous = req
                .prev_phrases
                .get(i)
                .and_then(|p| p.clone())
                .map(|text| Utterance::new(text, prev_speaker));
            let previous_tag = req
                .prev_speech_functions
                .get(i)
                .and_then(|t| t.clone())
                .map(SpeechFunction::new);
            DialogueContext::new(
                Utterance::new(req.phrases[i].clone(), speaker),
                previous,
                previous_tag,
            )
        })
        .collect();

    // Batch entries are independent dialogues, so they may run in parallel.
    let results =
        futures::future::join_all(contexts.iter().map(|ctx| classifier.classify(ctx))).await;

    let mut speech_functions = Vec::with_capacity(n);
    for result in results {
        match result {
            Ok(tag) => speech_functions.push(tag.to_string()),
            Err(e) => {
                error!("Classification failed: {:?}", e);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Classification failed".to_string(),
                        details: Some(e.to_string()),
                    }),
                ));
            }
        }
    }

    info!("Annotated {} phrases", speech_functions.len());
    Ok(Json(AnnotateBatchResponse { speech_functions }))
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "speechfn".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP server
pub fn create_router(classifier: SharedClassifier) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/model", post(annotate_handler))
        .with_state(classifier)
}

/// Run the HTTP server
pub async fn run_server(classifier: SharedClassifier, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting speechfn server on {}", addr);

    let app = create_router(classifier);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
