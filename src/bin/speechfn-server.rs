//! speechfn HTTP server binary

use speechfn::{
    HttpEmbedder, HttpFeatureExtractor, MockEmbedder, MockFeatureExtractor, ModelBundle,
    SpeechFunctionClassifier,
};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    println!("speechfn — speech-function annotator");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let model_dir = PathBuf::from(
        std::env::var("SPEECHFN_MODEL_DIR").unwrap_or_else(|_| "models".to_string()),
    );
    println!("✓ Model dir: {}", model_dir.display());

    // Loading failure is fatal to the process.
    let bundle = ModelBundle::load(&model_dir)?;
    let embedding_dim = bundle.embedding_dim();
    println!("✓ Model bundle loaded (embedding dim {})", embedding_dim);

    // Check for --use-real flag
    let use_real = std::env::args().any(|arg| arg == "--use-real");

    let classifier = if use_real {
        println!("✓ Mode: REAL providers (remote services)");
        let embedding_service_url = std::env::var("EMBEDDING_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8103".to_string());
        let annotation_service_url = std::env::var("ANNOTATION_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8104".to_string());

        println!("✓ Embedding service: {}", embedding_service_url);
        println!("✓ Annotation service: {}", annotation_service_url);

        // Fail fast when the collaborator services are unreachable.
        let client = reqwest::Client::new();
        for (name, url) in [
            ("embedding", &embedding_service_url),
            ("annotation", &annotation_service_url),
        ] {
            match client.get(format!("{}/health", url)).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("✓ {} service is healthy", name);
                }
                Ok(resp) => {
                    eprintln!("⚠️  {} service returned status: {}", name, resp.status());
                }
                Err(e) => {
                    eprintln!("❌ Failed to connect to {} service: {}", name, e);
                    return Err(e.into());
                }
            }
        }

        SpeechFunctionClassifier::new(
            bundle,
            Arc::new(HttpEmbedder::new(embedding_service_url, embedding_dim)),
            Arc::new(HttpFeatureExtractor::new(annotation_service_url)),
        )
    } else {
        println!("✓ Mode: MOCK providers");
        println!("   (use --use-real to call the embedding/annotation services)");
        SpeechFunctionClassifier::new(
            bundle,
            Arc::new(MockEmbedder::new(embedding_dim)),
            Arc::new(MockFeatureExtractor),
        )
    };

    let port: u16 = std::env::var("SPEECHFN_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8108);

    println!("✓ Classifier initialized");
    println!("✓ Starting HTTP server on port {}...", port);
    println!();

    speechfn::server::run_server(classifier, port).await?;

    Ok(())
}
