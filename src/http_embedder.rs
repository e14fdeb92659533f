//! HTTP-based embedder that calls the remote sentence-embedding service

use crate::features::Embedder;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to the embedding service
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: Vec<&'a str>,
}

/// Response from the embedding service
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// HTTP-based embedding provider. The service owns the actual sentence
/// encoder; this client only moves text in and vectors out.
pub struct HttpEmbedder {
    service_url: String,
    dim: usize,
    client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(service_url: String, dim: usize) -> Self {
        Self {
            service_url,
            dim,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &'static str {
        "http_embedder"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embed", self.service_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { texts: vec![text] })
            .send()
            .await
            .context("Failed to call embedding service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding service error ({}): {}", status, error_text);
        }

        let mut parsed: EmbedResponse = response
            .json()
            .await
            .context("Failed to parse embedding service response")?;

        let embedding = parsed
            .embeddings
            .pop()
            .context("Embedding service returned no vectors")?;

        tracing::debug!(
            "Embedded {} chars into {} dims",
            text.len(),
            embedding.len()
        );

        Ok(embedding)
    }
}
