//! HTTP-based feature extractor that calls the linguistic annotation service

use crate::features::{FeatureExtractor, LinguisticFeatures, ENTITY_TYPES, POS_TAGS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to the annotation service
#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
}

/// Response from the annotation service: named counts over the first
/// sentence plus token-level signals.
#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    entity_counts: HashMap<String, u32>,
    #[serde(default)]
    pos_counts: HashMap<String, u32>,
    #[serde(default)]
    token_count: usize,
    #[serde(default)]
    has_proper_noun: bool,
}

/// HTTP-based linguistic feature provider. The service runs the actual
/// parser; this client folds its named counts into the fixed-order
/// vocabulary vectors the Fact/Opinion model was trained against.
pub struct HttpFeatureExtractor {
    service_url: String,
    client: reqwest::Client,
}

impl HttpFeatureExtractor {
    pub fn new(service_url: String) -> Self {
        Self {
            service_url,
            client: reqwest::Client::new(),
        }
    }

    fn to_features(response: AnnotateResponse) -> LinguisticFeatures {
        let mut features = LinguisticFeatures::empty();
        features.token_count = response.token_count;
        features.has_proper_noun = response.has_proper_noun;

        for (label, count) in &response.entity_counts {
            match ENTITY_TYPES.iter().position(|t| *t == label.as_str()) {
                Some(idx) => features.entity_counts[idx] += *count as f32,
                None => {
                    tracing::debug!("dropping unknown entity type {}", label);
                }
            }
        }

        // Unseen POS tags land in the OOV catch-all bucket.
        let oov = POS_TAGS.iter().position(|t| *t == "OOV").unwrap_or(0);
        for (label, count) in &response.pos_counts {
            let idx = POS_TAGS.iter().position(|t| *t == label.as_str()).unwrap_or(oov);
            features.pos_counts[idx] += *count as f32;
        }

        features
    }
}

#[async_trait]
impl FeatureExtractor for HttpFeatureExtractor {
    fn name(&self) -> &'static str {
        "http_features"
    }

    async fn analyze(&self, text: &str) -> Result<LinguisticFeatures> {
        let url = format!("{}/annotate", self.service_url);
        let response = self
            .client
            .post(&url)
            .json(&AnnotateRequest { text })
            .send()
            .await
            .context("Failed to call annotation service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Annotation service error ({}): {}", status, error_text);
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .context("Failed to parse annotation service response")?;

        Ok(Self::to_features(parsed))
    }
}
