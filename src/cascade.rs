//! Cascade orchestrator: sequences the resolver stages for one utterance

use crate::features::{Embedder, FeatureExtractor};
use crate::models::ModelBundle;
use crate::taxonomy::Taxonomy;
use crate::types::{ClassifyError, DialogueContext, SpeechFunction, TagState, Utterance};
use crate::{open_branch, respond, sustain, track};
use std::sync::Arc;
use tracing::{debug, info};

/// The tag-inference cascade. Holds the frozen model bundle, the taxonomy
/// and the provider handles; thread-safe via `Arc`, stateless between
/// calls — the caller threads `previous_tag` through each turn.
pub struct SpeechFunctionClassifier {
    bundle: ModelBundle,
    taxonomy: Taxonomy,
    embedder: Arc<dyn Embedder>,
    features: Arc<dyn FeatureExtractor>,
}

pub type SharedClassifier = Arc<SpeechFunctionClassifier>;

impl SpeechFunctionClassifier {
    pub fn new(
        bundle: ModelBundle,
        embedder: Arc<dyn Embedder>,
        features: Arc<dyn FeatureExtractor>,
    ) -> SharedClassifier {
        Arc::new(Self {
            bundle,
            taxonomy: Taxonomy::standard(),
            embedder,
            features,
        })
    }

    /// Classify one utterance given its dialogue context. Branches are tried
    /// in fixed priority order; once a stage finishes the tag, later stages
    /// pass it through untouched.
    pub async fn classify(
        &self,
        ctx: &DialogueContext,
    ) -> Result<SpeechFunction, ClassifyError> {
        debug!(
            text = %ctx.current.text,
            speaker = %ctx.current.speaker,
            previous_tag = ?ctx.previous_tag,
            "classifying utterance"
        );

        // Opening turn: no previous utterance, always an Open tag; the
        // top-level classifier is not consulted.
        let previous = match &ctx.previous {
            Some(previous) => previous,
            None => {
                let tag = self.resolve_open(&ctx.current).await?;
                self.taxonomy.validate(&tag)?;
                info!(tag = %tag, "opening turn");
                return Ok(tag);
            }
        };
        let same_speaker = ctx.same_speaker().unwrap_or(false);

        // Step 1: top-level branch from the current utterance embedding.
        let current_embedding = self.embed(&ctx.current.text).await?;
        let top_label = self.bundle.top_level.predict(&current_embedding)?;
        let mut state = TagState::from_top_label(top_label)?;
        debug!(?state, "top-level branch");

        // Step 2: Open branch.
        if state == TagState::Open {
            state = TagState::Final(self.resolve_open(&ctx.current).await?);
        }

        // Step 3: Sustain branch — develop rule, then the continuation
        // classifier.
        if state == TagState::SustainContinue {
            state = sustain::apply_develop_rule(state, ctx.previous_tag.as_ref(), same_speaker);
            let label = self.bundle.sustain.predict(&current_embedding)?;
            state = sustain::apply_sustain_label(state, label);
        }

        // Step 4: question routing, gated on the utterance being classified.
        if ctx.current.has_question_mark() {
            let track_label = self.bundle.track.predict(&current_embedding)?;
            let category = track::map_track(track_label);
            state = track::resolve_question(state, category, same_speaker, &ctx.current.text);
        }

        // Step 5: Reply/Respond resolvers over the concatenated embeddings.
        if state == TagState::ReactRespond {
            let previous_embedding = self.embed(&previous.text).await?;
            let concat = [current_embedding.as_slice(), previous_embedding.as_slice()].concat();
            state = if previous.has_question_mark() && !same_speaker {
                let label = self.bundle.reply.predict(&concat)?;
                TagState::Final(respond::reply_tag(
                    label,
                    &ctx.current.text,
                    ctx.previous_tag.as_ref(),
                ))
            } else {
                let label = self.bundle.respond.predict(&concat)?;
                TagState::Final(respond::respond_tag(label, &ctx.current.text))
            };
        }

        // Step 6: deterministic rejoinder fallback.
        if state == TagState::ReactRejoinder {
            state = TagState::Final(respond::rejoinder_fallback(
                &ctx.current.text,
                &previous.text,
                same_speaker,
            ));
        }

        let tag = state.finish();
        self.taxonomy.validate(&tag)?;
        info!(tag = %tag, "classification complete");
        Ok(tag)
    }

    async fn resolve_open(&self, current: &Utterance) -> Result<SpeechFunction, ClassifyError> {
        let features = self.features.analyze(&current.text).await?;
        open_branch::resolve(&features, &self.bundle, &current.text)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClassifyError> {
        let embedding = self.embedder.embed(text).await?;
        let expected = self.bundle.embedding_dim();
        if embedding.len() != expected {
            return Err(ClassifyError::FeatureShape {
                expected,
                got: embedding.len(),
            });
        }
        Ok(embedding)
    }
}
