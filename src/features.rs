//! External provider contracts: text embedding and linguistic features
//!
//! Both collaborators are consumed behind traits so the cascade can run
//! against the real remote services or against the deterministic mocks
//! below. Providers are pure functions of the text; all randomness and
//! state live outside the core.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Closed vocabulary of named-entity types counted by the feature extractor.
pub const ENTITY_TYPES: [&str; 18] = [
    "PERSON", "NORP", "FAC", "ORG", "GPE", "LOC", "PRODUCT", "EVENT",
    "WORK_OF_ART", "LAW", "LANGUAGE", "DATE", "TIME", "PERCENT", "MONEY",
    "QUANTITY", "ORDINAL", "CARDINAL",
];

/// Closed vocabulary of fine-grained POS tags. `OOV` and `TRAILING_SPACE`
/// are the catch-all buckets; unseen tags map into `OOV` rather than
/// erroring.
pub const POS_TAGS: [&str; 58] = [
    "-LRB-", "-RRB-", ",", ":", ".", "''", "\"\"", "#", "``", "$", "ADD",
    "AFX", "BES", "CC", "CD", "DT", "EX", "FW", "GW", "HVS", "HYPH", "IN",
    "JJ", "JJR", "JJS", "LS", "MD", "NFP", "NIL", "NN", "NNP", "NNPS",
    "NNS", "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "_SP",
    "SYM", "TO", "UH", "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT",
    "WP", "WP$", "WRB", "XX", "OOV", "TRAILING_SPACE",
];

/// Total dimensionality of the Open-branch count vector.
pub const FEATURE_DIM: usize = ENTITY_TYPES.len() + POS_TAGS.len();

/// Linguistic features of the first sentence of an utterance. An utterance
/// with no entity or POS matches yields all-zero counts — never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticFeatures {
    /// Counts per `ENTITY_TYPES` entry, in vocabulary order.
    pub entity_counts: Vec<f32>,
    /// Counts per `POS_TAGS` entry, in vocabulary order.
    pub pos_counts: Vec<f32>,
    /// Token count of the whole utterance (not just the first sentence).
    pub token_count: usize,
    /// Whether any token is tagged as a proper noun.
    pub has_proper_noun: bool,
}

impl LinguisticFeatures {
    pub fn empty() -> Self {
        Self {
            entity_counts: vec![0.0; ENTITY_TYPES.len()],
            pos_counts: vec![0.0; POS_TAGS.len()],
            token_count: 0,
            has_proper_noun: false,
        }
    }

    /// Concatenated entity + POS count vector fed to the Fact/Opinion model.
    pub fn to_vector(&self) -> Vec<f32> {
        let mut v = Vec::with_capacity(FEATURE_DIM);
        v.extend_from_slice(&self.entity_counts);
        v.extend_from_slice(&self.pos_counts);
        v
    }
}

/// Text embedding provider. Deterministic for fixed model weights; the
/// dimensionality is the contract the five classifiers were trained against.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Embedding dimensionality this provider produces.
    fn dim(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Linguistic feature provider: entity-type and fine-grained POS counts for
/// the first sentence of `text`, plus token-level signals for the Attend
/// override.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, text: &str) -> Result<LinguisticFeatures>;
}

/// Mock embedder for tests and offline runs: fixed vectors per exact text,
/// zeros otherwise.
pub struct MockEmbedder {
    dim: usize,
    fixed: HashMap<String, Vec<f32>>,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            fixed: HashMap::new(),
        }
    }

    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.fixed.insert(text.into(), vector);
        self
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn name(&self) -> &'static str {
        "mock_embedder"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .fixed
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dim]))
    }
}

/// Words that stay common nouns even when capitalized, so the mock's
/// proper-noun heuristic does not fire on sentence-initial tokens.
const COMMON_CAPITALIZED: [&str; 24] = [
    "i", "a", "an", "the", "do", "does", "did", "is", "are", "was", "were",
    "yes", "no", "not", "you", "we", "they", "he", "she", "it", "what",
    "why", "how", "ok",
];

/// Mock feature extractor: a coarse, fully deterministic stand-in for the
/// remote linguistic annotator. Capitalized tokens outside a small
/// common-word list count as proper nouns (`NNP`), numerics as `CD`,
/// everything else as `NN`; sentence punctuation lands in the `.` bucket.
pub struct MockFeatureExtractor;

impl MockFeatureExtractor {
    fn first_sentence(text: &str) -> &str {
        match text.find(['.', '?', '!']) {
            Some(idx) => &text[..=idx],
            None => text,
        }
    }

    fn is_proper_noun(token: &str) -> bool {
        token
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
            && !COMMON_CAPITALIZED.contains(&token.to_lowercase().as_str())
    }
}

#[async_trait]
impl FeatureExtractor for MockFeatureExtractor {
    fn name(&self) -> &'static str {
        "mock_features"
    }

    async fn analyze(&self, text: &str) -> Result<LinguisticFeatures> {
        let mut features = LinguisticFeatures::empty();
        let pos_index: HashMap<&str, usize> =
            POS_TAGS.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        features.token_count = tokens.len();
        features.has_proper_noun = tokens.iter().any(|t| Self::is_proper_noun(t));

        for token in text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
        {
            let in_first = Self::first_sentence(text).contains(token);
            if !in_first {
                continue;
            }
            let tag = if Self::is_proper_noun(token) {
                "NNP"
            } else if token.chars().all(|c| c.is_ascii_digit()) {
                "CD"
            } else {
                "NN"
            };
            features.pos_counts[pos_index[tag]] += 1.0;
        }
        for c in Self::first_sentence(text).chars() {
            if c == '.' || c == '?' || c == '!' {
                features.pos_counts[pos_index["."]] += 1.0;
            }
        }

        Ok(features)
    }
}
