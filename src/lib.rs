//! speechfn — speech-function tag inference for two-party dialogue
//!
//! Assigns a hierarchical speech-function tag (e.g.
//! `React.Respond.Reply.Affirm`) to each dialogue turn via a cascade of:
//! - frozen linear classifiers over sentence embeddings
//! - deterministic turn-taking and lexical rules
//! - a fixed exchange-structure label taxonomy
//!
//! Embedding and linguistic-feature extraction are external collaborators
//! consumed behind the `Embedder`/`FeatureExtractor` traits.

pub mod types;
pub mod taxonomy;
pub mod models;
pub mod features;
pub mod http_embedder;
pub mod http_features;
pub mod open_branch;
pub mod sustain;
pub mod track;
pub mod respond;
pub mod cascade;
pub mod server;

pub use types::{ClassifyError, DialogueContext, SpeechFunction, TagState, Utterance};
pub use taxonomy::Taxonomy;
pub use models::{LinearClassifier, ModelBundle, Scaler};
pub use features::{
    Embedder, FeatureExtractor, LinguisticFeatures, MockEmbedder, MockFeatureExtractor,
};
pub use http_embedder::HttpEmbedder;
pub use http_features::HttpFeatureExtractor;
pub use cascade::{SharedClassifier, SpeechFunctionClassifier};

#[cfg(test)]
mod tests;
