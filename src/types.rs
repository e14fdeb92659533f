//! Core type definitions for speech-function classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One dialogue turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub speaker: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
        }
    }

    pub fn has_question_mark(&self) -> bool {
        self.text.contains('?')
    }
}

/// Context for one classification call. Built per call; the core keeps no
/// state between calls — `previous_tag` is the only carried context and it
/// is supplied by the caller each time.
#[derive(Debug, Clone)]
pub struct DialogueContext {
    pub current: Utterance,
    pub previous: Option<Utterance>,
    pub previous_tag: Option<SpeechFunction>,
}

impl DialogueContext {
    pub fn new(
        current: Utterance,
        previous: Option<Utterance>,
        previous_tag: Option<SpeechFunction>,
    ) -> Self {
        Self {
            current,
            previous,
            previous_tag,
        }
    }

    /// Context for the opening turn of a dialogue.
    pub fn opening(current: Utterance) -> Self {
        Self::new(current, None, None)
    }

    /// Whether the current speaker is the same as the previous one.
    /// `None` when there is no previous turn.
    pub fn same_speaker(&self) -> Option<bool> {
        self.previous
            .as_ref()
            .map(|p| p.speaker == self.current.speaker)
    }
}

/// Hierarchical speech-function tag: taxonomy segments joined by `.`,
/// e.g. `React.Respond.Reply.Affirm`. Rendered without a trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeechFunction(String);

impl SpeechFunction {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self(tag.trim_end_matches('.').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn first_segment(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Segment-wise prefix check: `Sustain.Continue` is a prefix of
    /// `Sustain.Continue.Prolong.Extend` but not of `Sustain.Continuation`.
    pub fn starts_with_path(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('.');
        self.0 == prefix
            || (self.0.starts_with(prefix) && self.0[prefix.len()..].starts_with('.'))
    }

    /// Whether any single segment equals `segment`.
    pub fn has_segment(&self, segment: &str) -> bool {
        self.segments().any(|s| s == segment)
    }
}

impl std::fmt::Display for SpeechFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpeechFunction {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Intermediate state of one cascade call. Replaces the dot-suffixed string
/// prefixes of the original annotator with explicit states, so every
/// transition is a match arm rather than a substring comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagState {
    /// `Open.` — awaiting the Open-branch resolver.
    Open,
    /// `Sustain.Continue.` — awaiting the Sustain-branch resolver.
    SustainContinue,
    /// `React.Respond.` — awaiting the Reply/Respond resolvers.
    ReactRespond,
    /// `React.Rejoinder.` — awaiting the Track or fallback resolvers.
    ReactRejoinder,
    /// `React.Respond.Develop.` produced by the develop rule, awaiting a
    /// sub-tag from the Sustain classifier.
    RespondDevelop,
    /// A finished tag; no later stage re-examines it.
    Final(SpeechFunction),
}

impl TagState {
    /// Parse a top-level classifier label (`Open.`, `Sustain.Continue.`,
    /// `React.Respond.`, `React.Rejoinder.`).
    pub fn from_top_label(label: &str) -> Result<Self, ClassifyError> {
        match label.trim_end_matches('.') {
            "Open" => Ok(TagState::Open),
            "Sustain.Continue" => Ok(TagState::SustainContinue),
            "React.Respond" => Ok(TagState::ReactRespond),
            "React.Rejoinder" => Ok(TagState::ReactRejoinder),
            other => Err(ClassifyError::UnknownTopLabel(other.to_string())),
        }
    }

    /// Render the state as a finished tag. Bare categories render as their
    /// taxonomy path; no state renders empty.
    pub fn finish(self) -> SpeechFunction {
        match self {
            TagState::Open => SpeechFunction::new("Open"),
            TagState::SustainContinue => SpeechFunction::new("Sustain.Continue"),
            TagState::ReactRespond => SpeechFunction::new("React.Respond"),
            TagState::ReactRejoinder => SpeechFunction::new("React.Rejoinder"),
            TagState::RespondDevelop => SpeechFunction::new("React.Respond.Develop"),
            TagState::Final(tag) => tag,
        }
    }
}

/// Errors surfaced by the cascade and its frozen models.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Feature vector does not match the dimensionality the model was
    /// trained against. Fatal to the call, never retried.
    #[error("feature vector has wrong shape: expected {expected}, got {got}")]
    FeatureShape { expected: usize, got: usize },

    #[error("model has no classes")]
    EmptyModel,

    #[error("top-level classifier produced unknown label: {0}")]
    UnknownTopLabel(String),

    #[error("tag violates taxonomy: {0}")]
    InvalidTag(String),

    /// Failure in an external provider (embedding or linguistic features).
    #[error("provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_function_trims_trailing_dot() {
        let tag = SpeechFunction::new("React.Respond.Develop.");
        assert_eq!(tag.as_str(), "React.Respond.Develop");
    }

    #[test]
    fn starts_with_path_is_segment_wise() {
        let tag = SpeechFunction::new("Sustain.Continue.Prolong.Extend");
        assert!(tag.starts_with_path("Sustain.Continue"));
        assert!(tag.starts_with_path("Sustain.Continue."));
        assert!(!tag.starts_with_path("Sustain.Cont"));
    }

    #[test]
    fn has_segment_matches_whole_segments() {
        let tag = SpeechFunction::new("React.Rejoinder.Track.Confirm");
        assert!(tag.has_segment("Confirm"));
        assert!(!tag.has_segment("Con"));
    }

    #[test]
    fn top_label_parsing() {
        assert_eq!(
            TagState::from_top_label("Sustain.Continue.").unwrap(),
            TagState::SustainContinue
        );
        assert!(TagState::from_top_label("Closed.").is_err());
    }

    #[test]
    fn finish_renders_bare_categories() {
        assert_eq!(
            TagState::RespondDevelop.finish().as_str(),
            "React.Respond.Develop"
        );
        assert_eq!(TagState::Open.finish().as_str(), "Open");
    }
}
