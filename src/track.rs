//! Track/Question resolver: routes question turns between tracking
//! sub-categories and rejoinder challenges

use crate::types::{SpeechFunction, TagState};
use tracing::debug;

/// Interrogative words checked when the Track classifier is ambiguous.
pub const INTERROGATIVE_WORDS: [&str; 9] = [
    "whose", "what", "which", "who", "whom", "why", "where", "when", "how",
];

/// Track sub-category of a rejoinder question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCategory {
    Check,
    Confirm,
    Clarify,
    Probe,
}

impl TrackCategory {
    pub fn segments(self) -> &'static str {
        match self {
            TrackCategory::Check => "Track.Check",
            TrackCategory::Confirm => "Track.Confirm",
            TrackCategory::Clarify => "Track.Clarify",
            TrackCategory::Probe => "Track.Probe",
        }
    }
}

/// Map a Track classifier label to a category. Code `5` means ambiguous;
/// any unmapped code is treated the same way, never an error.
pub fn map_track(label: &str) -> Option<TrackCategory> {
    match label {
        "1" => Some(TrackCategory::Check),
        "2" => Some(TrackCategory::Confirm),
        "3" => Some(TrackCategory::Clarify),
        "4" => Some(TrackCategory::Probe),
        _ => None,
    }
}

pub fn has_interrogative_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INTERROGATIVE_WORDS.iter().any(|w| lowered.contains(w))
}

fn rejoinder_track(track: TrackCategory) -> TagState {
    TagState::Final(SpeechFunction::new(format!(
        "React.Rejoinder.{}",
        track.segments()
    )))
}

fn rebound_or_rechallenge(text: &str) -> TagState {
    if has_interrogative_word(text) {
        TagState::Final(SpeechFunction::new("React.Rejoinder.Rebound"))
    } else {
        TagState::Final(SpeechFunction::new("React.Rejoinder.Re-challenge"))
    }
}

/// Resolve a question turn given the tag produced so far, the Track
/// classifier's verdict, and speaker continuity. Finished tags and the
/// Open branch pass through untouched.
pub fn resolve_question(
    state: TagState,
    track: Option<TrackCategory>,
    same_speaker: bool,
    text: &str,
) -> TagState {
    use TagState::*;
    debug!(?state, ?track, same_speaker, "resolving question turn");
    match (same_speaker, state, track) {
        // A question in response position from the other party is a
        // tracking rejoinder.
        (false, ReactRespond, Some(t)) => rejoinder_track(t),
        (false, SustainContinue, Some(t)) => rejoinder_track(t),
        // An ambiguous continuation question stays a bare rejoinder for the
        // deterministic fallback to settle.
        (false, SustainContinue, None) => ReactRejoinder,
        (_, ReactRejoinder, Some(t)) => rejoinder_track(t),
        (_, ReactRejoinder, None) => rebound_or_rechallenge(text),
        // Self-directed question while holding the floor.
        (true, SustainContinue, _) => {
            Final(SpeechFunction::new("Sustain.Continue.Monitor"))
        }
        (_, other, _) => other,
    }
}
