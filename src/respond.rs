//! Reply/Respond resolvers and the deterministic rejoinder fallback

use crate::types::SpeechFunction;
use tracing::debug;

/// Lexical negation check: the isolated token `no` in the lowercased text.
pub fn has_no_token(text: &str) -> bool {
    text.to_lowercase().contains(" no ")
}

/// Reply resolver (previous turn was a question, speakers differ):
/// prefix the classifier's label with `React.Respond.`, then reconcile a
/// polite "yes" with a `Disagree` verdict — if the previous tag was a
/// Confirm question, the "yes" wins and the reply is an affirmation.
pub fn reply_tag(
    label: &str,
    current_text: &str,
    previous_tag: Option<&SpeechFunction>,
) -> SpeechFunction {
    let tag = SpeechFunction::new(format!("React.Respond.{}", label.trim_end_matches('.')));
    let said_yes = current_text.to_lowercase().contains("yes");
    let confirming = previous_tag.map(|t| t.has_segment("Confirm")).unwrap_or(false);
    if said_yes && confirming && tag.as_str() == "React.Respond.Reply.Disagree" {
        debug!("reply override: yes + Confirm context flips Disagree to Affirm");
        SpeechFunction::new("React.Respond.Reply.Affirm")
    } else {
        tag
    }
}

/// Respond resolver (same speaker, or previous turn was not a question):
/// prefix the classifier's label with `React.Respond.`, unless the current
/// turn carries an isolated "no" — an explicit negation counters rather
/// than responds.
pub fn respond_tag(label: &str, current_text: &str) -> SpeechFunction {
    if has_no_token(current_text) {
        SpeechFunction::new("React.Rejoinder.Counter")
    } else {
        SpeechFunction::new(format!("React.Respond.{}", label.trim_end_matches('.')))
    }
}

/// Deterministic fallback for a rejoinder no classifier branch resolved.
pub fn rejoinder_fallback(
    current_text: &str,
    previous_text: &str,
    same_speaker: bool,
) -> SpeechFunction {
    if has_no_token(current_text) {
        return SpeechFunction::new("React.Rejoinder.Counter");
    }
    if previous_text.contains('?') {
        if same_speaker {
            SpeechFunction::new("React.Rejoinder.Re-challenge")
        } else {
            SpeechFunction::new("React.Rejoinder.Response.Resolve")
        }
    } else {
        SpeechFunction::new("React.Respond.Develop.Extend")
    }
}
