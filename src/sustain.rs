//! Sustain-branch resolver: the develop rule and the continuation classifier

use crate::types::{SpeechFunction, TagState};
use tracing::debug;

/// Turn-taking develop rule: a continuation that crosses a speaker boundary
/// is a development, not a sustain. Fires only when the previous tag was
/// itself a continuation.
pub fn apply_develop_rule(
    state: TagState,
    previous_tag: Option<&SpeechFunction>,
    same_speaker: bool,
) -> TagState {
    let continued = previous_tag
        .map(|t| t.starts_with_path("Sustain.Continue"))
        .unwrap_or(false);
    if state == TagState::SustainContinue && !same_speaker && continued {
        debug!("develop rule fired: continuation crossed a speaker turn");
        TagState::RespondDevelop
    } else {
        state
    }
}

/// Consume the Sustain classifier's predicted sub-tag:
/// - a plain continuation adopts the prediction verbatim;
/// - a development appends the prediction's leaf segment, unless the leaf is
///   `Monitor`, in which case the development stays bare.
pub fn apply_sustain_label(state: TagState, label: &str) -> TagState {
    match state {
        TagState::SustainContinue => TagState::Final(SpeechFunction::new(label)),
        TagState::RespondDevelop => {
            let leaf = label
                .rsplit('.')
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            if leaf == "Monitor" {
                TagState::RespondDevelop
            } else {
                TagState::Final(SpeechFunction::new(format!(
                    "React.Respond.Develop.{leaf}"
                )))
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> SpeechFunction {
        SpeechFunction::new(s)
    }

    #[test]
    fn develop_rule_fires_on_turn_change() {
        let state = apply_develop_rule(
            TagState::SustainContinue,
            Some(&tag("Sustain.Continue.Prolong.Extend")),
            false,
        );
        assert_eq!(state, TagState::RespondDevelop);
    }

    #[test]
    fn develop_rule_needs_speaker_change() {
        let state = apply_develop_rule(
            TagState::SustainContinue,
            Some(&tag("Sustain.Continue.Prolong.Extend")),
            true,
        );
        assert_eq!(state, TagState::SustainContinue);
    }

    #[test]
    fn develop_rule_needs_previous_continuation() {
        let state = apply_develop_rule(
            TagState::SustainContinue,
            Some(&tag("React.Respond.Reply.Agree")),
            false,
        );
        assert_eq!(state, TagState::SustainContinue);

        let state = apply_develop_rule(TagState::SustainContinue, None, false);
        assert_eq!(state, TagState::SustainContinue);
    }

    #[test]
    fn develop_rule_only_touches_sustain_state() {
        let state = apply_develop_rule(
            TagState::ReactRespond,
            Some(&tag("Sustain.Continue.Monitor")),
            false,
        );
        assert_eq!(state, TagState::ReactRespond);
    }

    #[test]
    fn continuation_adopts_prediction_verbatim() {
        let state = apply_sustain_label(
            TagState::SustainContinue,
            "Sustain.Continue.Prolong.Extend",
        );
        assert_eq!(
            state,
            TagState::Final(tag("Sustain.Continue.Prolong.Extend"))
        );
    }

    #[test]
    fn development_appends_leaf() {
        let state = apply_sustain_label(
            TagState::RespondDevelop,
            "Sustain.Continue.Prolong.Elaborate",
        );
        assert_eq!(
            state,
            TagState::Final(tag("React.Respond.Develop.Elaborate"))
        );
    }

    #[test]
    fn development_ignores_monitor_leaf() {
        let state =
            apply_sustain_label(TagState::RespondDevelop, "Sustain.Continue.Monitor");
        assert_eq!(state, TagState::RespondDevelop);
    }

    #[test]
    fn trailing_dot_labels_are_tolerated() {
        let state = apply_sustain_label(
            TagState::RespondDevelop,
            "Sustain.Continue.Prolong.Enhance.",
        );
        assert_eq!(state, TagState::Final(tag("React.Respond.Develop.Enhance")));
    }
}
