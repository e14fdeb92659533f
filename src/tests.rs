//! End-to-end cascade tests against mock models and providers

use crate::features::FEATURE_DIM;
use crate::*;
use std::sync::Arc;

const DIM: usize = 4;

fn one_hot(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[i] = 1.0;
    v
}

/// Top-level classifier: embedding axis i selects class i.
fn top_level() -> LinearClassifier {
    LinearClassifier::new(
        vec![
            "Open.".into(),
            "Sustain.Continue.".into(),
            "React.Respond.".into(),
            "React.Rejoinder.".into(),
        ],
        vec![one_hot(0), one_hot(1), one_hot(2), one_hot(3)],
        vec![0.0; 4],
    )
}

/// Sustain classifier: axis 1 selects the first listed sub-tag.
fn sustain_model(first_class: &str) -> LinearClassifier {
    LinearClassifier::new(
        vec![first_class.into(), "Sustain.Continue.Monitor".into()],
        vec![one_hot(1), vec![0.0; DIM]],
        vec![0.0, 0.0],
    )
}

/// Track classifier: axis 2 -> code 4 (Probe), axis 3 -> code 5 (ambiguous).
fn track_model() -> LinearClassifier {
    LinearClassifier::new(
        vec!["1".into(), "2".into(), "3".into(), "4".into(), "5".into()],
        vec![
            vec![0.0; DIM],
            vec![0.0; DIM],
            vec![0.0; DIM],
            one_hot(2),
            one_hot(3),
        ],
        vec![0.0; 5],
    )
}

/// Reply classifier over concat(current, previous): a current utterance on
/// axis 2 predicts Disagree.
fn reply_model() -> LinearClassifier {
    let mut disagree = vec![0.0; DIM * 2];
    disagree[2] = 1.0;
    LinearClassifier::new(
        vec!["Reply.Disagree".into(), "Reply.Agree".into()],
        vec![disagree, vec![0.0; DIM * 2]],
        vec![0.0, 0.0],
    )
}

fn respond_model() -> LinearClassifier {
    LinearClassifier::new(
        vec!["Develop.Elaborate".into()],
        vec![vec![0.0; DIM * 2]],
        vec![0.0],
    )
}

/// Fact/Opinion: always Fact.
fn fact_opinion_model() -> LinearClassifier {
    LinearClassifier::new(
        vec!["0".into(), "1".into()],
        vec![vec![0.0; FEATURE_DIM]],
        vec![-1.0],
    )
}

fn test_bundle(sustain_first_class: &str) -> ModelBundle {
    ModelBundle {
        top_level: top_level(),
        sustain: sustain_model(sustain_first_class),
        track: track_model(),
        reply: reply_model(),
        respond: respond_model(),
        fact_opinion: fact_opinion_model(),
        scaler: Scaler::identity(FEATURE_DIM),
    }
}

/// Embedder routing test phrases onto the axes the mock models key on.
fn test_embedder() -> MockEmbedder {
    MockEmbedder::new(DIM)
        // axis 1: Sustain.Continue.
        .with_vector("And then we went home.", one_hot(1))
        // axis 2: React.Respond.
        .with_vector("Yes, I agree.", one_hot(2))
        .with_vector("There is no way that happened.", one_hot(2))
        .with_vector("Do you mean the red one?", one_hot(2))
        // axis 3: React.Rejoinder.
        .with_vector("Why is that?", one_hot(3))
        .with_vector("It was in June.", one_hot(3))
}

pub(crate) fn classifier(sustain_first_class: &str) -> SharedClassifier {
    SpeechFunctionClassifier::new(
        test_bundle(sustain_first_class),
        Arc::new(test_embedder()),
        Arc::new(MockFeatureExtractor),
    )
}

fn ctx(
    current: (&str, &str),
    previous: Option<(&str, &str)>,
    previous_tag: Option<&str>,
) -> DialogueContext {
    DialogueContext::new(
        Utterance::new(current.0, current.1),
        previous.map(|(text, speaker)| Utterance::new(text, speaker)),
        previous_tag.map(SpeechFunction::new),
    )
}

#[tokio::test]
async fn opening_turn_always_opens() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&DialogueContext::opening(Utterance::new(
            "The weather was lovely today.",
            "human",
        )))
        .await
        .unwrap();
    assert_eq!(tag.first_segment(), "Open");
    assert_eq!(tag.as_str(), "Open.Give.Fact");
}

#[tokio::test]
async fn opening_question_demands() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(("what happened after that then?", "human"), None, None))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "Open.Demand.Fact");
}

#[tokio::test]
async fn short_proper_noun_opening_is_attend() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(("John!", "human"), None, None))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "Open.Attend");
}

#[tokio::test]
async fn reply_disagree_flips_to_affirm_after_confirm_question() {
    // Scenario: polite "yes" after a Confirm question, classifier says
    // Disagree — the lexical override wins.
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("Yes, I agree.", "human"),
            Some(("Do you like cats?", "bot")),
            Some("React.Rejoinder.Track.Confirm"),
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Respond.Reply.Affirm");
}

#[tokio::test]
async fn reply_override_needs_confirm_context() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("Yes, I agree.", "human"),
            Some(("Do you like cats?", "bot")),
            Some("React.Rejoinder.Track.Check"),
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Respond.Reply.Disagree");
}

#[tokio::test]
async fn ambiguous_rejoinder_question_rebounds() {
    // Scenario: same speaker keeps pressing with an interrogative; track
    // classifier is ambiguous (code 5).
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("Why is that?", "human"),
            Some(("I just did.", "human")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Rejoinder.Rebound");
}

#[tokio::test]
async fn respond_question_from_other_party_becomes_tracking() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("Do you mean the red one?", "human"),
            Some(("I bought a car.", "bot")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Rejoinder.Track.Probe");
}

#[tokio::test]
async fn develop_rule_converts_continuation_across_turns() {
    // Scenario: previous tag was a continuation, speakers differ, top-level
    // says continuation again — the develop rule fires and the sustain
    // classifier's leaf is appended under Develop.
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("And then we went home.", "human"),
            Some(("We left the party early.", "bot")),
            Some("Sustain.Continue.Prolong.Extend"),
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Respond.Develop.Extend");
}

#[tokio::test]
async fn develop_with_monitor_leaf_stays_bare() {
    let clf = classifier("Sustain.Continue.Monitor");
    let tag = clf
        .classify(&ctx(
            ("And then we went home.", "human"),
            Some(("We left the party early.", "bot")),
            Some("Sustain.Continue.Prolong.Extend"),
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Respond.Develop");
}

#[tokio::test]
async fn same_speaker_continuation_adopts_sub_tag() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("And then we went home.", "human"),
            Some(("We left the party early.", "human")),
            Some("Sustain.Continue.Prolong.Extend"),
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "Sustain.Continue.Prolong.Extend");
}

#[tokio::test]
async fn isolated_no_counters_instead_of_responding() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("There is no way that happened.", "human"),
            Some(("I stayed home all week.", "bot")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Rejoinder.Counter");
}

#[tokio::test]
async fn rejoinder_fallback_resolves_answered_question() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let tag = clf
        .classify(&ctx(
            ("It was in June.", "human"),
            Some(("When was it?", "bot")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(tag.as_str(), "React.Rejoinder.Response.Resolve");
}

#[tokio::test]
async fn classification_is_deterministic() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let context = ctx(
        ("Yes, I agree.", "human"),
        Some(("Do you like cats?", "bot")),
        Some("React.Rejoinder.Track.Confirm"),
    );
    let first = clf.classify(&context).await.unwrap();
    let second = clf.classify(&context).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn every_tag_starts_with_a_top_branch() {
    let clf = classifier("Sustain.Continue.Prolong.Extend");
    let contexts = vec![
        ctx(("Hello there.", "human"), None, None),
        ctx(("Why is that?", "human"), Some(("I just did.", "human")), None),
        ctx(
            ("And then we went home.", "human"),
            Some(("We left the party early.", "bot")),
            Some("Sustain.Continue.Prolong.Extend"),
        ),
        ctx(
            ("It was in June.", "human"),
            Some(("When was it?", "bot")),
            None,
        ),
        ctx(("Some unseen phrase.", "human"), Some(("Hm.", "bot")), None),
    ];
    for context in &contexts {
        let tag = clf.classify(context).await.unwrap();
        assert!(
            ["Open", "Sustain", "React"].contains(&tag.first_segment()),
            "unexpected first segment in {tag}"
        );
    }
}

#[tokio::test]
async fn wrong_embedding_dimension_propagates() {
    let clf = SpeechFunctionClassifier::new(
        test_bundle("Sustain.Continue.Prolong.Extend"),
        Arc::new(MockEmbedder::new(DIM + 1)),
        Arc::new(MockFeatureExtractor),
    );
    let result = clf
        .classify(&ctx(
            ("Anything at all.", "human"),
            Some(("Hm.", "bot")),
            None,
        ))
        .await;
    match result {
        Err(ClassifyError::FeatureShape { expected, got }) => {
            assert_eq!(expected, DIM);
            assert_eq!(got, DIM + 1);
        }
        other => panic!("expected FeatureShape, got {other:?}"),
    }
}
