//! Open-branch resolver: Fact/Opinion, Give/Demand, and the Attend override

use crate::features::LinguisticFeatures;
use crate::models::ModelBundle;
use crate::types::{ClassifyError, SpeechFunction};
use tracing::debug;

/// Outcome of the Open-branch rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenCategory {
    GiveFact,
    DemandFact,
    GiveOpinion,
    DemandOpinion,
    Attend,
}

impl OpenCategory {
    pub fn tag(self) -> SpeechFunction {
        match self {
            OpenCategory::GiveFact => SpeechFunction::new("Open.Give.Fact"),
            OpenCategory::DemandFact => SpeechFunction::new("Open.Demand.Fact"),
            OpenCategory::GiveOpinion => SpeechFunction::new("Open.Give.Opinion"),
            OpenCategory::DemandOpinion => SpeechFunction::new("Open.Demand.Opinion"),
            OpenCategory::Attend => SpeechFunction::new("Open.Attend"),
        }
    }
}

/// Pure rule table for the Open branch:
/// - Fact vs Opinion comes from the classifier;
/// - a question mark demands rather than gives;
/// - short utterances containing a proper noun are greetings/address forms
///   and override everything with `Attend`.
pub fn open_category(
    is_opinion: bool,
    has_question_mark: bool,
    token_count: usize,
    has_proper_noun: bool,
) -> OpenCategory {
    if token_count < 4 && has_proper_noun {
        return OpenCategory::Attend;
    }
    match (is_opinion, has_question_mark) {
        (false, false) => OpenCategory::GiveFact,
        (false, true) => OpenCategory::DemandFact,
        (true, false) => OpenCategory::GiveOpinion,
        (true, true) => OpenCategory::DemandOpinion,
    }
}

/// Run the Fact/Opinion classifier on the scaled count vector and apply the
/// rule table above.
pub fn resolve(
    features: &LinguisticFeatures,
    bundle: &ModelBundle,
    text: &str,
) -> Result<SpeechFunction, ClassifyError> {
    let scaled = bundle.scaler.transform(&features.to_vector())?;
    let label = bundle.fact_opinion.predict(&scaled)?;
    let is_opinion = label == "1" || label.eq_ignore_ascii_case("opinion");
    let category = open_category(
        is_opinion,
        text.contains('?'),
        features.token_count,
        features.has_proper_noun,
    );
    debug!(?category, "open branch resolved");
    Ok(category.tag())
}
