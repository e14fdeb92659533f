//! The fixed speech-function label taxonomy

use crate::types::{ClassifyError, SpeechFunction};
use std::collections::HashMap;

/// Tree of legal tag segments. Static, read-only, constructed once and held
/// by the classifier for the lifetime of the process.
///
/// Nodes marked extensible admit classifier-supplied leaves below them
/// (the Reply/Respond/Sustain models carry their own trained label sets),
/// so e.g. `React.Respond.Reply.Acknowledge` validates even though only the
/// common leaves are listed here.
#[derive(Debug)]
pub struct Taxonomy {
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<&'static str, Node>,
    extensible: bool,
}

/// Legal segment paths. A trailing `*` marks the node extensible.
const PATHS: &[&str] = &[
    "Open.Attend",
    "Open.Give.Fact",
    "Open.Give.Opinion",
    "Open.Demand.Fact",
    "Open.Demand.Opinion",
    "Sustain.Continue.Monitor",
    "Sustain.Continue.Prolong.*",
    "Sustain.Continue.Prolong.Extend",
    "Sustain.Continue.Prolong.Enhance",
    "Sustain.Continue.Prolong.Elaborate",
    "React.Respond.Develop.*",
    "React.Respond.Develop.Extend",
    "React.Respond.Develop.Enhance",
    "React.Respond.Develop.Elaborate",
    "React.Respond.Reply.*",
    "React.Respond.Reply.Affirm",
    "React.Respond.Reply.Agree",
    "React.Respond.Reply.Acknowledge",
    "React.Respond.Reply.Disagree",
    "React.Respond.Reply.Contradict",
    "React.Respond.Response.Resolve",
    "React.Rejoinder.Track.Check",
    "React.Rejoinder.Track.Confirm",
    "React.Rejoinder.Track.Clarify",
    "React.Rejoinder.Track.Probe",
    "React.Rejoinder.Rebound",
    "React.Rejoinder.Re-challenge",
    "React.Rejoinder.Counter",
    "React.Rejoinder.Response.Resolve",
];

const TOP_SEGMENTS: [&str; 3] = ["Open", "Sustain", "React"];

impl Taxonomy {
    /// Build the standard exchange-structure taxonomy.
    pub fn standard() -> Self {
        let mut root = Node::default();
        for path in PATHS {
            let mut node = &mut root;
            for segment in path.split('.') {
                if segment == "*" {
                    node.extensible = true;
                    break;
                }
                node = node.children.entry(segment).or_default();
            }
        }
        Self { root }
    }

    /// Whether the tag is a path in the tree, or a terminal extension of an
    /// extensible node. Bare branch paths (e.g. `React.Respond.Develop`)
    /// are legal.
    pub fn contains(&self, tag: &SpeechFunction) -> bool {
        if !TOP_SEGMENTS.contains(&tag.first_segment()) {
            return false;
        }
        let mut node = &self.root;
        let mut segments = tag.segments();
        while let Some(segment) = segments.next() {
            match node.children.get(segment) {
                Some(child) => node = child,
                // An extensible node admits exactly one extra leaf segment.
                None => return node.extensible && segments.next().is_none(),
            }
        }
        true
    }

    pub fn validate(&self, tag: &SpeechFunction) -> Result<(), ClassifyError> {
        if tag.as_str().is_empty() {
            return Err(ClassifyError::InvalidTag(String::new()));
        }
        if self.contains(tag) {
            Ok(())
        } else {
            Err(ClassifyError::InvalidTag(tag.as_str().to_string()))
        }
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}
