use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for story node tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTag(pub String);

impl NodeTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeTag {
    fn from(tag: &str) -> Self {
        NodeTag(tag.to_string())
    }
}

impl From<String> for NodeTag {
    fn from(tag: String) -> Self {
        NodeTag(tag)
    }
}

/// Where a choice leads: another story node, or the end of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceTarget {
    Node(NodeTag),
    Terminal,
}

impl ChoiceTarget {
    /// The tag this target points at, or `None` for a terminal edge.
    pub fn tag(&self) -> Option<&NodeTag> {
        match self {
            Self::Node(tag) => Some(tag),
            Self::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// A labeled transition out of a story node.
///
/// Edges are structured records built once at graph construction; the label
/// is display text only and is never parsed to find the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEdge {
    pub label: String,
    pub target: ChoiceTarget,
}

impl ChoiceEdge {
    /// An edge leading to another node.
    pub fn to_node(label: impl Into<String>, target: impl Into<NodeTag>) -> Self {
        ChoiceEdge {
            label: label.into(),
            target: ChoiceTarget::Node(target.into()),
        }
    }

    /// An edge that ends the session.
    pub fn terminal(label: impl Into<String>) -> Self {
        ChoiceEdge {
            label: label.into(),
            target: ChoiceTarget::Terminal,
        }
    }
}

/// One narrative beat: body text plus the choices leading out of it.
///
/// Immutable once the graph is built. Choices keep their authored order;
/// the engine never sorts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    pub tag: NodeTag,
    pub text: String,
    pub choices: Vec<ChoiceEdge>,
}
