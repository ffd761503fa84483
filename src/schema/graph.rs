/// The dialogue graph — an immutable tag → node table with eager validation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use thiserror::Error;

use super::node::{ChoiceTarget, NodeTag, StoryNode};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown tag: {0}")]
    UnknownTag(NodeTag),
    #[error("duplicate node tag: {0}")]
    DuplicateTag(NodeTag),
    #[error("root tag '{0}' has no node")]
    MissingRoot(NodeTag),
    #[error("choice '{label}' in node '{from}' leads to missing node '{to}'")]
    DanglingEdge {
        from: NodeTag,
        label: String,
        to: NodeTag,
    },
    #[error("node '{0}' has no choices")]
    NoChoices(NodeTag),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

// The on-disk shape of a story table. Node order in the file is only the
// authoring order; the graph itself is keyed by tag.
#[derive(Debug, Serialize, Deserialize)]
struct StoryTable {
    root: NodeTag,
    nodes: Vec<StoryNode>,
}

/// An immutable mapping from node tags to story nodes, built once at startup.
///
/// Construction validates the whole table: duplicate tags, a missing root,
/// choiceless nodes, and edges leading to nonexistent nodes are all rejected
/// before any session starts.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    root: NodeTag,
    nodes: FxHashMap<NodeTag, StoryNode>,
}

impl DialogueGraph {
    /// Build and validate a graph from a node list.
    pub fn new(root: impl Into<NodeTag>, nodes: Vec<StoryNode>) -> Result<DialogueGraph, GraphError> {
        let root = root.into();
        let mut table = FxHashMap::default();
        for node in nodes {
            if table.contains_key(&node.tag) {
                return Err(GraphError::DuplicateTag(node.tag));
            }
            table.insert(node.tag.clone(), node);
        }
        let graph = DialogueGraph { root, nodes: table };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&self.root) {
            return Err(GraphError::MissingRoot(self.root.clone()));
        }
        for node in self.nodes.values() {
            if node.choices.is_empty() {
                return Err(GraphError::NoChoices(node.tag.clone()));
            }
            for choice in &node.choices {
                if let Some(tag) = choice.target.tag() {
                    if !self.nodes.contains_key(tag) {
                        return Err(GraphError::DanglingEdge {
                            from: node.tag.clone(),
                            label: choice.label.clone(),
                            to: tag.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse a story table from a RON string.
    pub fn parse_ron(input: &str) -> Result<DialogueGraph, GraphError> {
        let table: StoryTable = ron::from_str(input)?;
        Self::new(table.root, table.nodes)
    }

    /// Load a story table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<DialogueGraph, GraphError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Merge another graph's nodes into this one. Nodes from `other` override
    /// nodes with the same tag; the root stays this graph's root.
    pub fn merge(&mut self, other: DialogueGraph) {
        for (tag, node) in other.nodes {
            self.nodes.insert(tag, node);
        }
    }

    /// Look up a node by tag.
    pub fn lookup(&self, tag: &NodeTag) -> Result<&StoryNode, GraphError> {
        self.nodes
            .get(tag)
            .ok_or_else(|| GraphError::UnknownTag(tag.clone()))
    }

    pub fn root(&self) -> &NodeTag {
        &self.root
    }

    pub fn contains(&self, tag: &NodeTag) -> bool {
        self.nodes.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    /// Tags that cannot be reached from the root by following choice edges.
    /// Validation does not reject these; the linter reports them as warnings.
    pub fn unreachable_tags(&self) -> Vec<NodeTag> {
        let reached = self.reachable_from_root();
        let mut unreachable: Vec<NodeTag> = self
            .nodes
            .keys()
            .filter(|tag| !reached.contains_key(*tag))
            .cloned()
            .collect();
        unreachable.sort_by(|a, b| a.0.cmp(&b.0));
        unreachable
    }

    /// True if at least one terminal edge is reachable from the root. A story
    /// without one can never end except by quitting.
    pub fn has_reachable_ending(&self) -> bool {
        let reached = self.reachable_from_root();
        reached.values().any(|node| {
            node.choices
                .iter()
                .any(|choice| choice.target.is_terminal())
        })
    }

    fn reachable_from_root(&self) -> FxHashMap<&NodeTag, &StoryNode> {
        let mut reached = FxHashMap::default();
        let mut queue = VecDeque::new();
        if let Some(root) = self.nodes.get(&self.root) {
            reached.insert(&root.tag, root);
            queue.push_back(root);
        }
        while let Some(node) = queue.pop_front() {
            for choice in &node.choices {
                if let Some(tag) = choice.target.tag() {
                    if let Some(next) = self.nodes.get(tag) {
                        if reached.insert(&next.tag, next).is_none() {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        reached
    }
}
