//! Story tables embedded in the library, for the demos and for hosts that
//! want a playable story without shipping data files.

use crate::schema::graph::{DialogueGraph, GraphError};

/// RON source of the cellar story, title screen included.
pub const CELLAR_STORY: &str = include_str!("../story_data/cellar/story.ron");

/// Parse the embedded cellar story.
pub fn cellar() -> Result<DialogueGraph, GraphError> {
    DialogueGraph::parse_ron(CELLAR_STORY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::NodeTag;

    #[test]
    fn cellar_story_is_valid() {
        let graph = cellar().unwrap();
        assert_eq!(graph.root(), &NodeTag::from("title"));
        assert!(graph.contains(&NodeTag::from("awakening")));
        assert!(graph.contains(&NodeTag::from("hold_breath")));
    }

    #[test]
    fn cellar_story_is_fully_connected() {
        let graph = cellar().unwrap();
        assert!(graph.unreachable_tags().is_empty());
        assert!(graph.has_reachable_ending());
    }
}
