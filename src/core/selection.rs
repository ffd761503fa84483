/// Selection model — the current choice list and the highlighted index.

use thiserror::Error;

use crate::schema::node::ChoiceEdge;

/// Marker shown before the highlighted choice.
pub const SELECTED_PREFIX: &str = "> ";
/// Indent shown before every other choice, keeping labels column-aligned.
pub const UNSELECTED_PREFIX: &str = "  ";
/// Separator between rendered choices.
pub const CHOICE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no choices available to select")]
    EmptySelection,
}

/// The navigable choice list. The highlighted index is always in range while
/// options are non-empty; navigation on an empty list is a no-op.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    options: Vec<ChoiceEdge>,
    highlighted: usize,
}

impl SelectionModel {
    pub fn new() -> SelectionModel {
        SelectionModel::default()
    }

    /// Move the highlight up one entry, wrapping at the top.
    pub fn move_up(&mut self) {
        let n = self.options.len();
        if n > 0 {
            self.highlighted = (self.highlighted + n - 1) % n;
        }
    }

    /// Move the highlight down one entry, wrapping at the bottom.
    pub fn move_down(&mut self) {
        let n = self.options.len();
        if n > 0 {
            self.highlighted = (self.highlighted + 1) % n;
        }
    }

    /// Replace the option list and reset the highlight to the first entry.
    pub fn replace_options(&mut self, options: Vec<ChoiceEdge>) {
        self.options = options;
        self.highlighted = 0;
    }

    /// The currently highlighted choice.
    pub fn current_choice(&self) -> Result<&ChoiceEdge, SelectionError> {
        self.options
            .get(self.highlighted)
            .ok_or(SelectionError::EmptySelection)
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn options(&self) -> &[ChoiceEdge] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Render the full choice list with the highlight marker, one entry per
    /// block, so every line starts at the same column.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                out.push_str(CHOICE_SEPARATOR);
            }
            out.push_str(if i == self.highlighted {
                SELECTED_PREFIX
            } else {
                UNSELECTED_PREFIX
            });
            out.push_str(&option.label);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(labels: &[&str]) -> Vec<ChoiceEdge> {
        labels
            .iter()
            .map(|label| ChoiceEdge::terminal(*label))
            .collect()
    }

    #[test]
    fn move_down_wraps_around() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["a", "b", "c"]));
        for expected in [1, 2, 0, 1] {
            selection.move_down();
            assert_eq!(selection.highlighted(), expected);
        }
    }

    #[test]
    fn move_up_wraps_around() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["a", "b", "c"]));
        selection.move_up();
        assert_eq!(selection.highlighted(), 2);
        selection.move_up();
        assert_eq!(selection.highlighted(), 1);
    }

    #[test]
    fn n_moves_return_to_start() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["a", "b", "c", "d", "e"]));
        for _ in 0..selection.len() {
            selection.move_down();
        }
        assert_eq!(selection.highlighted(), 0);
        for _ in 0..selection.len() {
            selection.move_up();
        }
        assert_eq!(selection.highlighted(), 0);
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let mut selection = SelectionModel::new();
        selection.move_up();
        selection.move_down();
        assert_eq!(selection.highlighted(), 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn replace_resets_highlight() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["a", "b", "c"]));
        selection.move_down();
        selection.move_down();
        assert_eq!(selection.highlighted(), 2);
        selection.replace_options(options(&["x", "y"]));
        assert_eq!(selection.highlighted(), 0);
    }

    #[test]
    fn current_choice_on_empty_fails() {
        let selection = SelectionModel::new();
        assert!(matches!(
            selection.current_choice(),
            Err(SelectionError::EmptySelection)
        ));
    }

    #[test]
    fn current_choice_follows_highlight() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["a", "b"]));
        assert_eq!(selection.current_choice().unwrap().label, "a");
        selection.move_down();
        assert_eq!(selection.current_choice().unwrap().label, "b");
    }

    #[test]
    fn render_marks_highlighted_entry() {
        let mut selection = SelectionModel::new();
        selection.replace_options(options(&["Look", "Wait"]));
        assert_eq!(selection.render(), "> Look\n\n  Wait");
        selection.move_down();
        assert_eq!(selection.render(), "  Look\n\n> Wait");
    }
}
