/// The rendering seam between the engine and its host.

use thiserror::Error;

/// A presentation-surface write was rejected by the host.
#[derive(Debug, Error)]
#[error("surface rejected write: {0}")]
pub struct SurfaceError(pub String);

/// The two panes the engine writes to: story text and the choice list.
///
/// Writes are idempotent and last-write-wins; the engine re-renders the full
/// pane content on every update rather than diffing. A failing write is
/// recovered by the session (input is unblocked), so hosts may return errors
/// freely.
pub trait Surface {
    fn render_story(&mut self, text: &str) -> Result<(), SurfaceError>;
    fn render_choices(&mut self, text: &str) -> Result<(), SurfaceError>;
}

/// Surface that records the last write to each pane. Used by the test suites
/// and the demos.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub story: String,
    pub choices: String,
    pub story_writes: usize,
    pub choice_writes: usize,
}

impl RecordingSurface {
    pub fn new() -> RecordingSurface {
        RecordingSurface::default()
    }
}

impl Surface for RecordingSurface {
    fn render_story(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.story.clear();
        self.story.push_str(text);
        self.story_writes += 1;
        Ok(())
    }

    fn render_choices(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.choices.clear();
        self.choices.push_str(text);
        self.choice_writes += 1;
        Ok(())
    }
}
