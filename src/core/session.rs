/// Session controller — the orchestrator state machine.
///
/// Owns the current node, the selection model, the animator, and the
/// input-blocking flag. The host routes every key event through
/// [`Session::handle_input`] and every due timer through
/// [`Session::on_timer`]; while a reveal is running, all input is discarded.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::animator::{
    Animator, RunSignal, DEFAULT_CHAR_DELAY_MS, DEFAULT_COMPLETION_PAUSE_MS,
    DEFAULT_SAFETY_MARGIN_MS,
};
use crate::core::selection::SelectionModel;
use crate::core::surface::{Surface, SurfaceError};
use crate::core::timer::{TimerFired, TimerScheduler};
use crate::schema::graph::{DialogueGraph, GraphError};
use crate::schema::node::{ChoiceEdge, ChoiceTarget, NodeTag, StoryNode};

/// The four logical input actions the engine consumes. Hosts normalize their
/// key events to these; everything else is ignored at the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    NavigateUp,
    NavigateDown,
    Confirm,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for input.
    Idle,
    /// A reveal is in progress; input is blocked.
    Animating,
    /// The session has ended (or is revealing its closing message).
    Terminal,
}

/// What to do when a reveal finishes. Directives are plain data attached to
/// the animator run; the session interprets them, so a preempted run's
/// directive simply never executes.
#[derive(Debug, Clone)]
pub enum Continuation {
    /// Animate the choice list of the node whose text was just revealed.
    RevealChoices(Vec<ChoiceEdge>),
    /// Make the revealed choices selectable and unblock input.
    OfferChoices(Vec<ChoiceEdge>),
    /// The closing message finished; the session is over.
    EndStory,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("no story graph provided")]
    NoGraph,
}

/// Tag of the synthetic node shown when a choice leads nowhere.
pub const DIAGNOSTIC_TAG: &str = "diagnostic";

const DEFAULT_CLOSING_TEXT: &str = "The story ends here.";

fn diagnostic_node(dangling: &NodeTag) -> StoryNode {
    StoryNode {
        tag: NodeTag::from(DIAGNOSTIC_TAG),
        text: format!(
            "This path leads nowhere: no scene is written for '{dangling}'. \
             The story cannot continue from here."
        ),
        choices: vec![ChoiceEdge::terminal("Quit")],
    }
}

/// One playthrough of a dialogue graph, from the root node to a terminal
/// edge or an explicit quit.
#[derive(Debug)]
pub struct Session {
    graph: DialogueGraph,
    current: NodeTag,
    selection: SelectionModel,
    animator: Animator<Continuation>,
    input_blocked: bool,
    phase: SessionPhase,
    closing_text: String,
}

/// Builder for constructing a [`Session`].
pub struct SessionBuilder {
    graph: Option<DialogueGraph>,
    story_path: Option<PathBuf>,
    char_delay_ms: u64,
    completion_pause_ms: u64,
    safety_margin_ms: u64,
    closing_text: String,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            graph: None,
            story_path: None,
            char_delay_ms: DEFAULT_CHAR_DELAY_MS,
            completion_pause_ms: DEFAULT_COMPLETION_PAUSE_MS,
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
            closing_text: DEFAULT_CLOSING_TEXT.to_string(),
        }
    }

    /// Begin the session at the graph's root node.
    pub fn start(&mut self, sched: &mut dyn TimerScheduler, surface: &mut dyn Surface) {
        let root = self.graph.root().clone();
        match self.graph.lookup(&root) {
            Ok(node) => {
                let node = node.clone();
                self.enter_node(node, sched, surface);
            }
            Err(err) => {
                // Unreachable with a validated graph, but never a crash.
                warn!(tag = %root, error = %err, "root lookup failed; entering diagnostic node");
                self.enter_node(diagnostic_node(&root), sched, surface);
            }
        }
    }

    /// Feed one normalized input action into the session. While a reveal is
    /// running every action is discarded, which is what keeps the selection
    /// and current node stable during animation.
    pub fn handle_input(
        &mut self,
        action: InputAction,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) {
        if self.input_blocked || self.phase == SessionPhase::Animating {
            debug!(?action, "input discarded while a reveal is running");
            return;
        }
        if self.phase == SessionPhase::Terminal {
            debug!(?action, "input ignored after session end");
            return;
        }
        match action {
            InputAction::NavigateUp => {
                self.selection.move_up();
                self.redraw_choices(surface);
            }
            InputAction::NavigateDown => {
                self.selection.move_down();
                self.redraw_choices(surface);
            }
            InputAction::Confirm => self.confirm(sched, surface),
            InputAction::Quit => {
                debug!("session quit");
                self.animator.cancel(sched);
                self.phase = SessionPhase::Terminal;
            }
        }
    }

    /// Deliver a due timer from the host loop.
    pub fn on_timer(
        &mut self,
        fired: TimerFired,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) {
        let signal = match self.animator.on_timer(fired, sched, surface) {
            Ok(signal) => signal,
            Err(err) => {
                self.recover(err.into());
                return;
            }
        };
        match signal {
            RunSignal::Idle | RunSignal::Revealing => {}
            RunSignal::SafetyExpired => self.unblock(),
            RunSignal::Completed(Some(directive)) => {
                if let Err(err) = self.run_continuation(directive, sched, surface) {
                    self.recover(err);
                }
            }
            RunSignal::Completed(None) => self.unblock(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_input_blocked(&self) -> bool {
        self.input_blocked
    }

    /// True once the session reached the terminal phase and the closing
    /// reveal (if any) has finished.
    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Terminal && !self.animator.is_running()
    }

    pub fn current_tag(&self) -> &NodeTag {
        &self.current
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    fn enter_node(
        &mut self,
        node: StoryNode,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) {
        debug!(tag = %node.tag, "entering node");
        self.current = node.tag.clone();
        self.phase = SessionPhase::Animating;
        self.input_blocked = true;
        let continuation = Continuation::RevealChoices(node.choices);
        if let Err(err) = self.begin_reveal(&node.text, continuation, sched, surface) {
            self.recover(err);
        }
    }

    /// Clear the choice pane and start a text reveal chained to `then`.
    fn begin_reveal(
        &mut self,
        text: &str,
        then: Continuation,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<(), SessionError> {
        surface.render_choices("")?;
        self.animator
            .start_text_reveal(text, Some(then), sched, surface)?;
        Ok(())
    }

    fn confirm(&mut self, sched: &mut dyn TimerScheduler, surface: &mut dyn Surface) {
        let edge = match self.selection.current_choice() {
            Ok(edge) => edge.clone(),
            Err(err) => {
                // Every non-terminal node has at least one choice, so this
                // guard only trips on a session that never offered any.
                debug!(error = %err, "confirm with no choices available");
                return;
            }
        };
        debug!(label = %edge.label, "choice confirmed");
        match edge.target {
            ChoiceTarget::Terminal => {
                self.phase = SessionPhase::Terminal;
                self.input_blocked = true;
                let closing = self.closing_text.clone();
                if let Err(err) = self.begin_reveal(&closing, Continuation::EndStory, sched, surface)
                {
                    self.recover(err);
                }
            }
            ChoiceTarget::Node(tag) => match self.graph.lookup(&tag) {
                Ok(node) => {
                    let node = node.clone();
                    self.enter_node(node, sched, surface);
                }
                Err(err) => {
                    warn!(tag = %tag, error = %err, "dangling choice target; entering diagnostic node");
                    self.enter_node(diagnostic_node(&tag), sched, surface);
                }
            },
        }
    }

    fn run_continuation(
        &mut self,
        continuation: Continuation,
        sched: &mut dyn TimerScheduler,
        surface: &mut dyn Surface,
    ) -> Result<(), SessionError> {
        match continuation {
            Continuation::RevealChoices(choices) => {
                let labels: Vec<String> =
                    choices.iter().map(|choice| choice.label.clone()).collect();
                self.animator.start_choice_reveal(
                    &labels,
                    Some(Continuation::OfferChoices(choices)),
                    sched,
                    surface,
                )?;
                Ok(())
            }
            Continuation::OfferChoices(choices) => {
                self.selection.replace_options(choices);
                self.input_blocked = false;
                if self.phase == SessionPhase::Animating {
                    self.phase = SessionPhase::Idle;
                }
                debug!("choices offered; input unblocked");
                Ok(())
            }
            Continuation::EndStory => {
                self.input_blocked = false;
                debug!("story ended");
                Ok(())
            }
        }
    }

    fn redraw_choices(&mut self, surface: &mut dyn Surface) {
        if self.selection.is_empty() {
            return;
        }
        if let Err(err) = surface.render_choices(&self.selection.render()) {
            warn!(error = %err, "choice redraw failed");
        }
    }

    fn unblock(&mut self) {
        self.input_blocked = false;
        if self.phase == SessionPhase::Animating {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Error isolation for the completion path: a failed continuation must
    /// never leave the session blocked. The safety timer remains as the
    /// backstop, but recovery happens in the same scheduler tick.
    fn recover(&mut self, err: SessionError) {
        warn!(error = %err, "completion failed; unblocking input");
        self.unblock();
    }
}

impl SessionBuilder {
    pub fn with_graph(mut self, graph: DialogueGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Load the story table from a RON file at build time.
    pub fn story_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.story_path = Some(path.into());
        self
    }

    pub fn char_delay_ms(mut self, ms: u64) -> Self {
        self.char_delay_ms = ms;
        self
    }

    pub fn completion_pause_ms(mut self, ms: u64) -> Self {
        self.completion_pause_ms = ms;
        self
    }

    pub fn safety_margin_ms(mut self, ms: u64) -> Self {
        self.safety_margin_ms = ms;
        self
    }

    /// Message revealed after a terminal choice is confirmed.
    pub fn closing_text(mut self, text: impl Into<String>) -> Self {
        self.closing_text = text.into();
        self
    }

    pub fn build(self) -> Result<Session, SessionError> {
        let graph = match (self.graph, self.story_path) {
            (Some(graph), _) => graph,
            (None, Some(path)) => DialogueGraph::load_from_ron(&path)?,
            (None, None) => return Err(SessionError::NoGraph),
        };
        let current = graph.root().clone();
        Ok(Session {
            graph,
            current,
            selection: SelectionModel::new(),
            animator: Animator::with_timings(
                self.char_delay_ms,
                self.completion_pause_ms,
                self.safety_margin_ms,
            ),
            input_blocked: false,
            phase: SessionPhase::Idle,
            closing_text: self.closing_text,
        })
    }
}
