/// Session integration tests — full traversal scenarios driven through a
/// manual scheduler, including the liveness guarantees around blocked input.

use dialogue_engine::core::session::{InputAction, Session, SessionPhase};
use dialogue_engine::core::surface::{RecordingSurface, Surface, SurfaceError};
use dialogue_engine::core::timer::ManualScheduler;
use dialogue_engine::schema::graph::DialogueGraph;
use dialogue_engine::schema::node::NodeTag;

fn mini_graph() -> DialogueGraph {
    DialogueGraph::parse_ron(
        r#"(
            root: "start",
            nodes: [
                (
                    tag: "start",
                    text: "Hello",
                    choices: [
                        (label: "Go", target: Node("room1")),
                    ],
                ),
                (
                    tag: "room1",
                    text: "Room",
                    choices: [
                        (label: "End", target: Terminal),
                    ],
                ),
            ],
        )"#,
    )
    .unwrap()
}

fn settle(session: &mut Session, sched: &mut ManualScheduler, surface: &mut dyn Surface) {
    while let Some(fired) = sched.step() {
        session.on_timer(fired, sched, surface);
    }
}

#[test]
fn end_to_end_two_room_scenario() {
    let mut session = Session::builder().with_graph(mini_graph()).build().unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);

    assert_eq!(surface.story, "Hello");
    assert_eq!(surface.choices, "> Go\n\n");
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.is_input_blocked());

    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("room1"));
    settle(&mut session, &mut sched, &mut surface);

    assert_eq!(surface.story, "Room");
    assert_eq!(surface.choices, "> End\n\n");

    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    assert_eq!(session.phase(), SessionPhase::Terminal);
    settle(&mut session, &mut sched, &mut surface);

    assert!(session.is_ended());
    assert_eq!(surface.story, "The story ends here.");
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn navigation_while_animating_is_a_noop() {
    let mut session = Session::builder().with_graph(mini_graph()).build().unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    // Immediately after the reveal begins, before completion
    session.handle_input(InputAction::NavigateDown, &mut sched, &mut surface);
    session.handle_input(InputAction::NavigateUp, &mut sched, &mut surface);
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);

    assert_eq!(session.selection().highlighted(), 0);
    assert_eq!(session.current_tag(), &NodeTag::from("start"));
    assert!(session.is_input_blocked());

    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("start"));
    assert!(!session.is_input_blocked());
}

#[test]
fn wrap_around_navigation_in_a_live_session() {
    let graph = DialogueGraph::parse_ron(
        r#"(
            root: "start",
            nodes: [
                (
                    tag: "start",
                    text: "Pick",
                    choices: [
                        (label: "First", target: Terminal),
                        (label: "Second", target: Terminal),
                        (label: "Third", target: Terminal),
                    ],
                ),
            ],
        )"#,
    )
    .unwrap();
    let mut session = Session::builder().with_graph(graph).build().unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.selection().len(), 3);

    for _ in 0..3 {
        session.handle_input(InputAction::NavigateDown, &mut sched, &mut surface);
    }
    assert_eq!(session.selection().highlighted(), 0);

    session.handle_input(InputAction::NavigateUp, &mut sched, &mut surface);
    assert_eq!(session.selection().highlighted(), 2);
    assert_eq!(surface.choices, "  First\n\n  Second\n\n> Third");
}

/// Surface whose choice pane can be made to reject writes, standing in for a
/// completion handler that throws.
#[derive(Default)]
struct FlakySurface {
    inner: RecordingSurface,
    fail_choices: bool,
}

impl Surface for FlakySurface {
    fn render_story(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.inner.render_story(text)
    }

    fn render_choices(&mut self, text: &str) -> Result<(), SurfaceError> {
        if self.fail_choices {
            return Err(SurfaceError("choice pane unavailable".to_string()));
        }
        self.inner.render_choices(text)
    }
}

#[test]
fn failing_completion_unblocks_within_one_tick() {
    let mut session = Session::builder()
        .with_graph(mini_graph())
        .char_delay_ms(10)
        .completion_pause_ms(100)
        .safety_margin_ms(60_000)
        .build()
        .unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = FlakySurface::default();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert!(!session.is_input_blocked());

    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    assert!(session.is_input_blocked());

    // Break the choice pane while the story reveal is running; the failure
    // hits when the completion directive tries to start the choice reveal.
    surface.fail_choices = true;
    let mut unblocked_at = None;
    while let Some(fired) = sched.step() {
        session.on_timer(fired, &mut sched, &mut surface);
        if !session.is_input_blocked() {
            unblocked_at = Some(sched.now_ms());
            break;
        }
    }

    // Unblocked in the same tick as the failure, far inside the safety
    // window, with no timers left behind.
    let unblocked_at = unblocked_at.expect("session never unblocked");
    assert!(unblocked_at < 1_000, "unblocked only at {unblocked_at}ms");
    assert_eq!(sched.pending_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[test]
fn quit_is_idempotent_and_cancels_cleanly() {
    let mut session = Session::builder().with_graph(mini_graph()).build().unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);

    session.handle_input(InputAction::Quit, &mut sched, &mut surface);
    session.handle_input(InputAction::Quit, &mut sched, &mut surface);

    assert!(session.is_ended());
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn cellar_story_plays_through_the_escape_route() {
    let graph = dialogue_engine::stories::cellar().unwrap();
    let mut session = Session::builder()
        .with_graph(graph)
        .char_delay_ms(1)
        .completion_pause_ms(5)
        .build()
        .unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("title"));

    // Start -> awakening
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("awakening"));
    assert!(surface.story.starts_with("You wake up in total darkness."));

    // Look around -> the door -> out
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("look_around"));

    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(session.current_tag(), &NodeTag::from("open_door"));

    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert!(session.is_ended());
}

#[test]
fn session_from_story_file() {
    let mut session = Session::builder()
        .story_path("tests/fixtures/mini_story.ron")
        .char_delay_ms(1)
        .completion_pause_ms(1)
        .build()
        .unwrap();
    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    assert_eq!(surface.story, "Hello");
}
