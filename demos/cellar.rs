/// Cellar example — a scripted walkthrough of the embedded story.
///
/// Drives one fixed path through the graph with a manual scheduler and
/// prints each scene as it lands on the surface.
///
/// Run with: cargo run --example cellar

use dialogue_engine::core::session::{InputAction, Session};
use dialogue_engine::core::surface::RecordingSurface;
use dialogue_engine::core::timer::ManualScheduler;

fn main() {
    let graph = dialogue_engine::stories::cellar().expect("embedded story should be valid");

    let mut session = Session::builder()
        .with_graph(graph)
        .char_delay_ms(1)
        .completion_pause_ms(2)
        .closing_text("The cellar keeps its secrets. The story ends.")
        .build()
        .expect("session should build");

    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    print_scene("Title", &surface);

    // Start
    act(&mut session, &mut sched, &mut surface, &[InputAction::Confirm]);
    print_scene("Awakening", &surface);

    // Stay still and listen
    act(
        &mut session,
        &mut sched,
        &mut surface,
        &[
            InputAction::NavigateDown,
            InputAction::NavigateDown,
            InputAction::Confirm,
        ],
    );
    print_scene("Staying still", &surface);

    // Hide behind the crate
    act(&mut session, &mut sched, &mut surface, &[InputAction::Confirm]);
    print_scene("Hiding", &surface);

    // Hold your breath
    act(
        &mut session,
        &mut sched,
        &mut surface,
        &[
            InputAction::NavigateDown,
            InputAction::NavigateDown,
            InputAction::Confirm,
        ],
    );
    print_scene("Holding your breath", &surface);

    // Exhale quietly
    act(&mut session, &mut sched, &mut surface, &[InputAction::Confirm]);
    print_scene("Exhaling", &surface);

    // Stay put until the footsteps fade
    act(
        &mut session,
        &mut sched,
        &mut surface,
        &[InputAction::NavigateDown, InputAction::Confirm],
    );
    print_scene("Silence", &surface);

    // Drift into sleep — a quiet ending
    act(&mut session, &mut sched, &mut surface, &[InputAction::Confirm]);
    print_scene("Ending", &surface);

    assert!(session.is_ended());
    println!("--- session ended after {} simulated ms ---", sched.now_ms());
}

fn act(
    session: &mut Session,
    sched: &mut ManualScheduler,
    surface: &mut RecordingSurface,
    actions: &[InputAction],
) {
    for action in actions {
        session.handle_input(*action, sched, surface);
    }
    settle(session, sched, surface);
}

fn settle(session: &mut Session, sched: &mut ManualScheduler, surface: &mut RecordingSurface) {
    while let Some(fired) = sched.step() {
        session.on_timer(fired, sched, surface);
    }
}

fn print_scene(title: &str, surface: &RecordingSurface) {
    println!("=== {} ===", title);
    println!("{}", surface.story);
    if !surface.choices.is_empty() {
        println!("{}", surface.choices.trim_end());
    }
    println!();
}
