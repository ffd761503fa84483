/// Title menu example — the menu is just more graph.
///
/// Builds a three-node graph in code where the title screen, an about page,
/// and the story proper are ordinary nodes, so no separate menu mode or
/// screen switching exists anywhere.
///
/// Run with: cargo run --example title_menu

use dialogue_engine::core::session::{InputAction, Session};
use dialogue_engine::core::surface::RecordingSurface;
use dialogue_engine::core::timer::ManualScheduler;
use dialogue_engine::schema::graph::DialogueGraph;
use dialogue_engine::schema::node::{ChoiceEdge, NodeTag, StoryNode};

fn main() {
    let graph = DialogueGraph::new(
        "menu",
        vec![
            StoryNode {
                tag: NodeTag::from("menu"),
                text: "ECHOES\n\nAn evening of small decisions.".to_string(),
                choices: vec![
                    ChoiceEdge::to_node("New game", "porch"),
                    ChoiceEdge::to_node("About", "about"),
                    ChoiceEdge::terminal("Exit"),
                ],
            },
            StoryNode {
                tag: NodeTag::from("about"),
                text: "The title screen is a story node like any other; \
                       'Back' is just an edge pointing at it."
                    .to_string(),
                choices: vec![ChoiceEdge::to_node("Back", "menu")],
            },
            StoryNode {
                tag: NodeTag::from("porch"),
                text: "You stand on the porch as the light goes amber.".to_string(),
                choices: vec![ChoiceEdge::terminal("Watch the sun go down")],
            },
        ],
    )
    .expect("menu graph should be valid");

    let mut session = Session::builder()
        .with_graph(graph)
        .char_delay_ms(1)
        .completion_pause_ms(2)
        .build()
        .expect("session should build");

    let mut sched = ManualScheduler::new();
    let mut surface = RecordingSurface::new();

    session.start(&mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    show("Menu", &surface);

    // Browse down to About and open it
    session.handle_input(InputAction::NavigateDown, &mut sched, &mut surface);
    show("Menu, About highlighted", &surface);
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    show("About", &surface);

    // Back to the menu, then start the story
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    show("Porch", &surface);

    // And out
    session.handle_input(InputAction::Confirm, &mut sched, &mut surface);
    settle(&mut session, &mut sched, &mut surface);
    show("Ending", &surface);

    assert!(session.is_ended());
}

fn settle(session: &mut Session, sched: &mut ManualScheduler, surface: &mut RecordingSurface) {
    while let Some(fired) = sched.step() {
        session.on_timer(fired, sched, surface);
    }
}

fn show(title: &str, surface: &RecordingSurface) {
    println!("=== {} ===", title);
    println!("{}", surface.story);
    if !surface.choices.is_empty() {
        println!("{}", surface.choices.trim_end());
    }
    println!();
}
