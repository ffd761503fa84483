/// Play — line-based terminal player for story tables.
///
/// Usage: play [--story <path>] [--delay <ms>] [--instant]
///
/// With no --story argument the embedded cellar story is played.
///
/// Commands at the prompt:
///   u / up      — move the highlight up
///   d / down    — move the highlight down
///   (empty) / c — confirm the highlighted choice
///   q / quit    — quit the session
///   help        — list commands

use dialogue_engine::core::session::{InputAction, Session};
use dialogue_engine::core::surface::{Surface, SurfaceError};
use dialogue_engine::core::timer::ManualScheduler;
use dialogue_engine::schema::graph::DialogueGraph;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut story_path = None;
    let mut delay_ms: u64 = 25;
    let mut instant = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--story" if i + 1 < args.len() => {
                i += 1;
                story_path = Some(args[i].clone());
            }
            "--delay" if i + 1 < args.len() => {
                i += 1;
                delay_ms = args[i].parse().unwrap_or(25);
            }
            "--instant" => instant = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let graph = match &story_path {
        Some(path) => match DialogueGraph::load_from_ron(Path::new(path)) {
            Ok(graph) => graph,
            Err(err) => {
                eprintln!("ERROR: Failed to load story '{}': {}", path, err);
                std::process::exit(1);
            }
        },
        None => match dialogue_engine::stories::cellar() {
            Ok(graph) => graph,
            Err(err) => {
                eprintln!("ERROR: embedded story failed to load: {}", err);
                std::process::exit(1);
            }
        },
    };

    println!("Loaded {} story nodes", graph.len());
    println!("Type 'help' for commands.\n");

    let mut session = match Session::builder()
        .with_graph(graph)
        .char_delay_ms(delay_ms)
        .completion_pause_ms(if instant { 0 } else { 400 })
        .build()
    {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let mut sched = ManualScheduler::new();
    let mut surface = ConsoleSurface::default();

    session.start(&mut sched, &mut surface);
    run_to_idle(&mut session, &mut sched, &mut surface, instant);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let action = match line.trim() {
            "u" | "up" => InputAction::NavigateUp,
            "d" | "down" => InputAction::NavigateDown,
            "" | "c" | "confirm" => InputAction::Confirm,
            "q" | "quit" => InputAction::Quit,
            "help" => {
                println!("u/up, d/down, (empty)/c to confirm, q to quit");
                continue;
            }
            other => {
                println!("Unknown command '{}'; type 'help'", other);
                continue;
            }
        };
        session.handle_input(action, &mut sched, &mut surface);
        run_to_idle(&mut session, &mut sched, &mut surface, instant);
        if session.is_ended() {
            break;
        }
    }

    println!("\nGoodbye.");
}

fn print_usage() {
    println!("Usage: play [--story <path>] [--delay <ms>] [--instant]");
}

/// Drain the scheduler, sleeping until each timer comes due so the reveal
/// plays out in real time.
fn run_to_idle(
    session: &mut Session,
    sched: &mut ManualScheduler,
    surface: &mut ConsoleSurface,
    instant: bool,
) {
    while let Some(wait_ms) = sched.next_due_in() {
        if !instant && wait_ms > 0 {
            std::thread::sleep(Duration::from_millis(wait_ms));
        }
        if let Some(fired) = sched.step() {
            session.on_timer(fired, sched, surface);
        }
    }
    if !session.is_input_blocked() && !session.is_ended() {
        print!("\n> ");
        let _ = io::stdout().flush();
    }
}

/// Incremental stdout surface: appends when the new pane content extends the
/// old, reprints the pane otherwise.
#[derive(Default)]
struct ConsoleSurface {
    story: String,
    choices: String,
}

impl ConsoleSurface {
    fn write_pane(last: &mut String, text: &str) {
        if text.is_empty() {
            if !last.is_empty() {
                println!();
            }
        } else if let Some(suffix) = text.strip_prefix(last.as_str()) {
            print!("{}", suffix);
        } else {
            print!("\n{}", text);
        }
        let _ = io::stdout().flush();
        last.clear();
        last.push_str(text);
    }
}

impl Surface for ConsoleSurface {
    fn render_story(&mut self, text: &str) -> Result<(), SurfaceError> {
        ConsoleSurface::write_pane(&mut self.story, text);
        Ok(())
    }

    fn render_choices(&mut self, text: &str) -> Result<(), SurfaceError> {
        ConsoleSurface::write_pane(&mut self.choices, text);
        Ok(())
    }
}
