/// Story Linter — validates story tables and reports reachability problems.
///
/// Usage: story_linter <story_file_or_dir>
///
/// Validation failures (dangling targets, duplicate tags, choiceless nodes,
/// missing root) are errors; nodes unreachable from the root and stories
/// with no reachable ending are warnings.

use dialogue_engine::schema::graph::DialogueGraph;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <story_file_or_dir>");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if target.is_file() {
        lint_story(target, &mut errors, &mut warnings);
    } else if target.is_dir() {
        lint_recursive(target, &mut errors, &mut warnings);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    }

    println!("\n=== Story Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_recursive(dir: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                lint_recursive(&path, errors, warnings);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                lint_story(&path, errors, warnings);
            }
        }
    }
}

fn lint_story(path: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let graph = match DialogueGraph::load_from_ron(path) {
        Ok(graph) => graph,
        Err(err) => {
            errors.push(format!("{}: {}", path.display(), err));
            return;
        }
    };
    println!("  Loaded: {} ({} nodes)", path.display(), graph.len());

    for tag in graph.unreachable_tags() {
        warnings.push(format!(
            "{}: node '{}' is unreachable from the root",
            path.display(),
            tag
        ));
    }
    if !graph.has_reachable_ending() {
        warnings.push(format!(
            "{}: no ending is reachable from the root; the story can only be quit",
            path.display()
        ));
    }
    for node in graph.nodes() {
        if node.text.trim().is_empty() {
            warnings.push(format!(
                "{}: node '{}' has empty story text",
                path.display(),
                node.tag
            ));
        }
        for choice in &node.choices {
            if choice.label.trim().is_empty() {
                warnings.push(format!(
                    "{}: node '{}' has a choice with an empty label",
                    path.display(),
                    node.tag
                ));
            }
        }
    }
}
