use clap::Parser;
use stageline::prelude::*;
use std::fs;
use std::io::{self, Write};

/// Render a workflow diagram definition to SVG, optionally replaying a
/// sequence of transitions first.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the diagram definition JSON file
    definition_path: String,

    /// Navigate to a stage (label or 0-based index) before rendering
    #[arg(long)]
    goto: Option<String>,

    /// Advance the workflow this many steps before rendering
    #[arg(long, default_value_t = 0)]
    advance: u32,

    /// Fail the active stage before rendering
    #[arg(long)]
    fail: bool,

    /// Output file for the SVG document (stdout when omitted)
    #[arg(short, long)]
    out: Option<String>,

    /// Print a status outline of the flow to stderr
    #[arg(long)]
    outline: bool,
}

fn main() {
    let cli = Cli::parse();

    let definition_json = fs::read_to_string(&cli.definition_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read definition file '{}': {}",
            &cli.definition_path, e
        ))
    });

    let definition = DiagramDefinition::from_json(&definition_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse definition: {}", e)));

    let mut flow = definition
        .build_svg()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build diagram: {}", e)));

    if let Some(target) = &cli.goto {
        navigate(&mut flow, target)
            .unwrap_or_else(|e| exit_with_error(&format!("Navigation failed: {}", e)));
    }

    for _ in 0..cli.advance {
        flow.next()
            .unwrap_or_else(|e| exit_with_error(&format!("Advance failed: {}", e)));
    }

    if cli.fail {
        flow.fail()
            .unwrap_or_else(|e| exit_with_error(&format!("Fail transition failed: {}", e)));
    }

    if cli.outline {
        eprint!("{}", outline(&flow));
    }

    let svg = flow.to_svg();
    match cli.out {
        Some(path) => fs::write(&path, svg).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write SVG to '{}': {}", path, e))
        }),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write SVG: {}", e)));
        }
    }
}

/// Navigates by index when the target parses as one, by label otherwise.
fn navigate(flow: &mut Flow<SvgCanvas>, target: &str) -> Result<(), FlowError> {
    match target.parse::<usize>() {
        Ok(index) => flow.goto_stage(index),
        Err(_) => flow.goto_stage(target),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
