//! REPL – Read-Eval-Print Loop for the Spacia interactive shell.
//!
//! Supported slash-commands:
//!   /help            – show this list
//!   /load <file>     – load a scene (JSON array of objects)
//!   /objects         – list the fact base
//!   /relations <id>  – spatial relations observed from one object
//!   /chain           – stages of the last executed pipeline
//!   /quit | /exit    – leave the shell
//!
//! Any other input runs as a pipe-delimited pipeline against the fact base.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use spacia_geometry::SpatialObject;
use spacia_pipeline::Reasoner;
use spacia_types::SpatialError;

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(mut reasoner: Reasoner, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "spacia>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        match cmd {
            "/help" => cmd_help(),
            "/objects" => cmd_objects(&reasoner),
            "/chain" => cmd_chain(&reasoner),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            _ if cmd.starts_with("/load") => {
                let path = cmd.trim_start_matches("/load").trim();
                if path.is_empty() {
                    println!("{} /load <file>", "Usage:".yellow());
                } else {
                    match load_scene(&mut reasoner, path) {
                        Ok(count) => println!(
                            "  Loaded {} object(s) from {}",
                            count.to_string().bold(),
                            path.bold()
                        ),
                        Err(e) => println!("{}: {}", "Scene error".red(), e),
                    }
                }
            }
            _ if cmd.starts_with("/relations") => {
                let id = cmd.trim_start_matches("/relations").trim();
                cmd_relations(&mut reasoner, id);
            }
            _ if cmd.starts_with('/') => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    cmd.yellow(),
                    "/help".bold()
                );
            }
            pipeline => run_pipeline(&mut reasoner, pipeline),
        }
    }
}

/// Load a JSON array of spatial objects into the reasoner.
pub fn load_scene(reasoner: &mut Reasoner, path: &str) -> Result<usize, SpatialError> {
    let text = std::fs::read_to_string(path).map_err(|e| SpatialError::Import(e.to_string()))?;
    let objects: Vec<SpatialObject> =
        serde_json::from_str(&text).map_err(|e| SpatialError::Import(e.to_string()))?;
    let count = objects.len();
    reasoner.load(objects);
    Ok(count)
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Spacia Commands".bold().underline());
    println!("  {}            – load a scene file (JSON array)", "/load <file>".bold().cyan());
    println!("  {}                – list the fact base",          "/objects".bold().cyan());
    println!("  {}         – relations observed from an object",  "/relations <id>".bold().cyan());
    println!("  {}                  – stages of the last pipeline", "/chain".bold().cyan());
    println!("  {}             – leave the shell",                "/quit  /exit".bold().cyan());
    println!();
    println!("  Anything else runs as a pipeline, e.g.");
    println!("    {}", "isa(furniture) | pick(ontop) | sort(volume <)".dimmed());
    println!();
}

fn cmd_objects(reasoner: &Reasoner) {
    let objects = reasoner.objects();
    if objects.is_empty() {
        println!("  {}", "Fact base is empty; use /load <file>.".dimmed());
        return;
    }
    println!("{}", "Fact Base".bold().underline());
    for (index, object) in objects.iter().enumerate() {
        let name = if object.label.is_empty() {
            object.id.clone()
        } else {
            format!("{} ({})", object.id, object.label)
        };
        println!(
            "  #{index:<3} {:<24} {:.2} x {:.2} x {:.2} m at ({:.2}, {:.2}, {:.2})",
            name.bold(),
            object.width,
            object.height,
            object.depth,
            object.position.x,
            object.position.y,
            object.position.z,
        );
    }
}

fn cmd_relations(reasoner: &mut Reasoner, id: &str) {
    if id.is_empty() {
        println!("{} /relations <id>", "Usage:".yellow());
        return;
    }
    let Some(index) = reasoner.objects().iter().position(|o| o.id == id) else {
        println!("{} '{}'", "Unknown object:".red(), id.yellow());
        return;
    };
    match reasoner.relations_of(index) {
        Ok(relations) if relations.is_empty() => {
            println!("  {}", "No relations observed.".dimmed());
        }
        Ok(relations) => {
            println!("{}", format!("Relations of {id}").bold().underline());
            for relation in &relations {
                println!("  • {}", relation.describe(reasoner.objects()));
            }
        }
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_chain(reasoner: &Reasoner) {
    let chain = reasoner.chain();
    if chain.is_empty() {
        println!("  {}", "No pipeline has run yet.".dimmed());
        return;
    }
    println!("{}", "Inference Chain".bold().underline());
    for (step, stage) in chain.iter().enumerate() {
        let status = if stage.succeeded {
            "ok".green()
        } else {
            "failed".red()
        };
        println!(
            "  [{}] {:<32} {} -> {} objects  {}",
            step + 1,
            stage.operation.bold(),
            stage.input.len(),
            stage.output.len(),
            status
        );
        if let Some(error) = &stage.error {
            println!("      {}", error.red());
        }
    }
}

fn run_pipeline(reasoner: &mut Reasoner, pipeline: &str) {
    let succeeded = reasoner.run(pipeline);
    if succeeded {
        let result = reasoner.result();
        println!(
            "  {} {} object(s):",
            "✓".green().bold(),
            result.len().to_string().bold()
        );
        for object in result {
            let name = if object.label.is_empty() {
                object.id.clone()
            } else {
                format!("{} ({})", object.id, object.label)
            };
            println!("    • {}", name.bold());
        }
    } else {
        let error = reasoner
            .chain()
            .last()
            .and_then(|s| s.error.clone())
            .unwrap_or_else(|| "unknown failure".to_string());
        println!("  {} {}", "✗".red().bold(), error.red());
    }
}
