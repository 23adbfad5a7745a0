//! `spacia-cli` – interactive shell for the Spacia reasoner.
//!
//! This binary:
//!
//! 1. Initializes structured logging (`RUST_LOG`, `SPACIA_LOG_FORMAT=json`).
//! 2. Optionally loads a scene file given as the first argument (a JSON
//!    array of spatial objects).
//! 3. Drops the user into an **interactive REPL**: slash-commands for
//!    inspection (`/objects`, `/relations`, `/load`, `/help`), everything
//!    else runs as a pipeline.
//! 4. Intercepts **Ctrl-C** to leave the shell cleanly.

mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use spacia_pipeline::Reasoner;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set SPACIA_LOG_FORMAT=json for newline-delimited JSON logs.
    // The REPL's user-facing output still uses println! for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("SPACIA_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "Ctrl-C received – leaving Spacia.".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; exit with /quit instead");
    }

    // ── Optional scene file ───────────────────────────────────────────────
    let mut reasoner = Reasoner::new();
    if let Some(path) = std::env::args().nth(1) {
        match repl::load_scene(&mut reasoner, &path) {
            Ok(count) => println!(
                "  Loaded {} object(s) from {}",
                count.to_string().bold(),
                path.bold()
            ),
            Err(e) => println!("{}: {}", "Scene error".red(), e),
        }
    }

    println!();
    println!(
        "  Type {} for commands, or enter a pipeline such as {}.\n",
        "/help".bold().cyan(),
        "filter(volume < 1) | pick(ontop)".dimmed()
    );

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(reasoner, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ____                 _      "#.bold().cyan());
    println!("{}", r#"  / __/___  ___ _ ____ (_)___ _"#.bold().cyan());
    println!("{}", r#" _\ \/ _ \/ _ `// __// // _ `/"#.bold().cyan());
    println!("{}", r#"/___/ .__/\_,_/ \__//_/ \_,_/ "#.bold().cyan());
    println!("{}", r#"   /_/                        "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Spacia".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Qualitative spatial reasoning shell");
    println!();
}
