//! methodref-cli: CLI entry point for methodref.

mod commands_index;

use clap::Parser;
use methodref_core::CollisionPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "method-ref",
    about = "List the functions and class methods declared in a JavaScript source tree"
)]
#[command(version)]
struct Cli {
    /// Directory to scan
    path: Option<PathBuf>,

    /// Print the registry as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to ~/.methodref/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source file suffix, e.g. ".mjs"
    #[arg(long)]
    suffix: Option<String>,

    /// Duplicate key handling within a file: last-wins, first-wins, reject
    #[arg(long)]
    collision: Option<CollisionPolicy>,

    /// Leave class constructors out of the registry
    #[arg(long)]
    no_constructors: bool,

    /// Directory name to skip (repeatable)
    #[arg(long = "ignore-dir")]
    ignore_dirs: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "methodref=debug"
    } else {
        "methodref=info"
    };
    // Logs go to stderr; stdout carries the registry.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("valid tracing directive")),
        )
        .with_target(false)
        .init();

    let Some(path) = cli.path.clone() else {
        eprintln!("Please provide a directory path.");
        std::process::exit(1);
    };

    let config = commands_index::resolve_config(&cli)?;
    let root = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    commands_index::cmd_index(&root, &config, cli.json)
}
