//! Index command: scan a directory and print its registry.

use crate::Cli;
use anyhow::Context;
use methodref_core::MethodRefConfig;
use methodref_index::{DirectoryIndex, Indexer};
use std::path::Path;

/// Load the config file and apply command-line overrides.
pub(crate) fn resolve_config(cli: &Cli) -> anyhow::Result<MethodRefConfig> {
    let mut config = match &cli.config {
        Some(path) => MethodRefConfig::load(path)?,
        None => MethodRefConfig::load_or_default()?,
    };
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut MethodRefConfig, cli: &Cli) {
    if let Some(suffix) = &cli.suffix {
        config.scan.suffix = suffix.clone();
    }
    if let Some(policy) = cli.collision {
        config.extract.collision_policy = policy;
    }
    if cli.no_constructors {
        config.extract.include_constructors = false;
    }
    config.scan.ignore_dirs.extend(cli.ignore_dirs.iter().cloned());
}

pub(crate) fn cmd_index(root: &Path, config: &MethodRefConfig, json: bool) -> anyhow::Result<()> {
    tracing::debug!("Scan config: {:?}", config.scan);
    tracing::debug!("Extract config: {:?}", config.extract);
    let mut indexer = Indexer::with_config(config)?;
    let index = indexer
        .index_directory(root)
        .with_context(|| format!("Error parsing files in {}", root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index.registry)?);
    } else {
        print!("{}", index.registry);
    }

    report(&index);
    Ok(())
}

/// Summary and per-file failures, on stderr.
fn report(index: &DirectoryIndex) {
    for failure in &index.failures {
        eprintln!("  {}: {}", failure.path.display(), failure.error);
    }
    eprintln!(
        "{} files scanned, {} indexed, {} failed, {} symbols",
        index.files_scanned,
        index.files_indexed,
        index.files_failed,
        index.total_symbols
    );
}
