//! Debug dump commands: tokens, events and the element tree.

use anyhow::{Context, Result};
use html_lint::{HtmlLint, Source};
use std::path::Path;

use crate::config_resolver;

fn load(file: &Path, config_path: Option<&Path>) -> Result<(HtmlLint, Source)> {
    let source = config_resolver::resolve(&config_resolver::project_dir(file), config_path);
    let linter = HtmlLint::new(config_resolver::load(&source)?).context("Failed to build linter")?;
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok((linter, Source::new(file.display().to_string(), data)))
}

/// Prints one line per token: type, location and consumed text.
pub fn tokens(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let (linter, source) = load(file, config_path)?;
    for token in linter.engine().dump_tokens(&source)? {
        println!(
            "{:<16} {:<32} {}",
            token.token,
            token.location,
            serde_json::to_string(&token.data)?
        );
    }
    Ok(())
}

/// Prints one line per event with its JSON payload.
pub fn events(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let (linter, source) = load(file, config_path)?;
    for event in linter.engine().dump_events(&source)? {
        println!("{:<16} {}", event.event, serde_json::to_string(&event.data)?);
    }
    Ok(())
}

/// Prints the element tree.
pub fn tree(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let (linter, source) = load(file, config_path)?;
    for line in linter.engine().dump_tree(&source)? {
        println!("{line}");
    }
    Ok(())
}
