//! Rules Command
//!
//! Print or validate a classification rule table.
//!
//! Usage:
//!   pagecraft rules show [--file rules.toml]
//!   pagecraft rules check [--file rules.toml]

use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::classify::RuleTable;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Explicit file, then the configured file, then the built-in table
fn load(file: Option<&Path>) -> Result<(RuleTable, String)> {
    if let Some(path) = file {
        return Ok((RuleTable::load(path)?, path.display().to_string()));
    }

    let config = ConfigLoader::load()?;
    match &config.rules.file {
        Some(path) => Ok((RuleTable::load(path)?, path.display().to_string())),
        None => Ok((RuleTable::builtin()?, "built-in".to_string())),
    }
}

pub fn show(file: Option<PathBuf>) -> Result<()> {
    let (table, source) = load(file.as_deref())?;
    println!("# Rule table: {}\n", source);
    Output::new().block(&table.to_toml_string()?);
    Ok(())
}

pub fn check(file: Option<PathBuf>) -> Result<()> {
    let output = Output::new();
    let (table, source) = load(file.as_deref())?;

    output.success(&format!("Rule table '{}' is valid", source));
    output.item(&format!("version {}, domain '{}'", table.version, table.domain));
    output.item(&format!(
        "{} categories, {} fallback",
        table.categories.len(),
        table.fallback.len()
    ));

    output.section("Categories (evaluation order)");
    for category in &table.categories {
        output.item(&format!(
            "{} [{}]: {} rules",
            category.display_label(),
            category.name,
            category.rules.len()
        ));
    }
    for category in &table.fallback {
        output.item(&format!(
            "{} [{}]: {} rules (fallback)",
            category.display_label(),
            category.name,
            category.rules.len()
        ));
    }

    Ok(())
}
