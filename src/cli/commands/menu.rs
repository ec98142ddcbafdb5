//! Menu Command
//!
//! Classify stored pages and rebuild a navigation menu.
//!
//! Usage:
//!   pagecraft menu [--name "Main Menu"] [--domain Services] [--dry-run] [-f json]

use crate::cli::ui::{Output, OutputFormat};
use crate::cli::util::CommandContext;
use crate::classify::{Classifier, RuleTable};
use crate::config::MenuConfig;
use crate::constants::menu::DOMAIN;
use crate::menu::{MenuStore, MenuSynthesizer};
use crate::types::Result;

pub struct MenuOptions {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub dry_run: bool,
    pub format: OutputFormat,
}

pub fn run(options: MenuOptions) -> Result<()> {
    let output = Output::new();
    let ctx = CommandContext::load()?;
    let table = ctx.rule_table()?;
    let config = resolve_config(&ctx.config.menu, &table, &options);
    config.validate()?;

    let mut store = ctx.site_store();
    let items = store.list_items(true)?;
    let classification = Classifier::new(&table)?.classify(&items);
    let tree = MenuSynthesizer::new(config.clone()).synthesize(&classification, &store);

    match options.format {
        OutputFormat::Json => output.json(&tree)?,
        OutputFormat::Text => {
            output.section(&format!("Menu '{}'", tree.name));
            output.block(&tree.render());
        }
    }

    if options.dry_run {
        if options.format == OutputFormat::Text {
            output.info("Dry run: menu not saved");
        }
        return Ok(());
    }

    let written = store.replace_menu(&config.name, &tree)?;
    if options.format == OutputFormat::Text {
        output.success(&format!(
            "Replaced menu '{}' ({} items from {} pages)",
            config.name,
            written,
            items.len()
        ));
    }

    Ok(())
}

/// Command-line flags win; an unset domain falls back to the rule table's
fn resolve_config(base: &MenuConfig, table: &RuleTable, options: &MenuOptions) -> MenuConfig {
    let mut config = base.clone();

    if let Some(name) = &options.name {
        config.name = name.clone();
    }

    match &options.domain {
        Some(domain) => config.domain = domain.clone(),
        None if config.domain == DOMAIN => config.domain = table.domain.clone(),
        None => {}
    }

    config
}
