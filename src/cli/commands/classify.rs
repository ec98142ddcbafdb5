//! Classify Command
//!
//! Show which category each published page falls into.

use crate::cli::ui::{Output, OutputFormat};
use crate::cli::util::CommandContext;
use crate::classify::Classifier;
use crate::types::Result;

pub fn run(format: OutputFormat) -> Result<()> {
    let output = Output::new();
    let ctx = CommandContext::load()?;
    let table = ctx.rule_table()?;

    let items = ctx.site_store().list_items(true)?;
    let classification = Classifier::new(&table)?.classify(&items);

    if format == OutputFormat::Json {
        return output.json(&classification);
    }

    output.header(&format!("Classification of {} pages", items.len()));

    for bucket in &classification.buckets {
        let marker = if bucket.fallback { " (fallback)" } else { "" };
        output.section(&format!(
            "{} [{}]{} - {}",
            bucket.label,
            bucket.name,
            marker,
            bucket.len()
        ));
        for item in &bucket.items {
            output.item(&format!("{} ({})", item.title, item.id));
        }
    }

    if !classification.uncategorized.is_empty() {
        output.section(&format!(
            "Uncategorized - {}",
            classification.uncategorized.len()
        ));
        for item in &classification.uncategorized {
            output.item(&format!("{} ({})", item.title, item.id));
        }
    }

    println!();
    if classification.used_fallback {
        output.warning("No specific category matched; fallback categories were used");
    }
    output.info(&format!(
        "{} categorized, {} uncategorized",
        classification.categorized_count(),
        classification.uncategorized.len()
    ));

    Ok(())
}
