//! Pages Command
//!
//! Parse an outline and create the page tree.
//!
//! Usage:
//!   pagecraft pages outline.txt
//!   pagecraft pages - --dry-run < outline.txt
//!   pagecraft pages outline.txt --parent 12

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_input};
use crate::config::{ConfigLoader, OutlineConfig};
use crate::outline::{OutlineParser, TreeBuilder, page_forest, preview};
use crate::render::render_tree;
use crate::types::{ItemId, ParsedOutline, Result};

pub struct PagesOptions {
    /// Outline file, or `-` for stdin
    pub input: PathBuf,
    pub dry_run: bool,
    /// Attach top-level lines under this existing page
    pub parent: Option<i64>,
}

pub fn run(options: PagesOptions) -> Result<()> {
    let output = Output::new();
    let text = read_input(&options.input)?;

    if options.dry_run {
        let config = ConfigLoader::load()?;
        let parsed = parse(&text, config.outline, &output);

        output.section("Preview");
        output.block(&preview(&parsed.lines));
        output.info(&format!(
            "Dry run: {} pages would be created, {} lines rejected",
            parsed.lines.len(),
            parsed.errors.len()
        ));
        return Ok(());
    }

    let ctx = CommandContext::load()?;
    let parsed = parse(&text, ctx.config.outline.clone(), &output);
    let mut store = ctx.site_store();

    let report = TreeBuilder::new()
        .under(options.parent.map(ItemId::new))
        .build(&parsed.lines, &mut store);

    if !report.pages.is_empty() {
        output.section("Created");
        output.block(&render_tree(&page_forest(&report.pages)));
    }

    for warning in &report.warnings {
        output.warning(&warning.to_string());
    }
    for failure in &report.errors {
        output.error(&failure.to_string());
    }

    let summary = format!(
        "{} created, {} failed, {} rejected lines",
        report.created,
        report.failed,
        parsed.errors.len()
    );
    if report.is_complete() && parsed.errors.is_empty() {
        output.success(&summary);
    } else {
        output.warning(&summary);
    }

    Ok(())
}

fn parse(text: &str, config: OutlineConfig, output: &Output) -> ParsedOutline {
    let parsed = OutlineParser::new(config).parse(text);
    for error in &parsed.errors {
        output.warning(&error.to_string());
    }
    parsed
}
