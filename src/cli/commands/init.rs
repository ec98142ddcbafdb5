//! Init Command
//!
//! Initialize pagecraft in the current directory.

use crate::cli::ui::Output;
use crate::cli::util::{PROJECT_DIR, create_site_db};
use crate::config::ConfigLoader;
use crate::types::{CraftError, Result};

pub fn run(force: bool, domain: Option<String>) -> Result<()> {
    let root = std::env::current_dir()?;
    let project_dir = root.join(PROJECT_DIR);

    if project_dir.exists() && !force {
        return Err(CraftError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    ConfigLoader::init_project(domain.as_deref(), force)?;

    // Global config is optional; never overwrite it here
    if let Err(e) = ConfigLoader::init_global(false) {
        tracing::debug!("Global config init skipped: {}", e);
    }

    let config = ConfigLoader::load()?;
    create_site_db(&config.storage.database)?;

    let output = Output::new();
    output.success(&format!("Initialized pagecraft in {}/", PROJECT_DIR));
    println!("  Menu:     {} (root '{}')", config.menu.name, config.menu.domain);
    println!("  Database: {}", config.storage.database.display());
    println!();
    println!("Next steps:");
    println!("  1. Run 'pagecraft pages outline.txt' to create pages from an outline");
    println!("  2. Run 'pagecraft menu' to build the navigation menu");

    Ok(())
}
