//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::RuleTable;
use crate::config::{Config, ConfigLoader};
use crate::storage::{Database, SharedDatabase, SiteStore};
use crate::types::{CraftError, Result};

/// Project data directory name
pub const PROJECT_DIR: &str = ".pagecraft";

/// Command execution context
///
/// Provides unified access to the resources most commands need.
#[derive(Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Shared database handle
    pub db: SharedDatabase,
}

impl CommandContext {
    /// Validate initialization, load config and open the site database
    pub fn load() -> Result<Self> {
        require_initialized()?;
        let config = ConfigLoader::load()?;
        let db = open_site_db(&config.storage.database)?;

        Ok(Self {
            config,
            db: Arc::new(db),
        })
    }

    /// Site store using the configured default page status
    pub fn site_store(&self) -> SiteStore {
        SiteStore::new(Arc::clone(&self.db)).with_default_status(self.config.pages.default_status)
    }

    /// Rule table named in configuration, or the built-in one
    pub fn rule_table(&self) -> Result<RuleTable> {
        RuleTable::from_config(&self.config.rules)
    }
}

/// Require pagecraft to be initialized
///
/// Returns the project directory path if initialized,
/// or `CraftError::NotInitialized` if not.
pub fn require_initialized() -> Result<PathBuf> {
    let project_dir = Path::new(PROJECT_DIR);

    if !project_dir.exists() {
        return Err(CraftError::NotInitialized);
    }

    Ok(project_dir.to_path_buf())
}

/// Open an existing site database
pub fn open_site_db(path: &Path) -> Result<Database> {
    if !path.exists() {
        return Err(CraftError::NotInitialized);
    }

    let db = Database::open(path)?;
    // Brings databases from older versions up to date
    db.initialize()?;
    Ok(db)
}

/// Create and initialize the site database
///
/// Creates the parent directory if needed.
pub fn create_site_db(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(path)?;
    db.initialize()?;

    Ok(db)
}

/// Read a file, or stdin when `path` is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    std::fs::read_to_string(path).map_err(|e| {
        CraftError::Config(format!("Failed to read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests avoid changing the working directory; parallel tests share it.

    #[test]
    fn test_create_and_open_site_db() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("site.db");

        assert!(matches!(open_site_db(&path), Err(CraftError::NotInitialized)));

        create_site_db(&path).unwrap();
        assert!(path.exists());
        open_site_db(&path).unwrap();
    }

    #[test]
    fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.txt");
        std::fs::write(&path, "About\n-Team\n").unwrap();

        assert_eq!(read_input(&path).unwrap(), "About\n-Team\n");
        assert!(matches!(
            read_input(&dir.path().join("missing.txt")),
            Err(CraftError::Config(_))
        ));
    }
}
