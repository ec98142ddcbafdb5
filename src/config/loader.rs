//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/pagecraft/config.toml)
//! 3. Project config (.pagecraft/config.toml)
//! 4. Environment variables (PAGECRAFT_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{CraftError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. PAGECRAFT_MENU__DOMAIN -> menu.domain
        figment = figment.merge(Env::prefixed("PAGECRAFT_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| CraftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| CraftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/pagecraft/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("pagecraft"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".pagecraft")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| CraftError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            CraftError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize project configuration under `root`
    pub fn init_project_at(root: &Path, domain: Option<&str>, force: bool) -> Result<PathBuf> {
        let project_dir = root.join(Self::project_dir());
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config(domain))?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(project_dir)
    }

    /// Initialize project configuration in the current directory
    pub fn init_project(domain: Option<&str>, force: bool) -> Result<PathBuf> {
        Self::init_project_at(Path::new("."), domain, force)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default global config content (TOML)
    fn default_global_config() -> String {
        r#"# pagecraft Global Configuration
# User-wide defaults. Project settings in .pagecraft/config.toml override these.

version = "1.0"

[outline]
max_title_length = 200
max_lines = 500

[pages]
default_status = "publish"
"#
        .to_string()
    }

    /// Generate default project config content (TOML)
    fn default_project_config(domain: Option<&str>) -> String {
        let domain = domain.unwrap_or(crate::constants::menu::DOMAIN);
        format!(
            r#"# pagecraft Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[menu]
name = "Main Menu"
domain = {}
include_existing_children = true
include_uncategorized = true

# Uncomment to use a custom classification rule table
# [rules]
# file = ".pagecraft/rules.toml"

[storage]
database = ".pagecraft/site.db"
"#,
            toml::Value::String(domain.to_string())
        )
    }
}
