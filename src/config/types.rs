//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/pagecraft/) and project (.pagecraft/) level configuration.
//!
//! Component configs (`OutlineConfig`, `MenuConfig`) are passed explicitly into
//! the parser and synthesizer; nothing in the core reads ambient settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{outline as outline_defaults, menu as menu_defaults};
use crate::types::{CraftError, PageStatus, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Outline parsing limits
    pub outline: OutlineConfig,

    /// Page creation defaults
    pub pages: PagesConfig,

    /// Menu synthesis settings
    pub menu: MenuConfig,

    /// Classification rule table source
    pub rules: RulesConfig,

    /// Reference store settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            outline: OutlineConfig::default(),
            pages: PagesConfig::default(),
            menu: MenuConfig::default(),
            rules: RulesConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `CraftError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        self.outline.validate()?;
        self.menu.validate()?;
        Ok(())
    }
}

// =============================================================================
// Outline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutlineConfig {
    /// Maximum title length in characters; longer lines are rejected
    pub max_title_length: usize,

    /// Maximum non-blank lines processed per outline
    pub max_lines: usize,

    /// Maximum nesting depth (0 = flat)
    pub max_depth: usize,

    /// Depth marker character
    pub marker: char,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            max_title_length: outline_defaults::MAX_TITLE_LENGTH,
            max_lines: outline_defaults::MAX_LINES,
            max_depth: outline_defaults::MAX_DEPTH,
            marker: outline_defaults::DEPTH_MARKER,
        }
    }
}

impl OutlineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_title_length == 0 {
            return Err(CraftError::Config(
                "outline.max_title_length must be greater than 0".to_string(),
            ));
        }

        if self.max_lines == 0 {
            return Err(CraftError::Config(
                "outline.max_lines must be greater than 0".to_string(),
            ));
        }

        if self.marker.is_whitespace() || self.marker == ':' {
            return Err(CraftError::Config(format!(
                "outline.marker cannot be whitespace or ':', got {:?}",
                self.marker
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Page Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PagesConfig {
    /// Status for pages without a `status` directive
    pub default_status: PageStatus,
}

// =============================================================================
// Menu Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MenuConfig {
    /// Name of the navigation menu to replace
    pub name: String,

    /// Label of the root node; an item with this title becomes the landing page
    pub domain: String,

    /// Attach each item's existing store children beneath it
    pub include_existing_children: bool,

    /// Attach unclassified items directly under the root
    pub include_uncategorized: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            name: menu_defaults::MENU_NAME.to_string(),
            domain: menu_defaults::DOMAIN.to_string(),
            include_existing_children: true,
            include_uncategorized: true,
        }
    }
}

impl MenuConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CraftError::Config("menu.name cannot be empty".to_string()));
        }
        if self.domain.trim().is_empty() {
            return Err(CraftError::Config("menu.domain cannot be empty".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Rules Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule table file; the built-in table is used when absent
    pub file: Option<PathBuf>,
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(".pagecraft/site.db"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
