//! pagecraft - Page Hierarchy and Menu Construction
//!
//! Turns an indented outline into a page tree in a content store, then
//! classifies the stored pages by title and synthesizes a grouped navigation
//! menu from them.
//!
//! ## Pipeline
//!
//! ```text
//! outline text ─▶ OutlineParser ─▶ TreeBuilder ─▶ PageStore
//! PageStore ─▶ Classifier ─▶ MenuSynthesizer ─▶ MenuStore
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use pagecraft::{Database, SiteStore, OutlineParser, TreeBuilder};
//!
//! let db = Arc::new(Database::open(".pagecraft/site.db")?);
//! db.initialize()?;
//! let mut store = SiteStore::new(db);
//!
//! let parsed = OutlineParser::default().parse("Services\n-Web Design\n-SEO");
//! let report = TreeBuilder::new().build(&parsed.lines, &mut store);
//! ```
//!
//! ## Modules
//!
//! - [`outline`]: outline parsing, tree construction and dry-run preview
//! - [`classify`]: rule tables and first-match classification
//! - [`menu`]: menu tree synthesis and the navigation store trait
//! - [`storage`]: SQLite reference store with connection pooling
//! - [`config`]: layered configuration

pub mod classify;
pub mod cli;
pub mod config;
pub mod constants;
pub mod menu;
pub mod outline;
pub mod render;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, MenuConfig, OutlineConfig};

// Error Types
pub use types::error::{CraftError, Result, ResultExt};

// Storage
pub use storage::{Database, PoolConfig, SharedDatabase, SiteStore};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use classify::{Classification, Classifier, RuleTable};
pub use menu::{ChildLookup, MenuStore, MenuSynthesizer, MenuTree};
pub use outline::{BuildReport, OutlineParser, PageStore, TreeBuilder};
