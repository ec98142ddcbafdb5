//! Outline Pipeline
//!
//! Free-text outline → parsed lines → page tree in a content store.
//!
//! - [`parser`]: depth markers, excerpts and directives
//! - [`builder`]: parent-stack tree construction through a [`PageStore`]
//! - [`preview`]: dry-run rendering without a store

pub mod builder;
pub mod parser;
pub mod preview;

pub use builder::{BuildFailure, BuildReport, BuildWarning, PageStore, TreeBuilder, WarningKind};
pub use parser::{OutlineParser, parse};
pub use preview::{dry_run, page_forest, preview};
