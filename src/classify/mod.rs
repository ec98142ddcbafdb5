//! Page Classification
//!
//! - [`rules`]: the versioned TOML rule table and its validation
//! - [`classifier`]: first-match assignment with a fallback pass

pub mod classifier;
pub mod rules;

pub use classifier::{CategoryBucket, Classification, Classifier, classify};
pub use rules::{CategoryDef, MatchRule, RuleTable};
