//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Outline syntax and limits
pub mod outline {
    /// Leading character whose repetition encodes depth
    pub const DEPTH_MARKER: char = '-';

    /// Separates a title from its excerpt; only the first occurrence counts
    pub const EXCERPT_SEPARATOR: &str = ":+";

    /// Introduces an inline `::key=value` directive
    pub const DIRECTIVE_PREFIX: &str = "::";

    /// Default maximum title length (characters)
    pub const MAX_TITLE_LENGTH: usize = 200;

    /// Default maximum non-blank lines per outline
    pub const MAX_LINES: usize = 500;

    /// Default maximum nesting depth
    pub const MAX_DEPTH: usize = 6;
}

/// Menu synthesis defaults
pub mod menu {
    /// Default navigation menu name
    pub const MENU_NAME: &str = "Main Menu";

    /// Default root label
    pub const DOMAIN: &str = "Services";
}

/// Directive keys interpreted by the reference store
pub mod directives {
    /// Publication status (`publish`, `draft`, `pending`, `private`)
    pub const STATUS: &str = "status";

    /// Page template hint
    pub const TEMPLATE: &str = "template";
}

/// Rule table format
pub mod rules {
    /// Highest rule table version this build understands
    pub const SUPPORTED_VERSION: u32 = 1;
}
