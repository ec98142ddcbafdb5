//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//!
//! ## Error Tiers
//!
//! - **Recoverable** (`LineError`): a single outline line is rejected; the run
//!   continues and the error is reported in the run summary.
//! - **Hard** (`CraftError`): invalid configuration or rule tables, storage
//!   failures. These abort the operation that raised them.
//!
//! ## Design Principles
//!
//! - Single unified error type (CraftError) for the entire crate
//! - Structured error variants with context for better debugging
//! - Partial failures are data, never panics

use thiserror::Error;

// =============================================================================
// Line Errors
// =============================================================================

/// Why an outline line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineErrorKind {
    /// Nothing left after stripping markers, excerpt and directives
    EmptyTitle,
    /// Title longer than the configured maximum
    TitleTooLong,
    /// More nesting markers than the configured maximum depth
    TooDeep,
    /// Outline exceeded the configured line limit; remaining lines ignored
    LineLimit,
}

impl std::fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "EMPTY_TITLE"),
            Self::TitleTooLong => write!(f, "TITLE_TOO_LONG"),
            Self::TooDeep => write!(f, "TOO_DEEP"),
            Self::LineLimit => write!(f, "LINE_LIMIT"),
        }
    }
}

/// A rejected outline line, recorded in the per-run error list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number in the raw text
    pub line_number: usize,
    /// What was wrong with the line
    pub kind: LineErrorKind,
    /// Title as parsed, when one could be extracted
    pub title: Option<String>,
    /// Detailed message
    pub message: String,
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(
                f,
                "line {} [{}] '{}': {}",
                self.line_number, self.kind, title, self.message
            ),
            None => write!(f, "line {} [{}]: {}", self.line_number, self.kind, self.message),
        }
    }
}

impl std::error::Error for LineError {}

impl LineError {
    pub fn new(line_number: usize, kind: LineErrorKind, message: impl Into<String>) -> Self {
        Self {
            line_number,
            kind,
            title: None,
            message: message.into(),
        }
    }

    /// Add the offending title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

// =============================================================================
// Rule Table Error
// =============================================================================

/// Rule table validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTableErrorKind {
    /// Unsupported table version
    Version,
    /// Category without a name
    MissingName,
    /// Two categories share a name
    DuplicateName,
    /// Category with no match rules
    EmptyRules,
    /// Keyword list empty, or an empty term
    EmptyTerms,
    /// Regex failed to compile
    InvalidPattern,
}

/// Structured rule table error with category context
#[derive(Debug, Clone)]
pub struct RuleTableError {
    pub kind: RuleTableErrorKind,
    /// Category that failed validation
    pub category: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RuleTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(category) = &self.category {
            write!(f, "Invalid rule table (category '{}'): {}", category, self.message)
        } else {
            write!(f, "Invalid rule table: {}", self.message)
        }
    }
}

impl std::error::Error for RuleTableError {}

impl RuleTableError {
    pub fn new(kind: RuleTableErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            category: None,
            message: message.into(),
        }
    }

    /// Add category context
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CraftError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    RuleTable(RuleTableError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not initialized: run 'pagecraft init' first")]
    NotInitialized,

    #[error("Page '{title}' rejected: {reason}")]
    PageRejected { title: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<RuleTableError> for CraftError {
    fn from(err: RuleTableError) -> Self {
        CraftError::RuleTable(err)
    }
}

pub type Result<T> = std::result::Result<T, CraftError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl CraftError {
    /// Create a page rejection error
    pub fn page_rejected(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PageRejected {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// Hard errors indicate a configuration defect rather than bad input data
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, Self::RuleTable(_) | Self::Config(_))
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| CraftError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| CraftError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
