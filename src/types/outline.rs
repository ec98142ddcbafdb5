use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inline `::key=value` annotations, in order of appearance.
///
/// The vocabulary is open: the parser keeps every key and leaves
/// interpretation to the content store.
pub type Directives = IndexMap<String, String>;

/// One accepted outline line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineLine {
    /// 1-based line number in the raw text
    pub line_number: usize,
    /// Original line text, untrimmed
    pub raw: String,
    /// Number of leading depth markers
    pub depth: usize,
    /// Display title with markers, excerpt and directives removed
    pub title: String,
    pub excerpt: Option<String>,
    pub directives: Directives,
}

impl OutlineLine {
    /// Look up a directive value by key
    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives.get(key).map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Output of a single parse: accepted lines plus per-line errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutline {
    pub lines: Vec<OutlineLine>,
    pub errors: Vec<crate::types::LineError>,
}

impl ParsedOutline {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Deepest accepted line (0 for a flat or empty outline)
    pub fn max_depth(&self) -> usize {
        self.lines.iter().map(|l| l.depth).max().unwrap_or(0)
    }
}
