//! Shared utility functions for type serialization and common operations.
//!
//! ## String Helpers
//! - `capitalize_first`, `humanize_key` - Display labels
//! - `slugify` - URL-safe slugs for page permalinks

use crate::types::{MenuItemKind, PageStatus};
use serde::Serialize;
use std::fmt::Display;

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Turn a machine key into a display label: `web_development` → `Web Development`.
pub fn humanize_key(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a title into a URL slug
///
/// - Lowercases ASCII letters, keeps alphanumerics
/// - Replaces everything else with hyphens
/// - Removes consecutive and leading/trailing hyphens
///
/// Returns `"page"` when nothing usable remains.
pub fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Used for deserializing database values where invalid strings should fall back gracefully.
/// Logs a warning when an invalid value is encountered.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        match Self::try_parse(s) {
            Some(v) => v,
            None => {
                tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                Self::default_value()
            }
        }
    }
}

impl ParseWithDefault for PageStatus {
    fn type_name() -> &'static str {
        "PageStatus"
    }

    fn default_value() -> Self {
        PageStatus::Publish
    }

    fn try_parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl ParseWithDefault for MenuItemKind {
    fn type_name() -> &'static str {
        "MenuItemKind"
    }

    fn default_value() -> Self {
        MenuItemKind::Item
    }

    fn try_parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

/// Serialize an enum to its serde string representation (without quotes).
pub fn enum_to_str<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Filter an iterator of Results, logging errors at warn level before discarding.
pub fn log_filter_warn<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            None
        }
    }
}
