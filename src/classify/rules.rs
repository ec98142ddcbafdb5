//! Pattern Rule Table
//!
//! Classification rules are data: an ordered list of categories, each with
//! OR-ed match rules, plus an optional fallback list consulted only when the
//! specific categories classify nothing.
//!
//! ## Rule Types
//!
//! | Type | Matches when |
//! |------|--------------|
//! | `keyword` | lowercase title contains any term |
//! | `pattern` | case-insensitive regex matches the lowercase title |
//! | `combined` | title contains a `title` term AND title or body contains a `content` term |
//!
//! Tables are validated in full before use; any defect is a hard error.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RulesConfig;
use crate::constants::menu::DOMAIN;
use crate::constants::rules::SUPPORTED_VERSION;
use crate::types::{CraftError, Result, RuleTableError, RuleTableErrorKind, humanize_key};

/// Built-in table for a typical agency site
const DEFAULT_RULES: &str = include_str!("default_rules.toml");

// =============================================================================
// Table Definition
// =============================================================================

/// Versioned, ordered category table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub version: u32,
    /// Default menu root label
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
    /// Evaluated only when no item matched a specific category
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback: Vec<CategoryDef>,
}

fn default_domain() -> String {
    DOMAIN.to_string()
}

/// One named bucket and the rules that fill it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordering hints within the category; never used for matching
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority_terms: Vec<String>,
    #[serde(default)]
    pub rules: Vec<MatchRule>,
}

impl CategoryDef {
    pub fn new(name: impl Into<String>, rules: Vec<MatchRule>) -> Self {
        Self {
            name: name.into(),
            label: None,
            priority_terms: Vec::new(),
            rules,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_priority_terms(mut self, terms: &[&str]) -> Self {
        self.priority_terms = terms.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Display label, derived from the name when not given
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => humanize_key(&self.name),
        }
    }
}

/// A single match rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchRule {
    Keyword { any: Vec<String> },
    Pattern { regex: String },
    Combined { title: Vec<String>, content: Vec<String> },
}

impl MatchRule {
    pub fn keyword(terms: &[&str]) -> Self {
        Self::Keyword {
            any: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn pattern(regex: impl Into<String>) -> Self {
        Self::Pattern {
            regex: regex.into(),
        }
    }

    pub fn combined(title: &[&str], content: &[&str]) -> Self {
        Self::Combined {
            title: title.iter().map(|t| t.to_string()).collect(),
            content: content.iter().map(|t| t.to_string()).collect(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl RuleTable {
    /// Empty table at the supported version
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            domain: domain.into(),
            categories: Vec::new(),
            fallback: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CategoryDef) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_fallback(mut self, category: CategoryDef) -> Self {
        self.fallback.push(category);
        self
    }

    /// The embedded default table
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    /// Parse and validate a TOML table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: RuleTable = toml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    /// Read, parse and validate a TOML table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CraftError::Config(format!(
                "Failed to read rule table {}: {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_toml_str(&content)?;
        debug!(
            "Loaded rule table from {} ({} categories, {} fallback)",
            path.display(),
            table.categories.len(),
            table.fallback.len()
        );
        Ok(table)
    }

    /// Table named in configuration, or the built-in one
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        match &config.file {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CraftError::Config(format!("Failed to serialize rule table: {}", e)))
    }

    /// Specific categories followed by fallback categories
    pub fn all_categories(&self) -> impl Iterator<Item = &CategoryDef> {
        self.categories.iter().chain(self.fallback.iter())
    }

    pub fn category(&self, name: &str) -> Option<&CategoryDef> {
        self.all_categories().find(|c| c.name == name)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the whole table; the first defect found is returned
    pub fn validate(&self) -> std::result::Result<(), RuleTableError> {
        self.compile().map(|_| ())
    }

    /// Validate and compile into matchers, specific then fallback
    pub(crate) fn compile(
        &self,
    ) -> std::result::Result<(Vec<CompiledCategory>, Vec<CompiledCategory>), RuleTableError> {
        if self.version != SUPPORTED_VERSION {
            return Err(RuleTableError::new(
                RuleTableErrorKind::Version,
                format!(
                    "unsupported version {} (expected {})",
                    self.version, SUPPORTED_VERSION
                ),
            ));
        }

        let mut seen = HashSet::new();
        for category in self.all_categories() {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(RuleTableError::new(
                    RuleTableErrorKind::MissingName,
                    "category name is empty",
                ));
            }
            if !seen.insert(name.to_string()) {
                return Err(RuleTableError::new(
                    RuleTableErrorKind::DuplicateName,
                    "category name is declared more than once",
                )
                .with_category(name));
            }
        }

        let specific = self
            .categories
            .iter()
            .map(CompiledCategory::compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let fallback = self
            .fallback
            .iter()
            .map(CompiledCategory::compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((specific, fallback))
    }
}

// =============================================================================
// Compiled Form
// =============================================================================

/// Matcher with lowercased terms and built regexes
#[derive(Debug, Clone)]
pub(crate) struct CompiledCategory {
    pub name: String,
    pub label: String,
    pub priority_terms: Vec<String>,
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
enum CompiledRule {
    Keyword(Vec<String>),
    Pattern(Regex),
    Combined { title: Vec<String>, content: Vec<String> },
}

impl CompiledCategory {
    fn compile(def: &CategoryDef) -> std::result::Result<Self, RuleTableError> {
        let name = def.name.trim();
        let fail = |kind: RuleTableErrorKind, message: String| {
            RuleTableError::new(kind, message).with_category(name)
        };

        if def.rules.is_empty() {
            return Err(fail(
                RuleTableErrorKind::EmptyRules,
                "category has no rules".to_string(),
            ));
        }

        let priority_terms = lower_terms(&def.priority_terms, true)
            .map_err(|m| fail(RuleTableErrorKind::EmptyTerms, format!("priority_terms {}", m)))?;

        let mut rules = Vec::with_capacity(def.rules.len());
        for (index, rule) in def.rules.iter().enumerate() {
            let position = index + 1;
            let compiled = match rule {
                MatchRule::Keyword { any } => CompiledRule::Keyword(
                    lower_terms(any, false).map_err(|m| {
                        fail(
                            RuleTableErrorKind::EmptyTerms,
                            format!("rule {}: keyword list {}", position, m),
                        )
                    })?,
                ),
                MatchRule::Pattern { regex } => {
                    if regex.trim().is_empty() {
                        return Err(fail(
                            RuleTableErrorKind::InvalidPattern,
                            format!("rule {}: pattern is empty", position),
                        ));
                    }
                    let compiled = RegexBuilder::new(regex)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| {
                            fail(
                                RuleTableErrorKind::InvalidPattern,
                                format!("rule {}: {}", position, e),
                            )
                        })?;
                    CompiledRule::Pattern(compiled)
                }
                MatchRule::Combined { title, content } => CompiledRule::Combined {
                    title: lower_terms(title, false).map_err(|m| {
                        fail(
                            RuleTableErrorKind::EmptyTerms,
                            format!("rule {}: title list {}", position, m),
                        )
                    })?,
                    content: lower_terms(content, false).map_err(|m| {
                        fail(
                            RuleTableErrorKind::EmptyTerms,
                            format!("rule {}: content list {}", position, m),
                        )
                    })?,
                },
            };
            rules.push(compiled);
        }

        Ok(Self {
            name: name.to_string(),
            label: def.display_label(),
            priority_terms,
            rules,
        })
    }

    /// Both arguments must already be lowercase
    pub fn matches(&self, title: &str, body: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            CompiledRule::Keyword(terms) => contains_any(title, terms),
            CompiledRule::Pattern(regex) => regex.is_match(title),
            CompiledRule::Combined {
                title: title_terms,
                content,
            } => {
                contains_any(title, title_terms)
                    && (contains_any(title, content) || contains_any(body, content))
            }
        })
    }
}

fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| haystack.contains(term.as_str()))
}

fn lower_terms(terms: &[String], allow_empty_list: bool) -> std::result::Result<Vec<String>, String> {
    if terms.is_empty() && !allow_empty_list {
        return Err("is empty".to_string());
    }
    terms
        .iter()
        .map(|term| {
            let term = term.trim();
            if term.is_empty() {
                Err("contains an empty term".to_string())
            } else {
                Ok(term.to_lowercase())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(table: &RuleTable) -> RuleTableErrorKind {
        table.validate().unwrap_err().kind
    }

    #[test]
    fn test_builtin_table_is_valid() {
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.version, SUPPORTED_VERSION);
        assert_eq!(table.domain, "Services");
        assert!(table.category("web_development").is_some());
        assert!(table.category("legal").is_some());
        assert_eq!(table.fallback.len(), 2);
        assert!(table.fallback.iter().any(|c| c.name == "services"));
    }

    #[test]
    fn test_builtin_orders_web_development_before_pricing() {
        let table = RuleTable::builtin().unwrap();
        let position = |name: &str| table.categories.iter().position(|c| c.name == name).unwrap();
        assert!(position("web_development") < position("pricing"));
    }

    #[test]
    fn test_parse_toml_table() {
        let table = RuleTable::from_toml_str(
            r#"
version = 1
domain = "Agency"

[[categories]]
name = "web_development"
label = "Web Development"
priority_terms = ["website", "development"]
rules = [
  { type = "keyword", any = ["web development", "website development"] },
  { type = "pattern", regex = "\\bweb\\s*apps?\\b" },
  { type = "combined", title = ["restaurant"], content = ["website"] },
]

[[fallback]]
name = "services"
rules = [ { type = "keyword", any = ["service"] } ]
"#,
        )
        .unwrap();

        assert_eq!(table.domain, "Agency");
        assert_eq!(table.categories[0].rules.len(), 3);
        assert_eq!(
            table.categories[0].rules[1],
            MatchRule::pattern("\\bweb\\s*apps?\\b")
        );
        assert_eq!(table.fallback[0].display_label(), "Services");
    }

    #[test]
    fn test_domain_defaults_when_omitted() {
        let table = RuleTable::from_toml_str("version = 1").unwrap();
        assert_eq!(table.domain, DOMAIN);
        assert!(table.categories.is_empty());
    }

    #[test]
    fn test_display_label_derived_from_name() {
        let category = CategoryDef::new("digital_marketing", vec![MatchRule::keyword(&["ads"])]);
        assert_eq!(category.display_label(), "Digital Marketing");
        assert_eq!(category.with_label("Marketing").display_label(), "Marketing");
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut table = RuleTable::new("Services");
        table.version = 2;
        assert_eq!(kind_of(&table), RuleTableErrorKind::Version);
    }

    #[test]
    fn test_rejects_duplicate_across_fallback() {
        let table = RuleTable::new("Services")
            .with_category(CategoryDef::new("about", vec![MatchRule::keyword(&["about"])]))
            .with_fallback(CategoryDef::new("about", vec![MatchRule::keyword(&["team"])]));

        let err = table.validate().unwrap_err();
        assert_eq!(err.kind, RuleTableErrorKind::DuplicateName);
        assert_eq!(err.category.as_deref(), Some("about"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let table = RuleTable::new("Services")
            .with_category(CategoryDef::new("  ", vec![MatchRule::keyword(&["x"])]));
        assert_eq!(kind_of(&table), RuleTableErrorKind::MissingName);
    }

    #[test]
    fn test_rejects_category_without_rules() {
        let table = RuleTable::new("Services").with_category(CategoryDef::new("about", vec![]));
        assert_eq!(kind_of(&table), RuleTableErrorKind::EmptyRules);
    }

    #[test]
    fn test_rejects_empty_terms() {
        let empty_list = RuleTable::new("Services")
            .with_category(CategoryDef::new("about", vec![MatchRule::keyword(&[])]));
        assert_eq!(kind_of(&empty_list), RuleTableErrorKind::EmptyTerms);

        let empty_term = RuleTable::new("Services")
            .with_category(CategoryDef::new("about", vec![MatchRule::keyword(&["about", " "])]));
        assert_eq!(kind_of(&empty_term), RuleTableErrorKind::EmptyTerms);

        let empty_content = RuleTable::new("Services").with_category(CategoryDef::new(
            "industries",
            vec![MatchRule::combined(&["law"], &[])],
        ));
        assert_eq!(kind_of(&empty_content), RuleTableErrorKind::EmptyTerms);
    }

    #[test]
    fn test_rejects_invalid_regex() {
        let table = RuleTable::new("Services")
            .with_category(CategoryDef::new("broken", vec![MatchRule::pattern("web(")]));

        let err = table.validate().unwrap_err();
        assert_eq!(err.kind, RuleTableErrorKind::InvalidPattern);
        assert!(err.to_string().contains("category 'broken'"));
    }

    #[test]
    fn test_invalid_table_from_toml_is_hard_error() {
        let result = RuleTable::from_toml_str(
            "version = 1\n[[categories]]\nname = \"about\"\nrules = []\n",
        );
        assert!(matches!(result, Err(CraftError::RuleTable(_))));
    }

    #[test]
    fn test_unknown_rule_type_is_parse_error() {
        let result = RuleTable::from_toml_str(
            "version = 1\n[[categories]]\nname = \"about\"\nrules = [{ type = \"fuzzy\", any = [\"a\"] }]\n",
        );
        assert!(matches!(result, Err(CraftError::Toml(_))));
    }

    #[test]
    fn test_compiled_matching() {
        let table = RuleTable::new("Services").with_category(CategoryDef::new(
            "web",
            vec![
                MatchRule::keyword(&["Web Development"]),
                MatchRule::pattern(r"\bweb\s*apps?\b"),
                MatchRule::combined(&["restaurant"], &["website"]),
            ],
        ));
        let (specific, _) = table.compile().unwrap();
        let web = &specific[0];

        assert!(web.matches("custom web development", ""));
        assert!(web.matches("progressive webapps", ""));
        assert!(web.matches("restaurants", "we build your website"));
        assert!(!web.matches("restaurants", "opening hours"));
        assert!(!web.matches("about us", "website"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(
            &path,
            "version = 1\n[[categories]]\nname = \"about\"\nrules = [{ type = \"keyword\", any = [\"about\"] }]\n",
        )
        .unwrap();

        let table = RuleTable::from_config(&RulesConfig {
            file: Some(path.clone()),
        })
        .unwrap();
        assert_eq!(table.categories[0].name, "about");

        let missing = RuleTable::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(CraftError::Config(_))));
    }

    #[test]
    fn test_toml_output_reparses() {
        let table = RuleTable::builtin().unwrap();
        let rendered = table.to_toml_string().unwrap();
        assert_eq!(RuleTable::from_toml_str(&rendered).unwrap(), table);
    }
}
