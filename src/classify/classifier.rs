//! First-match Page Classifier
//!
//! Assigns each content item to at most one category. Categories are tried in
//! table order and the first match wins. When the specific categories claim
//! nothing at all, the fallback categories get a pass over every item.

use serde::Serialize;
use tracing::{debug, info};

use super::rules::{CompiledCategory, RuleTable};
use crate::types::{ContentItem, ItemId, Result};

/// Items that landed in one category, in input order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBucket {
    pub name: String,
    pub label: String,
    /// Lowercased ordering hints carried over from the table
    pub priority_terms: Vec<String>,
    /// Filled by the fallback pass
    pub fallback: bool,
    pub items: Vec<ContentItem>,
}

impl CategoryBucket {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of one classification run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classification {
    /// Non-empty buckets in table order (specific, then fallback)
    pub buckets: Vec<CategoryBucket>,
    /// Items no category claimed, in input order
    pub uncategorized: Vec<ContentItem>,
    /// Whether the fallback pass ran
    pub used_fallback: bool,
}

impl Classification {
    pub fn bucket(&self, name: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Category name assigned to `item_id`, if any
    pub fn category_of(&self, item_id: ItemId) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.items.iter().any(|i| i.id == item_id))
            .map(|b| b.name.as_str())
    }

    pub fn categorized_count(&self) -> usize {
        self.buckets.iter().map(CategoryBucket::len).sum()
    }

    /// No buckets and no uncategorized items
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.uncategorized.is_empty()
    }

    /// Every classified and unclassified item
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.buckets
            .iter()
            .flat_map(|b| b.items.iter())
            .chain(self.uncategorized.iter())
    }
}

/// Compiled classifier, reusable across runs
#[derive(Debug, Clone)]
pub struct Classifier {
    specific: Vec<CompiledCategory>,
    fallback: Vec<CompiledCategory>,
}

impl Classifier {
    /// Validate and compile a rule table
    pub fn new(table: &RuleTable) -> Result<Self> {
        let (specific, fallback) = table.compile()?;
        Ok(Self { specific, fallback })
    }

    /// Specific category a single item falls into, ignoring fallbacks
    pub fn category_for(&self, item: &ContentItem) -> Option<&str> {
        let (title, body) = normalized(item);
        first_match(&self.specific, &title, &body).map(|i| self.specific[i].name.as_str())
    }

    pub fn classify(&self, items: &[ContentItem]) -> Classification {
        let mut specific: Vec<Vec<ContentItem>> = vec![Vec::new(); self.specific.len()];
        let mut fallback: Vec<Vec<ContentItem>> = vec![Vec::new(); self.fallback.len()];
        let mut uncategorized = Vec::new();

        for item in items {
            let (title, body) = normalized(item);
            match first_match(&self.specific, &title, &body) {
                Some(index) => {
                    debug!(
                        "Item {} '{}' -> {}",
                        item.id, item.title, self.specific[index].name
                    );
                    specific[index].push(item.clone());
                }
                None => uncategorized.push(item.clone()),
            }
        }

        let claimed = specific.iter().any(|b| !b.is_empty());
        let used_fallback = !claimed && !self.fallback.is_empty() && !items.is_empty();

        if used_fallback {
            debug!("No specific category matched; running fallback pass");
            let mut remaining = Vec::with_capacity(uncategorized.len());
            for item in uncategorized {
                let (title, body) = normalized(&item);
                match first_match(&self.fallback, &title, &body) {
                    Some(index) => {
                        debug!(
                            "Item {} '{}' -> {} (fallback)",
                            item.id, item.title, self.fallback[index].name
                        );
                        fallback[index].push(item);
                    }
                    None => remaining.push(item),
                }
            }
            uncategorized = remaining;
        }

        let buckets: Vec<CategoryBucket> = self
            .specific
            .iter()
            .zip(specific)
            .map(|(category, items)| bucket(category, items, false))
            .chain(
                self.fallback
                    .iter()
                    .zip(fallback)
                    .map(|(category, items)| bucket(category, items, true)),
            )
            .filter(|b| !b.is_empty())
            .collect();

        let classification = Classification {
            buckets,
            uncategorized,
            used_fallback,
        };

        info!(
            "Classified {} items: {} categorized into {} categories, {} uncategorized{}",
            items.len(),
            classification.categorized_count(),
            classification.buckets.len(),
            classification.uncategorized.len(),
            if used_fallback { " (fallback)" } else { "" }
        );

        classification
    }
}

/// Compile `table` and classify `items` in one call
pub fn classify(items: &[ContentItem], table: &RuleTable) -> Result<Classification> {
    Ok(Classifier::new(table)?.classify(items))
}

fn normalized(item: &ContentItem) -> (String, String) {
    (item.title.trim().to_lowercase(), item.body.to_lowercase())
}

fn first_match(categories: &[CompiledCategory], title: &str, body: &str) -> Option<usize> {
    categories.iter().position(|c| c.matches(title, body))
}

fn bucket(category: &CompiledCategory, items: Vec<ContentItem>, fallback: bool) -> CategoryBucket {
    CategoryBucket {
        name: category.name.clone(),
        label: category.label.clone(),
        priority_terms: category.priority_terms.clone(),
        fallback,
        items,
    }
}
