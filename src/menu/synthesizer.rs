//! Menu Tree Synthesizer
//!
//! Turns a [`Classification`] into a navigation tree rooted at the domain
//! label:
//!
//! ```text
//! Services                      root (landing page URL or "#")
//! ├── Web Development           group: category with 2+ items
//! │   ├── Custom Websites
//! │   └── Web Apps
//! ├── Pricing                   single item: attached directly
//! │   └── Enterprise            existing child from the store
//! └── Careers                   uncategorized
//! ```
//!
//! The synthesizer is pure. Persisting the tree is left to a [`MenuStore`],
//! which replaces the whole named menu.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{CategoryBucket, Classification};
use crate::config::MenuConfig;
use crate::render::{TreeNode, render_tree};
use crate::types::{ContentItem, ItemId, MenuItem, MenuItemKind, MenuRef, PLACEHOLDER_URL, Result};

// =============================================================================
// Collaborators
// =============================================================================

/// Read access to the store's native page hierarchy
pub trait ChildLookup {
    /// Direct children of `id`, in the store's order
    fn children_of(&self, id: ItemId) -> Result<Vec<ContentItem>>;
}

/// Lookup that reports no children, for stores without a hierarchy
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChildren;

impl ChildLookup for NoChildren {
    fn children_of(&self, _id: ItemId) -> Result<Vec<ContentItem>> {
        Ok(Vec::new())
    }
}

/// Navigation store that owns named menus
pub trait MenuStore {
    /// Delete every item of menu `name`, then create `tree`.
    ///
    /// Returns the number of items written.
    fn replace_menu(&mut self, name: &str, tree: &MenuTree) -> Result<usize>;
}

// =============================================================================
// Menu Tree
// =============================================================================

/// A synthesized menu, items in depth-first order
///
/// `items[i].id == i` and `items[i].order == i + 1`; the root is always
/// `items[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuTree {
    pub name: String,
    pub items: Vec<MenuItem>,
}

impl MenuTree {
    /// Rebuild a tree from stored items, restoring depth-first order
    pub fn from_items(name: impl Into<String>, mut items: Vec<MenuItem>) -> Self {
        items.sort_by_key(|item| item.order);
        Self {
            name: name.into(),
            items,
        }
    }

    pub fn root(&self) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.parent.is_none())
    }

    pub fn get(&self, id: MenuRef) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Direct children of `id` in menu order
    pub fn children(&self, id: MenuRef) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| item.parent == Some(id))
            .collect()
    }

    /// Non-navigable category groups
    pub fn grouping_nodes(&self) -> impl Iterator<Item = &MenuItem> {
        self.items
            .iter()
            .filter(|item| item.kind == MenuItemKind::Group)
    }

    /// Levels below the root; a root-only tree has depth 0
    pub fn depth(&self) -> usize {
        self.items
            .iter()
            .map(|item| {
                let mut depth = 0;
                let mut parent = item.parent;
                while let Some(id) = parent {
                    depth += 1;
                    parent = self.get(id).and_then(|p| p.parent);
                }
                depth
            })
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// ASCII rendering with targets for navigable entries
    pub fn render(&self) -> String {
        let Some(root) = self.root() else {
            return String::new();
        };
        render_tree(&[self.tree_node(root)])
    }

    fn tree_node(&self, item: &MenuItem) -> TreeNode {
        let label = if item.is_navigable() {
            format!("{} ({})", item.label, item.url)
        } else {
            item.label.clone()
        };
        let children = self
            .children(item.id)
            .into_iter()
            .map(|child| self.tree_node(child))
            .collect();
        TreeNode::with_children(label, children)
    }
}

// =============================================================================
// Synthesizer
// =============================================================================

/// Nested node before ids and order are assigned
struct Draft {
    label: String,
    url: String,
    object_id: Option<ItemId>,
    kind: MenuItemKind,
    children: Vec<Draft>,
}

/// Builds a [`MenuTree`] from classified content
///
/// The landing page is the item whose title equals the menu domain after
/// trimming both and ignoring case, so "services" lands "Services". Its URL
/// becomes the root target; the item itself is still placed with its
/// category like any other.
pub struct MenuSynthesizer {
    config: MenuConfig,
}

impl MenuSynthesizer {
    pub fn new(config: MenuConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn synthesize<L: ChildLookup + ?Sized>(
        &self,
        classification: &Classification,
        lookup: &L,
    ) -> MenuTree {
        let domain = self.config.domain.trim();
        let domain_key = domain.to_lowercase();

        let landing = classification
            .items()
            .find(|item| item.title.trim().to_lowercase() == domain_key);
        let landing_id = landing.map(|item| item.id);

        let root_url = landing
            .map(item_url)
            .unwrap_or_else(|| PLACEHOLDER_URL.to_string());
        if let Some(item) = landing {
            debug!("Landing page {} '{}' is the menu root target", item.id, item.title);
        }

        let uncategorized: Vec<&ContentItem> = if self.config.include_uncategorized {
            classification.uncategorized.iter().collect()
        } else {
            Vec::new()
        };

        // Everything placed directly; existing children never duplicate these
        let placed: HashSet<ItemId> = classification
            .buckets
            .iter()
            .flat_map(|b| b.items.iter())
            .chain(uncategorized.iter().copied())
            .map(|item| item.id)
            .collect();

        let mut root = Draft {
            label: domain.to_string(),
            url: root_url,
            object_id: landing_id,
            kind: MenuItemKind::Root,
            children: Vec::new(),
        };

        for bucket in &classification.buckets {
            let items = ordered_items(bucket);
            match items.len() {
                0 => {}
                1 => root.children.push(self.item_node(items[0], &placed, lookup)),
                count => {
                    debug!("Grouping {} items under '{}'", count, bucket.label);
                    root.children.push(Draft {
                        label: bucket.label.clone(),
                        url: PLACEHOLDER_URL.to_string(),
                        object_id: None,
                        kind: MenuItemKind::Group,
                        children: items
                            .into_iter()
                            .map(|item| self.item_node(item, &placed, lookup))
                            .collect(),
                    });
                }
            }
        }

        for item in uncategorized {
            root.children.push(self.item_node(item, &placed, lookup));
        }

        let tree = flatten(&self.config.name, root);
        info!(
            "Synthesized menu '{}': {} items, {} groups",
            tree.name,
            tree.len(),
            tree.grouping_nodes().count()
        );
        tree
    }

    fn item_node<L: ChildLookup + ?Sized>(
        &self,
        item: &ContentItem,
        placed: &HashSet<ItemId>,
        lookup: &L,
    ) -> Draft {
        let children = if self.config.include_existing_children {
            match lookup.children_of(item.id) {
                Ok(children) => children
                    .iter()
                    .filter(|child| !placed.contains(&child.id))
                    .map(|child| Draft {
                        label: child.title.trim().to_string(),
                        url: item_url(child),
                        object_id: Some(child.id),
                        kind: MenuItemKind::Child,
                        children: Vec::new(),
                    })
                    .collect(),
                Err(e) => {
                    warn!(
                        "Child lookup for {} '{}' failed, attaching none: {}",
                        item.id, item.title, e
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Draft {
            label: item.title.trim().to_string(),
            url: item_url(item),
            object_id: Some(item.id),
            kind: MenuItemKind::Item,
            children,
        }
    }
}

/// Bucket items by priority term then label
fn ordered_items(bucket: &CategoryBucket) -> Vec<&ContentItem> {
    let mut items: Vec<&ContentItem> = bucket.items.iter().collect();

    items.sort_by_cached_key(|item| {
        let title = item.title.trim();
        let lower = title.to_lowercase();
        let rank = bucket
            .priority_terms
            .iter()
            .position(|term| lower.contains(term.as_str()))
            .unwrap_or(usize::MAX);
        (rank, lower, title.to_string())
    });

    items
}

fn item_url(item: &ContentItem) -> String {
    match item.menu_url() {
        "" => PLACEHOLDER_URL.to_string(),
        url => url.to_string(),
    }
}

fn flatten(name: &str, root: Draft) -> MenuTree {
    fn visit(draft: Draft, parent: Option<MenuRef>, items: &mut Vec<MenuItem>) {
        let id = items.len();
        items.push(MenuItem {
            id,
            label: draft.label,
            url: draft.url,
            parent,
            order: (id + 1) as u32,
            object_id: draft.object_id,
            kind: draft.kind,
        });
        for child in draft.children {
            visit(child, Some(id), items);
        }
    }

    let mut items = Vec::new();
    visit(root, None, &mut items);
    MenuTree {
        name: name.to_string(),
        items,
    }
}
