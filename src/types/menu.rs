use serde::{Deserialize, Serialize};

use super::ItemId;

/// URL used for non-navigable grouping nodes
pub const PLACEHOLDER_URL: &str = "#";

/// Index of a menu item within one synthesized tree
pub type MenuRef = usize;

/// Role of a node in a synthesized menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    /// Domain root ("Services")
    Root,
    /// Non-navigable parent of several same-category items
    Group,
    /// Classified or uncategorized content item
    Item,
    /// Pre-existing child of an item, from the store's own hierarchy
    Child,
}

/// One node of a navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuRef,
    pub label: String,
    pub url: String,
    pub parent: Option<MenuRef>,
    /// 1-based position in depth-first order
    pub order: u32,
    pub object_id: Option<ItemId>,
    pub kind: MenuItemKind,
}

impl MenuItem {
    pub fn is_navigable(&self) -> bool {
        self.url != PLACEHOLDER_URL
    }
}
