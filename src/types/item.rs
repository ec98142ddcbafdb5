use serde::{Deserialize, Serialize};

use super::{Directives, ItemId};

/// Request handed to the content store for one outline line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub title: String,
    pub excerpt: Option<String>,
    pub directives: Directives,
    /// `None` places the page at the root
    pub parent_id: Option<ItemId>,
}

/// A page created by the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: ItemId,
    pub title: String,
    pub excerpt: Option<String>,
    pub directives: Directives,
    pub parent_id: Option<ItemId>,
    pub depth: usize,
    /// Outline line the page came from
    pub line_number: usize,
}

/// An existing item in the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Parent in the store's own hierarchy, independent of any menu
    pub parent_id: Option<ItemId>,
    /// Permalink of the item itself
    pub url: String,
    /// Listing URL for collection-type items
    pub archive_url: Option<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            parent_id: None,
            url: String::new(),
            archive_url: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<ItemId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = Some(url.into());
        self
    }

    /// Where a menu entry for this item should point
    pub fn menu_url(&self) -> &str {
        self.archive_url.as_deref().unwrap_or(&self.url)
    }
}

/// Publication status understood by the reference store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageStatus::Publish => write!(f, "publish"),
            PageStatus::Draft => write!(f, "draft"),
            PageStatus::Pending => write!(f, "pending"),
            PageStatus::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "publish" | "published" => Ok(PageStatus::Publish),
            "draft" => Ok(PageStatus::Draft),
            "pending" => Ok(PageStatus::Pending),
            "private" => Ok(PageStatus::Private),
            _ => Err(format!(
                "Unknown page status: {}. Valid values: publish, draft, pending, private",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_url_prefers_archive() {
        let page = ContentItem::new(1, "Blog").with_url("/blog/");
        assert_eq!(page.menu_url(), "/blog/");

        let collection = page.with_archive_url("/blog/archive/");
        assert_eq!(collection.menu_url(), "/blog/archive/");
    }

    #[test]
    fn test_page_status_parse() {
        assert_eq!("draft".parse::<PageStatus>().unwrap(), PageStatus::Draft);
        assert_eq!(" Published ".parse::<PageStatus>().unwrap(), PageStatus::Publish);
        assert!("archived".parse::<PageStatus>().is_err());
        assert_eq!(PageStatus::Private.to_string(), "private");
    }
}
