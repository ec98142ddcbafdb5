//! Dry-run preview of an outline.
//!
//! Runs the real [`TreeBuilder`] against a throwaway store so the preview
//! shows exactly the placement a live run would produce, including root
//! fallbacks.

use std::collections::{HashMap, HashSet};

use super::builder::{BuildReport, PageStore, TreeBuilder};
use crate::render::{TreeNode, render_tree};
use crate::types::{ItemId, NewPage, OutlineLine, PageNode, Result};

/// Store that hands out sequential ids and never rejects
#[derive(Debug, Default)]
struct DryRunStore {
    next_id: i64,
}

impl PageStore for DryRunStore {
    fn parent_exists(&self, id: ItemId) -> Result<bool> {
        Ok(id.get() > 0 && id.get() <= self.next_id)
    }

    fn create_page(&mut self, _page: &NewPage) -> Result<ItemId> {
        self.next_id += 1;
        Ok(ItemId::new(self.next_id))
    }
}

/// Simulate a build without touching any store
pub fn dry_run(lines: &[OutlineLine]) -> BuildReport {
    TreeBuilder::new().build(lines, &mut DryRunStore::default())
}

/// Convert created pages into a renderable forest
///
/// Pages whose parent is not in `pages` (root pages, or pages built under an
/// existing parent) become roots of the forest.
pub fn page_forest(pages: &[PageNode]) -> Vec<TreeNode> {
    let created: HashSet<ItemId> = pages.iter().map(|p| p.id).collect();
    let mut children: HashMap<Option<ItemId>, Vec<&PageNode>> = HashMap::new();
    for page in pages {
        let parent = page.parent_id.filter(|id| created.contains(id));
        children.entry(parent).or_default().push(page);
    }

    fn build(
        parent: Option<ItemId>,
        children: &HashMap<Option<ItemId>, Vec<&PageNode>>,
    ) -> Vec<TreeNode> {
        children
            .get(&parent)
            .map(|pages| {
                pages
                    .iter()
                    .map(|page| TreeNode::with_children(page_label(page), build(Some(page.id), children)))
                    .collect()
            })
            .unwrap_or_default()
    }

    build(None, &children)
}

/// Render the tree a build of `lines` would produce
pub fn preview(lines: &[OutlineLine]) -> String {
    render_tree(&page_forest(&dry_run(lines).pages))
}

fn page_label(page: &PageNode) -> String {
    let mut label = page.title.clone();

    if let Some(excerpt) = &page.excerpt {
        label.push_str(&format!(" ({})", excerpt));
    }

    if !page.directives.is_empty() {
        let directives: Vec<String> = page
            .directives
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        label.push_str(&format!(" [{}]", directives.join(", ")));
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineParser;

    #[test]
    fn test_preview_services_outline() {
        let parsed = OutlineParser::default().parse(
            "Services:+Our offerings\n-Web Design ::template=wide\n-SEO Audit\n--Local SEO\nContact",
        );

        let expected = "Services (Our offerings)\n├── Web Design [template=wide]\n└── SEO Audit\n    └── Local SEO\nContact\n";
        assert_eq!(preview(&parsed.lines), expected);
    }

    #[test]
    fn test_dry_run_matches_live_placement() {
        let parsed = OutlineParser::default().parse("A\n-B\n---C");
        let report = dry_run(&parsed.lines);

        assert_eq!(report.created, 3);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.pages[2].parent_id, None);
    }

    #[test]
    fn test_forest_roots_pages_with_outside_parent() {
        let parsed = OutlineParser::default().parse("A\n-B\nC");
        let mut pages = dry_run(&parsed.lines).pages;
        pages[0].parent_id = Some(ItemId::new(99));

        assert_eq!(render_tree(&page_forest(&pages)), "A\n└── B\nC\n");
    }

    #[test]
    fn test_preview_empty_outline() {
        assert_eq!(preview(&[]), "");
    }
}
