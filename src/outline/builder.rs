//! Page Tree Builder
//!
//! Creates one page per parsed outline line through a [`PageStore`], resolving
//! parents with a depth-indexed stack.
//!
//! ## Parent Resolution
//!
//! `stack[d]` holds the id most recently created at depth `d`. A line at depth
//! `d > 0` is attached to `stack[d - 1]`. After each successful creation the
//! stack is truncated to `d + 1`, so a shallower sibling invalidates every
//! deeper entry:
//!
//! ```text
//! A        stack = [A]
//! -B       stack = [A, B]
//! -C       stack = [A, C]
//! D        stack = [D]
//! -E       parent = D
//! ```
//!
//! Failures never abort the batch: pages already created stay created, and
//! the report carries counts plus per-line errors and warnings.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::types::{ItemId, NewPage, OutlineLine, PageNode, Result};

/// Content store collaborator used by the tree builder
pub trait PageStore {
    /// Whether a page with this id currently exists
    fn parent_exists(&self, id: ItemId) -> Result<bool>;

    /// Create a page and return its store-assigned id
    fn create_page(&mut self, page: &NewPage) -> Result<ItemId>;
}

/// Why a line ended up somewhere other than its outline parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// No page was created at the depth above (gap in markers, or parent failed)
    MissingParent,
    /// The store no longer has the parent page
    ParentNotFound,
}

/// Recoverable parent-resolution problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildWarning {
    pub line_number: usize,
    pub title: String,
    pub kind: WarningKind,
    pub message: String,
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} '{}': {}", self.line_number, self.title, self.message)
    }
}

/// A line the store refused to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
    pub line_number: usize,
    pub title: String,
    pub error: String,
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} '{}': {}", self.line_number, self.title, self.error)
    }
}

/// Summary of one build run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub created: usize,
    pub failed: usize,
    pub errors: Vec<BuildFailure>,
    pub warnings: Vec<BuildWarning>,
    /// Created pages in creation order
    pub pages: Vec<PageNode>,
}

impl BuildReport {
    /// True when every line was created
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Children of `parent` (`None` = root) in creation order
    pub fn children_of(&self, parent: Option<ItemId>) -> impl Iterator<Item = &PageNode> {
        self.pages.iter().filter(move |p| p.parent_id == parent)
    }
}

/// Builds a page tree from parsed outline lines
///
/// Holds no state between runs; each [`TreeBuilder::build`] call owns its
/// parent stack.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    root_parent: Option<ItemId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach depth-0 lines under an existing page instead of the root
    pub fn under(mut self, parent: Option<ItemId>) -> Self {
        self.root_parent = parent;
        self
    }

    /// Create every line through `store`, in input order
    pub fn build<S: PageStore + ?Sized>(&self, lines: &[OutlineLine], store: &mut S) -> BuildReport {
        let mut report = BuildReport::default();
        let mut stack: Vec<Option<ItemId>> = Vec::new();

        for line in lines {
            let parent = self.resolve_parent(line, &stack, &*store, &mut report);

            let request = NewPage {
                title: line.title.clone(),
                excerpt: line.excerpt.clone(),
                directives: line.directives.clone(),
                parent_id: parent,
            };

            match store.create_page(&request) {
                Ok(id) => {
                    debug!(
                        "Created page {} '{}' (depth {}, parent {:?})",
                        id, line.title, line.depth, parent
                    );

                    if stack.len() <= line.depth {
                        stack.resize(line.depth + 1, None);
                    }
                    stack[line.depth] = Some(id);
                    stack.truncate(line.depth + 1);

                    report.created += 1;
                    report.pages.push(PageNode {
                        id,
                        title: request.title,
                        excerpt: request.excerpt,
                        directives: request.directives,
                        parent_id: parent,
                        depth: line.depth,
                        line_number: line.line_number,
                    });
                }
                Err(e) => {
                    warn!("Failed to create page '{}': {}", line.title, e);
                    report.failed += 1;
                    report.errors.push(BuildFailure {
                        line_number: line.line_number,
                        title: line.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Page tree build finished: {} created, {} failed, {} warnings",
            report.created,
            report.failed,
            report.warnings.len()
        );

        report
    }

    fn resolve_parent<S: PageStore + ?Sized>(
        &self,
        line: &OutlineLine,
        stack: &[Option<ItemId>],
        store: &S,
        report: &mut BuildReport,
    ) -> Option<ItemId> {
        let mut warn_line = |kind: WarningKind, message: String| {
            warn!("Line {} '{}': {}", line.line_number, line.title, message);
            report.warnings.push(BuildWarning {
                line_number: line.line_number,
                title: line.title.clone(),
                kind,
                message,
            });
        };

        let parent = if line.depth == 0 {
            self.root_parent
        } else {
            match stack.get(line.depth - 1).copied().flatten() {
                Some(id) => Some(id),
                None => {
                    warn_line(
                        WarningKind::MissingParent,
                        format!(
                            "no page created at depth {}; attached at the top level",
                            line.depth - 1
                        ),
                    );
                    self.root_parent
                }
            }
        };

        let id = parent?;
        match store.parent_exists(id) {
            Ok(true) => Some(id),
            Ok(false) => {
                warn_line(
                    WarningKind::ParentNotFound,
                    format!("parent {} not found; attached at the root", id),
                );
                None
            }
            Err(e) => {
                warn_line(
                    WarningKind::ParentNotFound,
                    format!("parent {} could not be checked ({}); attached at the root", id, e),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineParser;
    use crate::types::CraftError;
    use std::collections::{HashMap, HashSet};

    /// In-memory store that can be told to reject titles or lose pages
    #[derive(Default)]
    struct MemoryStore {
        next_id: i64,
        pages: HashMap<ItemId, NewPage>,
        reject: HashSet<String>,
    }

    impl MemoryStore {
        fn rejecting(titles: &[&str]) -> Self {
            Self {
                reject: titles.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }
        }

        fn parent_title(&self, report: &BuildReport, title: &str) -> Option<String> {
            let page = report.pages.iter().find(|p| p.title == title)?;
            let parent = page.parent_id?;
            self.pages.get(&parent).map(|p| p.title.clone())
        }
    }

    impl PageStore for MemoryStore {
        fn parent_exists(&self, id: ItemId) -> Result<bool> {
            Ok(self.pages.contains_key(&id))
        }

        fn create_page(&mut self, page: &NewPage) -> Result<ItemId> {
            if self.reject.contains(&page.title) {
                return Err(CraftError::page_rejected(&page.title, "rejected by store"));
            }
            self.next_id += 1;
            let id = ItemId::new(self.next_id);
            self.pages.insert(id, page.clone());
            Ok(id)
        }
    }

    fn build(text: &str, store: &mut MemoryStore) -> BuildReport {
        let parsed = OutlineParser::default().parse(text);
        TreeBuilder::new().build(&parsed.lines, store)
    }

    #[test]
    fn test_services_outline_round_trip() {
        let mut store = MemoryStore::default();
        let report = build(
            "Services:+Our offerings\n-Web Design\n-SEO Audit:+Comprehensive SEO review\n--Local SEO",
            &mut store,
        );

        assert_eq!(report.created, 4);
        assert_eq!(report.failed, 0);
        assert!(report.warnings.is_empty());
        assert!(report.is_complete());

        let services = &report.pages[0];
        assert_eq!(services.parent_id, None);
        assert_eq!(services.excerpt.as_deref(), Some("Our offerings"));

        let children: Vec<_> = report
            .children_of(Some(services.id))
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(children, vec!["Web Design", "SEO Audit"]);

        let seo = &report.pages[2];
        assert_eq!(seo.excerpt.as_deref(), Some("Comprehensive SEO review"));
        assert_eq!(seo.depth, 1);
        assert_eq!(store.parent_title(&report, "Local SEO").as_deref(), Some("SEO Audit"));
        assert_eq!(report.pages[3].depth, 2);
    }

    #[test]
    fn test_stack_truncation() {
        let mut store = MemoryStore::default();
        let report = build("A\n-B\n-C\nD\n-E", &mut store);

        assert_eq!(report.created, 5);
        assert_eq!(store.parent_title(&report, "B").as_deref(), Some("A"));
        assert_eq!(store.parent_title(&report, "C").as_deref(), Some("A"));
        assert_eq!(store.parent_title(&report, "D"), None);
        assert_eq!(store.parent_title(&report, "E").as_deref(), Some("D"));
    }

    #[test]
    fn test_deeper_entries_invalidated_by_shallower_sibling() {
        let mut store = MemoryStore::default();
        let report = build("A\n-B\n--C\n-D\n---E", &mut store);

        // E skips a level after D truncated the stack to [A, D]
        assert_eq!(store.parent_title(&report, "E"), None);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::MissingParent);
        assert_eq!(report.warnings[0].title, "E");
    }

    #[test]
    fn test_depth_gap_falls_back_to_root() {
        let mut store = MemoryStore::default();
        let report = build("--Orphan\nTop\n-Child", &mut store);

        assert_eq!(report.created, 3);
        assert_eq!(store.parent_title(&report, "Orphan"), None);
        assert_eq!(store.parent_title(&report, "Child").as_deref(), Some("Top"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_failure_continues_without_rollback() {
        let mut store = MemoryStore::rejecting(&["B"]);
        let report = build("A\n-B\n--B1\n-C", &mut store);

        assert_eq!(report.created, 3);
        assert_eq!(report.failed, 1);
        assert!(!report.is_complete());
        assert_eq!(report.errors[0].title, "B");
        assert_eq!(report.errors[0].line_number, 2);
        assert!(report.errors[0].error.contains("rejected by store"));

        // B1 had no created parent at depth 1, so it lands at the root
        assert_eq!(store.parent_title(&report, "B1"), None);
        assert_eq!(report.warnings[0].kind, WarningKind::MissingParent);
        assert_eq!(store.parent_title(&report, "C").as_deref(), Some("A"));
        assert_eq!(store.pages.len(), 3);
    }

    #[test]
    fn test_failed_sibling_keeps_earlier_parent() {
        let mut store = MemoryStore::rejecting(&["D"]);
        let report = build("A\n-B\n-D\n--E", &mut store);

        // Most recently created depth-1 page is B
        assert_eq!(store.parent_title(&report, "E").as_deref(), Some("B"));
    }

    /// Store whose pages disappear right after creation
    struct VanishingStore(MemoryStore);

    impl PageStore for VanishingStore {
        fn parent_exists(&self, _id: ItemId) -> Result<bool> {
            Ok(false)
        }

        fn create_page(&mut self, page: &NewPage) -> Result<ItemId> {
            self.0.create_page(page)
        }
    }

    #[test]
    fn test_missing_parent_in_store_falls_back_to_root() {
        let parsed = OutlineParser::default().parse("A\n-B");
        let mut store = VanishingStore(MemoryStore::default());
        let report = TreeBuilder::new().build(&parsed.lines, &mut store);

        assert_eq!(report.created, 2);
        assert_eq!(report.pages[1].parent_id, None);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::ParentNotFound);
    }

    /// Store whose existence check is unavailable
    struct UncheckableStore(MemoryStore);

    impl PageStore for UncheckableStore {
        fn parent_exists(&self, _id: ItemId) -> Result<bool> {
            Err(CraftError::Storage("database is locked".to_string()))
        }

        fn create_page(&mut self, page: &NewPage) -> Result<ItemId> {
            self.0.create_page(page)
        }
    }

    #[test]
    fn test_failed_parent_check_falls_back_to_root() {
        let parsed = OutlineParser::default().parse("A\n-B\n--C");
        let mut store = UncheckableStore(MemoryStore::default());
        let report = TreeBuilder::new().build(&parsed.lines, &mut store);

        assert_eq!(report.created, 3);
        assert_eq!(report.failed, 0);
        assert!(report.pages.iter().all(|p| p.parent_id.is_none()));

        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().all(|w| w.kind == WarningKind::ParentNotFound));
        assert_eq!(report.warnings[0].title, "B");
        assert!(report.warnings[0].message.contains("could not be checked"));
        assert!(report.warnings[0].message.contains("database is locked"));
    }

    #[test]
    fn test_under_existing_parent() {
        let mut store = MemoryStore::default();
        let base = store
            .create_page(&NewPage {
                title: "Existing".to_string(),
                excerpt: None,
                directives: Default::default(),
                parent_id: None,
            })
            .unwrap();

        let parsed = OutlineParser::default().parse("A\n-B\nC");
        let report = TreeBuilder::new().under(Some(base)).build(&parsed.lines, &mut store);

        assert_eq!(store.parent_title(&report, "A").as_deref(), Some("Existing"));
        assert_eq!(store.parent_title(&report, "B").as_deref(), Some("A"));
        assert_eq!(store.parent_title(&report, "C").as_deref(), Some("Existing"));
    }

    #[test]
    fn test_rerun_creates_duplicates() {
        let mut store = MemoryStore::default();
        build("About\n-Team", &mut store);
        let second = build("About\n-Team", &mut store);

        assert_eq!(second.created, 2);
        assert_eq!(store.pages.len(), 4);
    }

    #[test]
    fn test_directives_forwarded_to_store() {
        let mut store = MemoryStore::default();
        let report = build("Landing ::template=wide ::status=draft", &mut store);

        let page = &store.pages[&report.pages[0].id];
        assert_eq!(page.directives.get("template").map(String::as_str), Some("wide"));
        assert_eq!(page.directives.get("status").map(String::as_str), Some("draft"));
    }

    #[test]
    fn test_parent_always_created_earlier() {
        let mut store = MemoryStore::default();
        let report = build("A\n-B\n--C\n---D\n-E\n--F\nG\n-H\n--I", &mut store);

        for (index, page) in report.pages.iter().enumerate() {
            if let Some(parent) = page.parent_id {
                let parent_index = report.pages.iter().position(|p| p.id == parent).unwrap();
                assert!(parent_index < index);
                assert_eq!(report.pages[parent_index].depth + 1, page.depth);
            }
        }
    }
}
