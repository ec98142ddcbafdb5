//! SQLite-backed content and navigation store
//!
//! Reference implementation of the collaborator traits:
//! [`PageStore`] for the tree builder, [`ChildLookup`] for the menu
//! synthesizer and [`MenuStore`] for persisting menus.
//!
//! ## Page Directives
//!
//! | Key | Effect |
//! |-----|--------|
//! | `status` | publication status; unknown values use the configured default |
//! | `template` | stored on the page row |
//! | anything else | stored verbatim in `page_meta` |

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::database::SharedDatabase;
use crate::constants::directives::{STATUS, TEMPLATE};
use crate::menu::{ChildLookup, MenuStore, MenuTree};
use crate::outline::PageStore;
use crate::types::{
    ContentItem, CraftError, Directives, ItemId, MenuItem, MenuItemKind, NewPage, PageStatus,
    ParseWithDefault, Result, ResultExt, enum_to_str, log_filter_warn, slugify,
};

/// Guard against parent cycles when walking ancestor chains
const MAX_ANCESTORS: usize = 64;

/// A page row with its resolved permalink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPage {
    pub id: ItemId,
    pub parent_id: Option<ItemId>,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: PageStatus,
    pub template: Option<String>,
    pub menu_order: i64,
    pub url: String,
    /// Directives kept in `page_meta`
    pub meta: Directives,
}

/// Raw `pages` row shared by the listing queries
struct PageRow {
    id: i64,
    parent_id: Option<i64>,
    title: String,
    slug: String,
    body: String,
    status: String,
    archive_url: Option<String>,
}

const PAGE_COLUMNS: &str = "id, parent_id, title, slug,
    CASE WHEN body = '' THEN COALESCE(excerpt, '') ELSE body END,
    status, archive_url";

fn map_page_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageRow> {
    Ok(PageRow {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        body: row.get(4)?,
        status: row.get(5)?,
        archive_url: row.get(6)?,
    })
}

/// Site store over a shared [`Database`](super::Database)
pub struct SiteStore {
    db: SharedDatabase,
    default_status: PageStatus,
}

impl SiteStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self {
            db,
            default_status: PageStatus::default(),
        }
    }

    /// Status used when a page has no valid `status` directive
    pub fn with_default_status(mut self, status: PageStatus) -> Self {
        self.default_status = status;
        self
    }

    pub fn database(&self) -> &SharedDatabase {
        &self.db
    }

    fn resolve_status(&self, page: &NewPage) -> PageStatus {
        match page.directives.get(STATUS) {
            Some(value) => match value.parse::<PageStatus>() {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        "Page '{}': {}; using default '{}'",
                        page.title, e, self.default_status
                    );
                    self.default_status
                }
            },
            None => self.default_status,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every page in creation order, optionally only published ones
    pub fn list_items(&self, published_only: bool) -> Result<Vec<ContentItem>> {
        let conn = self.db.connection()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM pages ORDER BY id", PAGE_COLUMNS))
            .with_context("Failed to prepare page listing")?;
        let rows: Vec<PageRow> = stmt
            .query_map([], map_page_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context("Failed to list pages")?;

        let slugs: HashMap<i64, (Option<i64>, &str)> = rows
            .iter()
            .map(|row| (row.id, (row.parent_id, row.slug.as_str())))
            .collect();

        let items = rows
            .iter()
            .filter(|row| {
                !published_only || PageStatus::parse_or_default(&row.status) == PageStatus::Publish
            })
            .map(|row| {
                let mut segments = vec![row.slug.as_str()];
                let mut parent = row.parent_id;
                while let Some(id) = parent {
                    if segments.len() > MAX_ANCESTORS {
                        break;
                    }
                    match slugs.get(&id) {
                        Some((next, slug)) => {
                            segments.push(*slug);
                            parent = *next;
                        }
                        None => break,
                    }
                }
                segments.reverse();
                to_content_item(row, permalink(&segments))
            })
            .collect();

        Ok(items)
    }

    pub fn page_count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .connection()?
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .with_context("Failed to count pages")?;
        Ok(count as usize)
    }

    /// Full page record including interpreted directives and meta
    pub fn get_page(&self, id: ItemId) -> Result<Option<StoredPage>> {
        let conn = self.db.connection()?;
        let row = conn
            .query_row(
                "SELECT id, parent_id, title, slug, excerpt, status, template, menu_order
                 FROM pages WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()
            .with_context_fn(|| format!("Failed to load page {}", id))?;

        let Some((id, parent_id, title, slug, excerpt, status, template, menu_order)) = row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT meta_key, meta_value FROM page_meta WHERE page_id = ?1 ORDER BY rowid",
        )?;
        let meta: Directives = stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .filter_map(|r| log_filter_warn(r, "loading page meta"))
            .collect();

        Ok(Some(StoredPage {
            id: ItemId::new(id),
            parent_id: parent_id.map(ItemId::new),
            title,
            slug,
            excerpt,
            status: PageStatus::parse_or_default(&status),
            template,
            menu_order,
            url: page_url(&conn, id)?,
            meta,
        }))
    }

    /// Read a stored menu back, `None` if it was never written
    pub fn load_menu(&self, name: &str) -> Result<Option<MenuTree>> {
        let conn = self.db.connection()?;
        let menu_id: Option<i64> = conn
            .query_row("SELECT id FROM menus WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()
            .with_context_fn(|| format!("Failed to look up menu '{}'", name))?;

        let Some(menu_id) = menu_id else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT item_ref, parent_ref, position, label, url, object_id, kind
             FROM menu_items WHERE menu_id = ?1 ORDER BY position",
        )?;
        let items = stmt
            .query_map(params![menu_id], |row| {
                Ok(MenuItem {
                    id: row.get::<_, i64>(0)? as usize,
                    parent: row.get::<_, Option<i64>>(1)?.map(|p| p as usize),
                    order: row.get::<_, i64>(2)? as u32,
                    label: row.get(3)?,
                    url: row.get(4)?,
                    object_id: row.get::<_, Option<i64>>(5)?.map(ItemId::new),
                    kind: MenuItemKind::parse_or_default(&row.get::<_, String>(6)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context_fn(|| format!("Failed to load menu '{}'", name))?;

        Ok(Some(MenuTree::from_items(name, items)))
    }
}

// =============================================================================
// Collaborator Implementations
// =============================================================================

impl PageStore for SiteStore {
    fn parent_exists(&self, id: ItemId) -> Result<bool> {
        let conn = self.db.connection()?;
        page_exists(&conn, id.get())
    }

    fn create_page(&mut self, page: &NewPage) -> Result<ItemId> {
        let status = self.resolve_status(page);
        let now = chrono::Utc::now().to_rfc3339();

        let id = self.db.transaction(|conn| {
            let parent = page.parent_id.map(ItemId::get);
            if let Some(parent) = parent
                && !page_exists(conn, parent)?
            {
                return Err(CraftError::page_rejected(
                    &page.title,
                    format!("parent {} does not exist", parent),
                ));
            }

            let slug = unique_slug(conn, parent, &slugify(&page.title))?;
            let menu_order: i64 = conn.query_row(
                "SELECT COUNT(*) FROM pages WHERE parent_id IS ?1",
                params![parent],
                |row| row.get(0),
            )?;

            conn.execute(
                "INSERT INTO pages
                 (parent_id, title, slug, excerpt, status, template, menu_order, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    parent,
                    page.title,
                    slug,
                    page.excerpt,
                    status.to_string(),
                    page.directives.get(TEMPLATE),
                    menu_order,
                    now,
                ],
            )
            .with_context_fn(|| format!("Failed to insert page '{}'", page.title))?;
            let id = conn.last_insert_rowid();

            let mut meta = conn.prepare(
                "INSERT OR REPLACE INTO page_meta (page_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            )?;
            for (key, value) in &page.directives {
                if key != STATUS && key != TEMPLATE {
                    meta.execute(params![id, key, value])?;
                }
            }

            Ok(ItemId::new(id))
        })?;

        debug!("Stored page {} '{}' ({})", id, page.title, status);
        Ok(id)
    }
}

/// Only published children are navigable, matching `list_items(true)`
impl ChildLookup for SiteStore {
    fn children_of(&self, id: ItemId) -> Result<Vec<ContentItem>> {
        let conn = self.db.connection()?;
        let parent_url = page_url(&conn, id.get())?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pages WHERE parent_id = ?1 AND status = ?2 ORDER BY menu_order, id",
            PAGE_COLUMNS
        ))?;
        let rows: Vec<PageRow> = stmt
            .query_map(
                params![id.get(), PageStatus::Publish.to_string()],
                map_page_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context_fn(|| format!("Failed to load children of {}", id))?;

        Ok(rows
            .iter()
            .map(|row| to_content_item(row, format!("{}{}/", parent_url, row.slug)))
            .collect())
    }
}

impl MenuStore for SiteStore {
    fn replace_menu(&mut self, name: &str, tree: &MenuTree) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();

        let written = self.db.transaction(|conn| {
            conn.execute("DELETE FROM menus WHERE name = ?1", params![name])
                .with_context_fn(|| format!("Failed to delete menu '{}'", name))?;
            conn.execute(
                "INSERT INTO menus (name, updated_at) VALUES (?1, ?2)",
                params![name, now],
            )?;
            let menu_id = conn.last_insert_rowid();

            let mut insert = conn.prepare(
                "INSERT INTO menu_items
                 (menu_id, item_ref, parent_ref, position, label, url, object_id, kind)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for item in &tree.items {
                insert.execute(params![
                    menu_id,
                    item.id as i64,
                    item.parent.map(|p| p as i64),
                    item.order,
                    item.label,
                    item.url,
                    item.object_id.map(ItemId::get),
                    enum_to_str(&item.kind),
                ])?;
            }

            Ok(tree.items.len())
        })?;

        info!("Replaced menu '{}' with {} items", name, written);
        Ok(written)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn page_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
    .with_context_fn(|| format!("Failed to check page {}", id))
}

/// First free slug among the siblings under `parent`: `base`, `base-2`, ...
fn unique_slug(conn: &Connection, parent: Option<i64>, base: &str) -> Result<String> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE parent_id IS ?1 AND slug = ?2)",
    )?;

    let mut candidate = base.to_string();
    let mut suffix = 2;
    while stmt.query_row(params![parent, candidate], |row| row.get::<_, bool>(0))? {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    Ok(candidate)
}

/// Permalink built from the ancestor chain
fn page_url(conn: &Connection, id: i64) -> Result<String> {
    let mut stmt = conn.prepare(
        "WITH RECURSIVE chain(id, parent_id, slug, depth) AS (
             SELECT id, parent_id, slug, 0 FROM pages WHERE id = ?1
             UNION ALL
             SELECT p.id, p.parent_id, p.slug, c.depth + 1
             FROM pages p JOIN chain c ON p.id = c.parent_id
             WHERE c.depth < ?2
         )
         SELECT slug FROM chain ORDER BY depth DESC",
    )?;
    let segments: Vec<String> = stmt
        .query_map(params![id, MAX_ANCESTORS as i64], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context_fn(|| format!("Failed to resolve URL of page {}", id))?;

    if segments.is_empty() {
        return Err(CraftError::NotFound(format!("page {}", id)));
    }
    Ok(permalink(&segments))
}

fn permalink<S: AsRef<str>>(segments: &[S]) -> String {
    let path: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
    format!("/{}/", path.join("/"))
}

fn to_content_item(row: &PageRow, url: String) -> ContentItem {
    ContentItem {
        id: ItemId::new(row.id),
        title: row.title.clone(),
        body: row.body.clone(),
        parent_id: row.parent_id.map(ItemId::new),
        url,
        archive_url: row.archive_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{RuleTable, classify};
    use crate::menu::MenuSynthesizer;
    use crate::outline::{OutlineParser, TreeBuilder};
    use crate::storage::Database;
    use crate::config::MenuConfig;
    use std::sync::Arc;

    fn store() -> SiteStore {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        SiteStore::new(Arc::new(db))
    }

    fn page(title: &str, parent: Option<ItemId>) -> NewPage {
        NewPage {
            title: title.to_string(),
            excerpt: None,
            directives: Directives::new(),
            parent_id: parent,
        }
    }

    fn build(store: &mut SiteStore, outline: &str) -> crate::outline::BuildReport {
        let parsed = OutlineParser::default().parse(outline);
        TreeBuilder::new().build(&parsed.lines, store)
    }

    #[test]
    fn test_build_outline_into_store() {
        let mut store = store();
        let report = build(
            &mut store,
            "Services:+Our offerings\n-Web Design\n-SEO Audit:+Comprehensive SEO review\n--Local SEO",
        );

        assert_eq!(report.created, 4);
        assert_eq!(store.page_count().unwrap(), 4);

        let local = store.get_page(report.pages[3].id).unwrap().unwrap();
        assert_eq!(local.url, "/services/seo-audit/local-seo/");
        assert_eq!(local.parent_id, Some(report.pages[2].id));

        let seo = store.get_page(report.pages[2].id).unwrap().unwrap();
        assert_eq!(seo.excerpt.as_deref(), Some("Comprehensive SEO review"));
        assert_eq!(seo.menu_order, 1);
    }

    #[test]
    fn test_slugs_unique_among_siblings() {
        let mut store = store();
        let first = store.create_page(&page("About Us", None)).unwrap();
        let second = store.create_page(&page("About Us", None)).unwrap();
        let nested = store.create_page(&page("About Us", Some(first))).unwrap();

        assert_eq!(store.get_page(first).unwrap().unwrap().slug, "about-us");
        assert_eq!(store.get_page(second).unwrap().unwrap().slug, "about-us-2");
        assert_eq!(store.get_page(nested).unwrap().unwrap().slug, "about-us");
        assert_eq!(store.get_page(nested).unwrap().unwrap().url, "/about-us/about-us/");
    }

    #[test]
    fn test_directives_interpreted() {
        let mut store = store().with_default_status(PageStatus::Draft);
        let report = build(
            &mut store,
            "Landing ::status=private ::template=wide ::icon=star\nOther ::status=archived\nPlain",
        );

        let landing = store.get_page(report.pages[0].id).unwrap().unwrap();
        assert_eq!(landing.status, PageStatus::Private);
        assert_eq!(landing.template.as_deref(), Some("wide"));
        assert_eq!(landing.meta.get("icon").map(String::as_str), Some("star"));
        assert!(!landing.meta.contains_key("status"));

        // Unknown status falls back to the configured default
        let other = store.get_page(report.pages[1].id).unwrap().unwrap();
        assert_eq!(other.status, PageStatus::Draft);

        let plain = store.get_page(report.pages[2].id).unwrap().unwrap();
        assert_eq!(plain.status, PageStatus::Draft);
    }

    #[test]
    fn test_create_under_missing_parent_rejected() {
        let mut store = store();
        let result = store.create_page(&page("Orphan", Some(ItemId::new(42))));

        assert!(matches!(result, Err(CraftError::PageRejected { .. })));
        assert_eq!(store.page_count().unwrap(), 0);
        assert!(!store.parent_exists(ItemId::new(42)).unwrap());
    }

    #[test]
    fn test_children_in_menu_order() {
        let mut store = store();
        let report = build(&mut store, "Pricing\n-Starter\n-Business\n--Extras\n-Enterprise");

        let children = store.children_of(report.pages[0].id).unwrap();
        let titles: Vec<_> = children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Starter", "Business", "Enterprise"]);
        assert_eq!(children[1].url, "/pricing/business/");
        assert_eq!(children[1].parent_id, Some(report.pages[0].id));
    }

    #[test]
    fn test_unpublished_children_stay_out_of_menu() {
        let mut store = store();
        build(&mut store, "Pricing\n-Secret Plan ::status=draft\n-Starter");

        let items = store.list_items(true).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Pricing", "Starter"]);

        let children = store.children_of(items[0].id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].title, "Starter");

        let classification = classify(&items, &RuleTable::builtin().unwrap()).unwrap();
        let tree = MenuSynthesizer::new(MenuConfig::default()).synthesize(&classification, &store);
        assert!(tree.items.iter().all(|i| i.label != "Secret Plan"));
    }

    #[test]
    fn test_list_items_filters_unpublished() {
        let mut store = store();
        build(&mut store, "About:+Who we are\n-Team ::status=draft\nContact");

        let all = store.list_items(false).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].body, "Who we are");
        assert_eq!(all[1].url, "/about/team/");

        let published: Vec<_> = store
            .list_items(true)
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(published, vec!["About", "Contact"]);
    }

    #[test]
    fn test_replace_menu_round_trip() {
        let mut store = store();
        build(
            &mut store,
            "Services\nWeb Development\nWebsite Development Package\nPricing\n-Enterprise\nAbout Us",
        );

        let items = store.list_items(true).unwrap();
        let classification = classify(&items, &RuleTable::builtin().unwrap()).unwrap();
        let tree = MenuSynthesizer::new(MenuConfig::default()).synthesize(&classification, &store);

        assert_eq!(tree.root().unwrap().url, "/services/");
        let written = store.replace_menu("Main Menu", &tree).unwrap();
        assert_eq!(written, tree.len());

        let loaded = store.load_menu("Main Menu").unwrap().unwrap();
        assert_eq!(loaded, tree);
        assert!(store.load_menu("Footer").unwrap().is_none());
    }

    #[test]
    fn test_replace_menu_discards_previous_items() {
        let mut store = store();
        build(&mut store, "About\nContact\nCareers");
        let items = store.list_items(true).unwrap();
        let synthesizer = MenuSynthesizer::new(MenuConfig::default());

        let full = synthesizer.synthesize(&classify(&items, &RuleTable::builtin().unwrap()).unwrap(), &store);
        store.replace_menu("Main Menu", &full).unwrap();

        let small = synthesizer.synthesize(&classify(&items[..1], &RuleTable::builtin().unwrap()).unwrap(), &store);
        store.replace_menu("Main Menu", &small).unwrap();

        let loaded = store.load_menu("Main Menu").unwrap().unwrap();
        assert_eq!(loaded.len(), small.len());
        let total: i64 = store
            .database()
            .connection()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM menu_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total as usize, small.len());
    }
}
