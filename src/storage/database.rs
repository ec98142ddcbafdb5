//! Database Layer with Connection Pooling and Safe Transactions
//!
//! SQLite database layer featuring:
//! - Connection pooling via r2d2 for concurrent access
//! - Panic-safe transactions with automatic rollback
//! - Version-tracked migrations
//! - WAL mode for file-backed databases

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::types::{CraftError, Result, ResultExt};

/// Shared database handle.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 2;

/// Migration definitions
struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Index pages by status",
    up: "CREATE INDEX IF NOT EXISTS idx_pages_status ON pages(status)",
}];

/// Connection pool configuration
///
/// Pool size is derived from the CPU count, within fixed bounds.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Minimum idle connections to keep ready
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    /// Minimum pool size regardless of CPU count
    const MIN_POOL_SIZE: u32 = 2;
    /// Maximum pool size regardless of CPU count
    const MAX_POOL_SIZE: u32 = 8;

    /// Formula: clamp(cores, MIN, MAX)
    pub fn optimal_pool_size() -> u32 {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(2);

        cores.clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE)
    }

    /// Create config with automatic pool sizing based on CPU cores
    pub fn auto() -> Self {
        let max_size = Self::optimal_pool_size();
        Self {
            max_size,
            min_idle: 1,
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open database with connection pooling at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| CraftError::Storage(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing or temporary use.
    ///
    /// Every pooled connection to `:memory:` would be a separate database, so
    /// the pool holds exactly one.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| CraftError::Storage(format!("Failed to create in-memory pool: {}", e)))?;

        Ok(Self { pool })
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            CraftError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Create tables, then bring older databases up to date.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        let current_version = Self::schema_version(&conn);

        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;

        if current_version == 0 {
            // Fresh database: schema.sql already has every migration
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to set schema version")?;
            return Ok(());
        }

        drop(conn);
        self.migrate()
    }

    fn schema_version(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0)
    }

    /// Run version-tracked migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        let current_version = Self::schema_version(&conn);

        for migration in MIGRATIONS {
            if migration.version > current_version {
                conn.execute_batch(migration.up).with_context_fn(|| {
                    format!(
                        "Failed to apply migration {}: {}",
                        migration.version, migration.description
                    )
                })?;

                tracing::info!(
                    "Applied migration {}: {}",
                    migration.version,
                    migration.description
                );
            }
        }

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to update schema version")?;
        }

        Ok(())
    }

    /// Get a raw connection for advanced operations.
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.conn()
    }

    /// Execute a function within a panic-safe database transaction.
    ///
    /// All operations within the closure are atomic. If the closure errors or
    /// panics, the transaction is rolled back and an error is returned instead
    /// of poisoning the connection pool.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + std::panic::UnwindSafe,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .with_context("Failed to start transaction")?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit().with_context("Failed to commit transaction")?;
                Ok(value)
            }
            // Rolled back on drop
            Ok(Err(e)) => Err(e),
            Err(panic_payload) => {
                let panic_msg = panic_payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());

                tracing::error!("Transaction panicked: {}", panic_msg);
                Err(CraftError::Storage(format!(
                    "Transaction panicked: {}",
                    panic_msg
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let conn = db.connection().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        db.initialize().expect("Failed to initialize schema");

        let tables = table_names(&db);
        for table in ["pages", "page_meta", "menus", "menu_items"] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }

        let conn = db.connection().unwrap();
        assert_eq!(Database::schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(table_names(&db).iter().filter(|t| *t == "pages").count(), 1);
    }

    #[test]
    fn test_migrates_older_database() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let conn = db.connection().unwrap();
        conn.execute("DROP INDEX idx_pages_status", []).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        drop(conn);

        db.initialize().unwrap();

        let conn = db.connection().unwrap();
        let indexed: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_pages_status'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexed, 1);
        assert_eq!(Database::schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_transaction_panic_safety() {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.initialize().expect("Failed to initialize");

        let result = db.transaction(|_conn| {
            panic!("Intentional panic for testing");
            #[allow(unreachable_code)]
            Ok(())
        });

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("panicked"));
        assert!(
            db.connection().is_ok(),
            "Database should still be accessible after panic"
        );
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let result: Result<()> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO menus (name, updated_at) VALUES ('Main Menu', '2026-01-01T00:00:00Z')",
                [],
            )?;
            Err(CraftError::Storage("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .connection()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM menus", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("site.db")).unwrap();
        db.initialize().unwrap();

        let affected = db
            .connection()
            .unwrap()
            .execute(
                "INSERT INTO menus (name, updated_at) VALUES (?1, ?2)",
                &[&"Main Menu", &"2026-01-01T00:00:00Z"],
            )
            .unwrap();
        assert_eq!(affected, 1);
    }

    #[test]
    fn test_pool_config_sizing() {
        let size = PoolConfig::optimal_pool_size();
        assert!(size >= PoolConfig::MIN_POOL_SIZE);
        assert!(size <= PoolConfig::MAX_POOL_SIZE);
        assert_eq!(PoolConfig::auto().max_size, size);
    }
}
