//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Every new connection enables
//! foreign keys; file databases additionally run in WAL mode. [`build_pool`]
//! applies pending migrations, [`open_pool`] leaves the schema alone.

use std::time::Duration;

use octopunch_common::{DatabaseConfig, Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

fn memory_manager() -> SqliteConnectionManager {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    // Uniquely named shared cache: connections within one pool share state,
    // separate pools never do.
    let uri = format!("file:octopunch_mem_{n}?mode=memory&cache=shared");

    SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

fn file_manager(db_path: &str) -> SqliteConnectionManager {
    SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;",
        )
    })
}

/// Open a pool for the configured connection target without touching the
/// schema.
///
/// `:memory:` selects a private in-memory database; anything else is a file
/// path, created if it does not exist.
pub fn open_pool(config: &DatabaseConfig) -> Result<DbPool> {
    if config.max_pool_size == 0 {
        return Err(Error::invalid_input("database.max_pool_size must be at least 1"));
    }

    let manager = if config.is_memory() {
        memory_manager()
    } else {
        file_manager(&config.connection)
    };

    Pool::builder()
        .max_size(config.max_pool_size)
        .connection_timeout(Duration::from_secs(config.pool_timeout_secs))
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))
}

/// Open a pool and run pending migrations, returning both.
pub fn build_pool_counted(config: &DatabaseConfig) -> Result<(DbPool, usize)> {
    let pool = open_pool(config)?;
    let applied = migrations::run_migrations(&*get_conn(&pool)?)?;

    tracing::info!(
        connection = %config.connection,
        max_size = config.max_pool_size,
        migrations_applied = applied,
        "Database pool ready"
    );

    Ok((pool, applied))
}

/// Open a pool and run pending migrations.
pub fn build_pool(config: &DatabaseConfig) -> Result<DbPool> {
    build_pool_counted(config).map(|(pool, _)| pool)
}

/// Initialize a pool backed by a file on disk with default settings.
///
/// # Example
///
/// ```no_run
/// use octopunch_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/octopunch/octopunch.sqlite").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    build_pool(&DatabaseConfig::file(db_path))
}

/// Initialize an in-memory pool (useful for tests).
///
/// ```
/// use octopunch_db::pool::{init_memory_pool, get_conn};
///
/// let pool = init_memory_pool().unwrap();
/// let conn = get_conn(&pool).unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    build_pool(&DatabaseConfig::in_memory())
}

/// Get a connection from the pool, converting the r2d2 error.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_get_conn_enables_foreign_keys() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='vcenters'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_pool_shares_memory_database() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO vcenters (id, name, host, username, password, created_at)
                 VALUES ('x', 'vc', 'h', 'u', 'p', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }

        let conn1 = get_conn(&pool).unwrap();
        let conn2 = get_conn(&pool).unwrap();
        for conn in [&conn1, &conn2] {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM vcenters", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_memory_pools_are_isolated() {
        let a = init_memory_pool().unwrap();
        let b = init_memory_pool().unwrap();

        get_conn(&a)
            .unwrap()
            .execute(
                "INSERT INTO vcenters (id, name, host, username, password, created_at)
                 VALUES ('x', 'vc', 'h', 'u', 'p', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let count: i64 = get_conn(&b)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM vcenters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("octopunch.sqlite");
        let pool = init_pool(path.to_str().unwrap()).unwrap();
        let conn = get_conn(&pool).unwrap();

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        assert!(path.exists());
    }

    #[test]
    fn test_open_pool_leaves_schema_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::file(dir.path().join("octopunch.sqlite"));

        let pool = open_pool(&config).unwrap();
        let count: i64 = get_conn(&pool)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let (_pool, applied) = build_pool_counted(&config).unwrap();
        assert_eq!(applied, migrations::latest_version());
        let (_pool, applied) = build_pool_counted(&config).unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let config = DatabaseConfig {
            max_pool_size: 0,
            ..DatabaseConfig::in_memory()
        };
        assert!(matches!(open_pool(&config), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_build_pool_respects_size() {
        let config = DatabaseConfig {
            max_pool_size: 2,
            ..DatabaseConfig::in_memory()
        };
        let pool = build_pool(&config).unwrap();
        assert_eq!(pool.max_size(), 2);
    }
}
