use crate::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use crate::libs::storage::database::storage_traits::{StoreError, Transactional};
use std::time::Duration;
use tracing::info;

/// Opens the pool at `path` and brings the schema up to date.
pub fn open_database(path: &str, pool_size: u32, busy_timeout: Duration) -> Result<SqliteStore, StoreError> {
    let store = SqliteStore::new(path, pool_size, busy_timeout)?;
    db_migration(&store)?;
    info!(path, pool_size, "Database initialized and ready to use");
    Ok(store)
}

pub fn db_migration(store: &SqliteStore) -> Result<(), StoreError> {
    let mut connection = store.new_connection()?;
    let sqlite_transaction = SqliteTransaction::immediate(&mut connection)?;

    // users are the only persisted state; messages live in memory
    sqlite_transaction
        .inner()
        .execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                is_anonymous INTEGER NOT NULL DEFAULT 0,
                avatar TEXT NOT NULL DEFAULT 'default',
                created_at TEXT NOT NULL,

                CHECK (is_anonymous IN (0, 1)),
                CHECK (length(name) > 0)
            );",
            [],
        )
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    sqlite_transaction.commit()
}
