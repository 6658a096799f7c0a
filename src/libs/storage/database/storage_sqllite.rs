use crate::libs::core::models::{ProfileUpdate, User, UserId};
use crate::libs::storage::database::storage_traits::{StoreError, Transactional, UserStore};
use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Result, Row, ToSql, Transaction, TransactionBehavior};
use std::fmt;
use std::time::Duration;

const USER_COLUMNS: &str = "id, name, is_anonymous, avatar, created_at";

pub struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteTransaction<'conn> {
    /// Deferred transaction; only takes the write lock once it writes.
    pub fn new(conn: &'conn mut PooledConnection<SqliteConnectionManager>) -> Result<Self, StoreError> {
        let trans = conn.transaction()?;
        Ok(Self { tx: trans })
    }

    /// Takes the database write lock up front, so a read-then-write inside it cannot race
    /// another writer.
    pub fn immediate(
        conn: &'conn mut PooledConnection<SqliteConnectionManager>,
    ) -> Result<Self, StoreError> {
        let trans = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Self { tx: trans })
    }

    pub fn inner(&self) -> &Transaction<'conn> {
        &self.tx
    }
}

impl<'conn> Transactional for SqliteTransaction<'conn> {
    fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().map_err(StoreError::from)
    }

    fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().map_err(StoreError::from)
    }
}

pub struct SqliteStore {
    conn_pool: Pool<SqliteConnectionManager>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("pool", &self.conn_pool.state())
            .finish()
    }
}

impl SqliteStore {
    pub fn new(db_path: &str, pool_size: u32, busy_timeout: Duration) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        Ok(Self { conn_pool: pool })
    }

    pub fn new_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.conn_pool.get()?)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        is_anonymous: row.get(2)?,
        avatar: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl<'conn> UserStore for SqliteTransaction<'conn> {
    fn insert_user_if_absent(
        &mut self,
        name: &str,
        is_anonymous: bool,
        avatar: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(User, bool), StoreError> {
        if let Some(user) = self.load_user_by_name(name)? {
            return Ok((user, false));
        }

        self.tx.execute(
            "INSERT INTO users (name, is_anonymous, avatar, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, is_anonymous, avatar, created_at],
        )?;

        let user_id = UserId(self.tx.last_insert_rowid());
        let user = self
            .load_user_by_id(user_id)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;
        Ok((user, true))
    }

    fn load_user_by_id(&mut self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let user = self
            .tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn load_user_by_name(&mut self, name: &str) -> Result<Option<User>, StoreError> {
        let user = self
            .tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1"),
                params![name],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn update_profile(
        &mut self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<usize, StoreError> {
        let mut assignments = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(is_anonymous) = &update.is_anonymous {
            assignments.push("is_anonymous = ?");
            values.push(is_anonymous);
        }
        if let Some(avatar) = &update.avatar {
            assignments.push("avatar = ?");
            values.push(avatar);
        }

        if assignments.is_empty() {
            let exists = self.load_user_by_id(user_id)?.is_some();
            return Ok(usize::from(exists));
        }

        values.push(&user_id);
        let sql = format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "));
        Ok(self.tx.execute(&sql, values.as_slice())?)
    }
}
