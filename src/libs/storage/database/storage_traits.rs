use crate::libs::core::models::{ProfileUpdate, User, UserId};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub trait Transactional {
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}

pub trait UserStore {
    /// Returns the user holding `name`, inserting it first if the name is free. The flag is
    /// true when this call did the insert. Run it inside an immediate transaction.
    fn insert_user_if_absent(
        &mut self,
        name: &str,
        is_anonymous: bool,
        avatar: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(User, bool), StoreError>;
    fn load_user_by_id(&mut self, user_id: UserId) -> Result<Option<User>, StoreError>;
    fn load_user_by_name(&mut self, name: &str) -> Result<Option<User>, StoreError>;
    /// Returns the number of rows touched; zero means the id does not exist.
    fn update_profile(&mut self, user_id: UserId, update: &ProfileUpdate)
        -> Result<usize, StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ConnectionPool Error: {0}")]
    ConnectionPool(#[from] r2d2::Error),
    #[error("Migration Error: {0}")]
    Migration(String),
}
