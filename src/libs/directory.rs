use crate::libs::config::Config;
use crate::libs::core::models::{ProfileUpdate, User, UserId, AVATARS, DEFAULT_AVATAR};
use crate::libs::storage::database::database::open_database;
use crate::libs::storage::database::storage_sqllite::{SqliteStore, SqliteTransaction};
use crate::libs::storage::database::storage_traits::{Transactional, UserStore};
use crate::{ChatError, ChatResult};
use chrono::Utc;
use tracing::debug;

/// Durable, name-addressed user records.
#[derive(Debug)]
pub struct UserDirectory {
    store: SqliteStore,
}

impl UserDirectory {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn open(config: &Config) -> ChatResult<Self> {
        config.validate().map_err(ChatError::Config)?;
        let store = open_database(&config.database_path, config.pool_size, config.busy_timeout())?;
        Ok(Self::new(store))
    }

    /// Returns the user called `name`, creating it with the given profile if it does not
    /// exist yet. An existing user is returned as stored; the profile arguments only apply
    /// on creation.
    pub fn create_or_get(&self, name: &str, is_anonymous: bool, avatar: &str) -> ChatResult<User> {
        if name.is_empty() {
            return Err(ChatError::InvalidInput("user name must not be empty".to_string()));
        }

        let mut connection = self.store.new_connection()?;

        {
            let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
            let existing = sqlite_transaction.load_user_by_name(name)?;
            sqlite_transaction.commit()?;
            if let Some(user) = existing {
                debug!(user_id = %user.id, "Found existing user");
                return Ok(user);
            }
        }

        let mut sqlite_transaction = SqliteTransaction::immediate(&mut connection)?;
        let (user, created) =
            sqlite_transaction.insert_user_if_absent(name, is_anonymous, avatar, Utc::now())?;
        sqlite_transaction.commit()?;

        if created {
            debug!(user_id = %user.id, "Created user");
        } else {
            debug!(user_id = %user.id, "User was created by a concurrent request");
        }
        Ok(user)
    }

    pub fn create_or_get_default(&self, name: &str) -> ChatResult<User> {
        self.create_or_get(name, false, DEFAULT_AVATAR)
    }

    pub fn get_by_id(&self, user_id: UserId) -> ChatResult<User> {
        let mut connection = self.store.new_connection()?;
        let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
        let user = sqlite_transaction.load_user_by_id(user_id)?;
        sqlite_transaction.commit()?;

        user.ok_or_else(|| ChatError::NotFound(format!("user {user_id}")))
    }

    pub fn get_by_name(&self, name: &str) -> ChatResult<User> {
        let mut connection = self.store.new_connection()?;
        let mut sqlite_transaction = SqliteTransaction::new(&mut connection)?;
        let user = sqlite_transaction.load_user_by_name(name)?;
        sqlite_transaction.commit()?;

        user.ok_or_else(|| ChatError::NotFound(format!("user named {name:?}")))
    }

    /// Applies the fields present in `update`. An empty update returns the stored user.
    pub fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> ChatResult<User> {
        if update.is_empty() {
            return self.get_by_id(user_id);
        }

        let mut connection = self.store.new_connection()?;
        let mut sqlite_transaction = SqliteTransaction::immediate(&mut connection)?;

        if sqlite_transaction.update_profile(user_id, update)? == 0 {
            sqlite_transaction.rollback()?;
            return Err(ChatError::NotFound(format!("user {user_id}")));
        }

        let user = sqlite_transaction
            .load_user_by_id(user_id)?
            .ok_or_else(|| ChatError::NotFound(format!("user {user_id}")))?;
        sqlite_transaction.commit()?;

        debug!(user_id = %user.id, is_anonymous = user.is_anonymous, avatar = %user.avatar, "Updated profile");
        Ok(user)
    }

    pub fn list_avatars(&self) -> &'static [&'static str; 20] {
        &AVATARS
    }
}
