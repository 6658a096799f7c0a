pub mod libs;

use crate::libs::config::Config;
use crate::libs::directory::UserDirectory;
use crate::libs::feed::MessageFeed;
use crate::libs::storage::database::storage_traits::StoreError;
use std::sync::Arc;
use thiserror::Error;

pub use crate::libs::core::models::{
    Message, MessageId, ProfileUpdate, User, UserId, ANONYMOUS_DISPLAY_NAME, AVATARS,
    DEFAULT_AVATAR,
};
pub use crate::libs::feed::{DEFAULT_LIST_LIMIT, MAX_MESSAGE_CHARS};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

/// The user directory and the message feed wired together, ready to hand to a request layer.
pub struct ChatBackend {
    directory: Arc<UserDirectory>,
    feed: MessageFeed,
}

impl ChatBackend {
    pub fn open(config: &Config) -> ChatResult<Self> {
        let directory = UserDirectory::open(config)?;
        Ok(Self::with_directory(Arc::new(directory)))
    }

    pub fn with_directory(directory: Arc<UserDirectory>) -> Self {
        let feed = MessageFeed::new(Arc::clone(&directory));
        Self { directory, feed }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn feed(&self) -> &MessageFeed {
        &self.feed
    }
}
