use crate::libs::core::models::{Message, MessageId, UserId};
use crate::libs::directory::UserDirectory;
use crate::{ChatError, ChatResult};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

pub const MAX_MESSAGE_CHARS: usize = 500;
pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Default)]
struct FeedState {
    messages: Vec<Message>,
    last_id: u64,
}

/// In-memory chat log. Lives as long as the process; nothing is persisted.
///
/// Appends take the write lock for the id increment and the push together, so ids are
/// unique and `messages` is always sorted by id. Readers clone out of a read lock and never
/// see a half-appended message.
#[derive(Debug)]
pub struct MessageFeed {
    directory: Arc<UserDirectory>,
    state: RwLock<FeedState>,
}

fn validate_text(text: &str) -> ChatResult<()> {
    if text.is_empty() {
        return Err(ChatError::InvalidInput("message must not be empty".to_string()));
    }

    let length = text.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Err(ChatError::InvalidInput(format!(
            "message is {length} characters, limit is {MAX_MESSAGE_CHARS}"
        )));
    }

    Ok(())
}

/// With a cursor: the first `limit` messages after it. Without: the last `limit` messages.
fn select_window(messages: &[Message], since: Option<MessageId>, limit: usize) -> &[Message] {
    match since {
        Some(since) => {
            let start = messages.partition_point(|message| message.id <= since);
            let end = start.saturating_add(limit).min(messages.len());
            &messages[start..end]
        }
        None => &messages[messages.len().saturating_sub(limit)..],
    }
}

impl MessageFeed {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self {
            directory,
            state: RwLock::new(FeedState::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, FeedState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Posts `text` as `user_id`, snapshotting the author's current profile into the message.
    pub fn append(&self, user_id: UserId, text: impl Into<String>) -> ChatResult<Message> {
        let text = text.into();
        if let Err(err) = validate_text(&text) {
            warn!(user_id = %user_id, %err, "Rejected message");
            return Err(err);
        }

        let author = match self.directory.get_by_id(user_id) {
            Ok(author) => author,
            Err(err) => {
                warn!(user_id = %user_id, %err, "Rejected message");
                return Err(err);
            }
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_id += 1;
        let message = Message::new(MessageId(state.last_id), &author, text, Utc::now());
        state.messages.push(message.clone());
        drop(state);

        debug!(message_id = %message.id, user_id = %user_id, "Appended message");
        Ok(message)
    }

    pub fn list_since(&self, since: Option<MessageId>, limit: usize) -> Vec<Message> {
        let state = self.read_state();
        select_window(&state.messages, since, limit).to_vec()
    }

    pub fn list_recent(&self) -> Vec<Message> {
        self.list_since(None, DEFAULT_LIST_LIMIT)
    }

    pub fn list_all(&self) -> Vec<Message> {
        self.read_state().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.read_state().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every message and restarts ids at 1. Returns false if the feed lock is poisoned.
    pub fn clear_all(&self) -> bool {
        match self.state.write() {
            Ok(mut state) => {
                let dropped = state.messages.len();
                *state = FeedState::default();
                info!(dropped, "Cleared message feed");
                true
            }
            Err(err) => {
                error!(%err, "Failed to clear message feed");
                false
            }
        }
    }
}
