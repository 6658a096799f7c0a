use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;
use std::fmt;

/// Stored for users who never picked an avatar. Not a member of [`AVATARS`].
pub const DEFAULT_AVATAR: &str = "default";

pub const AVATARS: [&str; 20] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵", "🐔",
    "🐧", "🐦", "🦄", "🐝",
];

/// Shown instead of the author's name when they posted anonymously.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

pub fn is_known_avatar(avatar: &str) -> bool {
    AVATARS.contains(&avatar)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(UserId)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        MessageId(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub is_anonymous: bool,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            ANONYMOUS_DISPLAY_NAME
        } else {
            &self.name
        }
    }
}

/// A chat message with the author's profile as it was when the message was posted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: UserId,
    #[serde(rename = "message")]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub name: String,
    pub is_anonymous: bool,
    pub avatar: String,
}

impl Message {
    pub fn new(id: MessageId, author: &User, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: author.id,
            text,
            created_at,
            display_name: author.display_name().to_string(),
            name: author.name.clone(),
            is_anonymous: author.is_anonymous,
            avatar: author.avatar.clone(),
        }
    }
}

/// Partial profile change. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub is_anonymous: Option<bool>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn anonymity(is_anonymous: bool) -> Self {
        Self {
            is_anonymous: Some(is_anonymous),
            avatar: None,
        }
    }

    pub fn avatar(avatar: impl Into<String>) -> Self {
        Self {
            is_anonymous: None,
            avatar: Some(avatar.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_anonymous.is_none() && self.avatar.is_none()
    }
}
