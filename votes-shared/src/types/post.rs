use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::types::{PostId, UserId};

/// Kind of content a post carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Link,
}

impl PostKind {
    pub fn as_i16(self) -> i16 {
        match self {
            PostKind::Text => 0,
            PostKind::Link => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(PostKind::Text),
            1 => Some(PostKind::Link),
            _ => None,
        }
    }
}

/// Represents a post together with its denormalized counters.
///
/// `score` always equals the sum of the live vote values for the post once
/// a vote operation has completed. It is only written by the vote subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    #[serde(rename = "userId")]
    pub author_id: UserId,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    /// Text of a text post, or the URL of a link post.
    pub body: String,
    pub score: i64,
    pub views: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Data required to create a post. New posts start with a zero score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub category: String,
    pub kind: PostKind,
    pub body: String,
}
