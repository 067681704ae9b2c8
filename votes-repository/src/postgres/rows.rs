//! Row types as read from PostgreSQL, and their conversion into shared types.
use time::OffsetDateTime;
use uuid::Uuid;
use votes_shared::types::{Post, PostKind, User, Vote, VoteValue};
use crate::errors::VotesRepositoryError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VoteRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub value: i16,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<VoteRow> for Vote {
    type Error = VotesRepositoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Vote {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            value: VoteValue::try_from(row.value)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub category: String,
    pub kind: i16,
    pub body: String,
    pub score: i64,
    pub views: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<PostRow> for Post {
    type Error = VotesRepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            category: row.category,
            kind: PostKind::from_i16(row.kind)
                .ok_or(VotesRepositoryError::InvalidPostKind(row.kind))?,
            body: row.body,
            score: row.score,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}
