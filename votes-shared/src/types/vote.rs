use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::types::{PostId, UserId, VoteId, VoteValue};

/// Represents a user's vote on a post.
///
/// This is one entry of the vote ledger. At most one entry exists per
/// `(post_id, user_id)` pair, and its `value` is never zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub value: VoteValue,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
