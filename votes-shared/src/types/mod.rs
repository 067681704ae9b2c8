mod outcome;
mod post;
mod user;
mod vote;
mod vote_value;

pub use outcome::VoteOutcome;
pub use post::{NewPost, Post, PostKind};
pub use user::{NewUser, User};
pub use vote::Vote;
pub use vote_value::{InvalidVoteValue, VoteValue};

/// Identifier of a post.
pub type PostId = uuid::Uuid;

/// Identifier of a user.
pub type UserId = uuid::Uuid;

/// Identifier of a vote ledger entry.
pub type VoteId = uuid::Uuid;
