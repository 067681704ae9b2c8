//! This module defines and re-exports the interfaces for the votes repository.
//! It serves as a central point for accessing the traits that the vote and
//! unvote engines are written against.
mod posts;
mod score_aggregate;
mod transactional;
mod vote_ledger;

pub use posts::{PostsRepository, UsersRepository};
pub use score_aggregate::ScoreAggregate;
pub use transactional::Transactional;
pub use vote_ledger::VoteLedger;
