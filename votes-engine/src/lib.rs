//! # Votes Engine
//! This crate keeps each post's score consistent with its vote ledger.
//! It provides the reconciliation engine behind the idempotent `vote`
//! operation, the unvote engine, and a service facade that validates the
//! post and reads it back after a successful operation.
pub mod engine;
pub mod errors;
pub mod service;

pub use engine::{EngineConfig, VoteEngine, VotePlan, plan_vote};
pub use errors::VoteError;
pub use service::{PostVoting, VoteReceipt, VotingService};
