//! # Votes Shared
//! This crate defines the data structures shared across the votes workspace.
//! It includes the vote ledger entry, the vote direction, posts with their
//! denormalized score, users, and the outcome of a vote operation.
pub mod types;
