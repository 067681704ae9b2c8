//! Error types for the votes repository.
//! Consolidates the error conditions of the vote ledger, score aggregate and
//! post/user lookups.
mod repository;

pub use repository::VotesRepositoryError;
