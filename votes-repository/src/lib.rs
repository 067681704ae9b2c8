//! # Votes Repository
//! This crate provides traits and implementations for the vote ledger and the
//! post score aggregate. It includes definitions for errors, interfaces, a
//! PostgreSQL implementation and a transactional in-memory implementation.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VotesRepositoryError;
pub use interfaces::{PostsRepository, ScoreAggregate, Transactional, UsersRepository, VoteLedger};
pub use memory::{InMemoryVotesRepository, StoreOperation};
pub use postgres::PostgresVotesRepository;
