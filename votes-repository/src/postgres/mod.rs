//! PostgreSQL backend for the votes repository.
mod rows;
mod votes_repository;

pub use votes_repository::PostgresVotesRepository;

/// Embedded schema migrations for the `users`, `posts` and `votes` tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");
