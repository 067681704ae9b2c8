//! Votes API Library
//!
//! This library exposes the post voting operations over HTTP, including
//! configuration management, error handling, dependency wiring and the
//! axum router.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Config, Dependencies, LogFormat};
pub use errors::ApiError;
