//! URM Core: domain models, error types and repository traits shared by
//! the database, auth and server crates.

pub mod error;
pub mod models;
pub mod repository;
