//! PostgreSQL persistence module.
//!
//! Provides the connection pool behind the PostgreSQL device store and user directory.

pub mod pool;

pub use pool::{PostgresPool, PostgresPoolError};
