//! Infrastructure layer modules
//!
//! - `backoff`: Exponential backoff for provider retries
//! - `postgres`: PostgreSQL connection pool

pub mod backoff;
pub mod postgres;
