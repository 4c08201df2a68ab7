//! Database layer for the reviewer roster
//!
//! Provides the SQLite persistence gateway: connection pool, embedded
//! migrations, repositories and the transactional unit of work.

pub mod db;
pub mod error;
pub mod repos;
pub mod schema;
pub mod store;

pub use db::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use store::{SqliteStore, SqliteUnitOfWork};
