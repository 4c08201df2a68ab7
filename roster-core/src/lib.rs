//! Roster Core - reviewer assignment for team pull requests
//!
//! This crate holds the domain model, the reviewer selection engine, the
//! persistence gateway traits and the services that create, merge and
//! reassign reviewers on pull requests.

pub mod config;
pub mod error;
pub mod model;
pub mod selection;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{Entity, Error, Result};
pub use selection::{SelectionStrategy, StrategyKind};
pub use service::Services;
pub use store::{MemoryStore, Store, UnitOfWork};
