//! Repository modules for database operations
//!
//! Repositories borrow a single connection so that a caller can run several
//! of them inside one transaction.

pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestsRepo;
pub use stats::StatsRepo;
pub use teams::TeamsRepo;
pub use users::UsersRepo;
