//! Roster services
//!
//! Every public operation opens exactly one unit of work, performs all reads
//! and writes through it and commits at the end. Errors returned from the
//! store or raised by the domain checks propagate unchanged.

mod pull_request;
mod reassign;
mod stats;
mod team;
mod user;

use std::sync::Arc;

pub use pull_request::PullRequestService;
pub use stats::StatsService;
pub use team::TeamService;
pub use user::UserService;

use crate::error::{Entity, Error, Result};
use crate::model::PullRequest;
use crate::selection::SelectionStrategy;
use crate::store::{Store, UnitOfWork};

/// All services sharing one store
#[derive(Clone)]
pub struct Services {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, strategy: Arc<dyn SelectionStrategy>) -> Self {
        Self {
            teams: TeamService::new(store.clone()),
            users: UserService::new(store.clone()),
            pull_requests: PullRequestService::new(store.clone(), strategy),
            stats: StatsService::new(store),
        }
    }
}

/// Read a pull request together with its reviewers
async fn load_pull_request(uow: &mut dyn UnitOfWork, pr_id: &str) -> Result<PullRequest> {
    let record = uow
        .find_pull_request(pr_id)
        .await?
        .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;
    let reviewers = uow.reviewers(pr_id).await?;
    Ok(record.with_reviewers(reviewers))
}
