//! Pull request lifecycle: creation with initial reviewer, merge, reads

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use super::load_pull_request;
use crate::error::{Entity, Error, Result};
use crate::model::{PullRequest, PullRequestRecord};
use crate::selection::{select_candidate, SelectionStrategy};
use crate::store::Store;

/// Creates pull requests, merges them and reassigns their reviewers
#[derive(Clone)]
pub struct PullRequestService {
    pub(super) store: Arc<dyn Store>,
    pub(super) strategy: Arc<dyn SelectionStrategy>,
}

impl PullRequestService {
    pub fn new(store: Arc<dyn Store>, strategy: Arc<dyn SelectionStrategy>) -> Self {
        Self { store, strategy }
    }

    /// Create an OPEN pull request and assign one reviewer from the author's team
    ///
    /// When nobody in the team is eligible the pull request is still created,
    /// with no reviewers.
    pub async fn create(&self, pr_id: &str, title: &str, author_id: &str) -> Result<PullRequest> {
        let mut uow = self.store.begin().await?;

        let author = uow
            .find_user(author_id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, author_id))?;
        let candidates = uow.active_candidates(&author.team_name).await?;

        let record = PullRequestRecord::open(pr_id, title, author_id, Utc::now());
        uow.insert_pull_request(&record).await?;

        let excluded: HashSet<&str> = HashSet::from([author_id]);
        match select_candidate(&candidates, &excluded, self.strategy.as_ref()) {
            Some(reviewer) => {
                uow.add_reviewer(pr_id, &reviewer).await?;
                tracing::info!(
                    pr_id = %pr_id,
                    author_id = %author_id,
                    reviewer = %reviewer,
                    "Assigned initial reviewer"
                );
            }
            None => {
                tracing::info!(
                    pr_id = %pr_id,
                    team = %author.team_name,
                    "No eligible reviewer in team, pull request created without reviewers"
                );
            }
        }

        let pr = load_pull_request(uow.as_mut(), pr_id).await?;
        uow.commit().await?;
        Ok(pr)
    }

    /// Merge a pull request
    ///
    /// Merging an already merged pull request is a no-op that returns the
    /// current state with the original merge timestamp. A failed status write
    /// aborts the operation.
    pub async fn merge(&self, pr_id: &str) -> Result<PullRequest> {
        let mut uow = self.store.begin().await?;

        let current = uow
            .find_pull_request(pr_id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;

        if current.status.is_open() {
            if let Err(err) = uow.mark_merged(pr_id, Utc::now(), current.version).await {
                tracing::error!(pr_id = %pr_id, error = %err, "Failed to mark pull request as merged");
                return Err(err);
            }
            tracing::info!(pr_id = %pr_id, "Pull request merged");
        } else {
            tracing::debug!(pr_id = %pr_id, "Pull request already merged");
        }

        let pr = load_pull_request(uow.as_mut(), pr_id).await?;
        uow.commit().await?;
        Ok(pr)
    }

    /// Get a pull request with its reviewers
    pub async fn get(&self, pr_id: &str) -> Result<PullRequest> {
        let mut uow = self.store.begin().await?;
        let pr = load_pull_request(uow.as_mut(), pr_id).await?;
        uow.commit().await?;
        Ok(pr)
    }

    /// Get the reviewers currently assigned to a pull request
    pub async fn reviewers(&self, pr_id: &str) -> Result<Vec<String>> {
        Ok(self.get(pr_id).await?.assigned_reviewers)
    }
}
