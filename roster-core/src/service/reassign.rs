//! Reviewer reassignment on open pull requests

use std::collections::HashSet;

use super::load_pull_request;
use super::PullRequestService;
use crate::error::{Entity, Error, Result};
use crate::model::Reassignment;
use crate::selection::select_candidate;

impl PullRequestService {
    /// Replace `old_reviewer` on an open pull request with another active
    /// member of the author's team
    ///
    /// The replacement is never the author, never someone already reviewing
    /// the pull request and never someone an earlier reassignment removed
    /// from it. The swap is applied only if the pull
    /// request was not modified since it was read in this unit of work;
    /// otherwise the call fails with `Error::Conflict`.
    pub async fn reassign(&self, pr_id: &str, old_reviewer: &str) -> Result<Reassignment> {
        let mut uow = self.store.begin().await?;

        let current = uow
            .find_pull_request(pr_id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;

        if !current.status.is_open() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }

        let author = uow
            .find_user(&current.author_id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, &current.author_id))?;
        let candidates = uow.active_candidates(&author.team_name).await?;

        let assigned = uow.reviewers(pr_id).await?;
        if !assigned.iter().any(|r| r == old_reviewer) {
            return Err(Error::NotAssigned {
                pull_request: pr_id.to_string(),
                reviewer: old_reviewer.to_string(),
            });
        }

        let replaced = uow.replaced_reviewers(pr_id).await?;
        let mut excluded: HashSet<&str> = assigned
            .iter()
            .chain(replaced.iter())
            .map(String::as_str)
            .collect();
        excluded.insert(current.author_id.as_str());

        let replacement = select_candidate(&candidates, &excluded, self.strategy.as_ref())
            .ok_or_else(|| Error::NoCandidate(pr_id.to_string()))?;

        uow.replace_reviewer(pr_id, old_reviewer, &replacement, current.version)
            .await?;

        let pull_request = load_pull_request(uow.as_mut(), pr_id).await?;
        uow.commit().await?;

        tracing::info!(
            pr_id = %pr_id,
            old_reviewer = %old_reviewer,
            new_reviewer = %replacement,
            "Reviewer reassigned"
        );

        Ok(Reassignment {
            pull_request,
            replaced_by: replacement,
        })
    }
}
